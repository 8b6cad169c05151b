//! Outbound payloads and delivery instructions.

use serde::Serialize;

use super::conn::ConnectionId;

/// Payload sent to clients. Serializes externally tagged, e.g.
/// `{"systemMessage":"Ann has joined the chat"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outbound {
    SystemMessage(String),
    PublicMessage(String),
    PrivateMessage(String),
    /// Roster snapshot in registration order; unnamed participants are "".
    Members(Vec<String>),
}

impl Outbound {
    pub fn joined(name: &str) -> Self {
        Outbound::SystemMessage(format!("{name} has joined the chat"))
    }

    pub fn left(name: &str) -> Self {
        Outbound::SystemMessage(format!("{name} has left the chat"))
    }

    pub fn public(sender: &str, message: &str) -> Self {
        Outbound::PublicMessage(format!("{sender}: {message}"))
    }

    pub fn private(sender: &str, message: &str) -> Self {
        Outbound::PrivateMessage(format!("{sender}: {message}"))
    }
}

/// Who a delivery goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    One(ConnectionId),
    /// Every connection registered at the moment the delivery is executed.
    All,
}

/// One routing decision: a payload and its target. Consumed immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub target: Target,
    pub payload: Outbound,
}

impl Delivery {
    pub fn broadcast(payload: Outbound) -> Self {
        Self {
            target: Target::All,
            payload,
        }
    }

    pub fn to(conn: ConnectionId, payload: Outbound) -> Self {
        Self {
            target: Target::One(conn),
            payload,
        }
    }
}
