//! Inbound action envelope (JSON text frame).
//!
//! Clients send one flat object per frame; `action` selects the route and the
//! payload fields sit beside it:
//!
//! ```json
//! { "action": "sendPrivate", "to": "Carol", "message": "hi" }
//! ```

use serde::Deserialize;

use crate::error::{ParleyError, Result};

/// Inbound envelope. Extra fields are ignored so newer clients keep working.
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    /// Route selector (e.g. "setName").
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One routed event, either from the transport lifecycle or a client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedEvent {
    Connect,
    Disconnect,
    SetName { name: String },
    SendPublic { message: String },
    SendPrivate { to: String, message: String },
    /// Action the relay does not know. Accepted and ignored.
    Unknown(String),
}

impl RoutedEvent {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &str {
        match self {
            RoutedEvent::Connect => "connect",
            RoutedEvent::Disconnect => "disconnect",
            RoutedEvent::SetName { .. } => "setName",
            RoutedEvent::SendPublic { .. } => "sendPublic",
            RoutedEvent::SendPrivate { .. } => "sendPrivate",
            RoutedEvent::Unknown(_) => "unknown",
        }
    }
}

impl TryFrom<Envelope> for RoutedEvent {
    type Error = ParleyError;

    fn try_from(env: Envelope) -> Result<Self> {
        let action = env
            .action
            .ok_or_else(|| ParleyError::MalformedPayload("missing action".into()))?;

        // connect/disconnect come from the transport, never from a frame.
        let event = match action.as_str() {
            "setName" => RoutedEvent::SetName {
                name: required(env.name, "setName", "name")?,
            },
            "sendPublic" => RoutedEvent::SendPublic {
                message: required(env.message, "sendPublic", "message")?,
            },
            "sendPrivate" => RoutedEvent::SendPrivate {
                to: required(env.to, "sendPrivate", "to")?,
                message: required(env.message, "sendPrivate", "message")?,
            },
            _ => RoutedEvent::Unknown(action.clone()),
        };
        Ok(event)
    }
}

fn required(field: Option<String>, action: &str, name: &str) -> Result<String> {
    field.ok_or_else(|| ParleyError::MalformedPayload(format!("{action} requires {name}")))
}

/// Decode a client text frame into a routed event (decode once, no panics).
pub fn decode_event(s: &str) -> Result<RoutedEvent> {
    let env: Envelope = serde_json::from_str(s)
        .map_err(|e| ParleyError::MalformedPayload(format!("invalid envelope json: {e}")))?;
    RoutedEvent::try_from(env)
}
