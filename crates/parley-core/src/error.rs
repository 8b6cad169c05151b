//! Shared error type across parley crates.

use thiserror::Error;

use crate::protocol::ConnectionId;

/// Shared result type.
pub type Result<T> = std::result::Result<T, ParleyError>;

/// Unified error type used by core and gateway.
///
/// None of these are ever sent back to a client: the protocol has no error
/// reply. They are logged where they are recovered.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Naming or resolving a connection id that is not registered.
    #[error("unknown connection: {0}")]
    UnknownConnection(ConnectionId),
    /// Unparsable frame or missing required field.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    /// Per-recipient send failure. Never fatal for the event.
    #[error("delivery to {conn} failed: {reason}")]
    DeliveryFailure { conn: ConnectionId, reason: String },
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Stable short label, used as a log field and metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            ParleyError::UnknownConnection(_) => "unknown_connection",
            ParleyError::MalformedPayload(_) => "malformed_payload",
            ParleyError::DeliveryFailure { .. } => "delivery_failure",
            ParleyError::Config(_) => "config",
            ParleyError::Internal(_) => "internal",
        }
    }
}
