use std::sync::Arc;

use axum::extract::ws::Message;

use parley_core::error::{ParleyError, Result};
use parley_core::Outbound;

/// Payload serialized once and shared by every recipient of a broadcast.
#[derive(Debug, Clone)]
pub struct PreparedMsg(Arc<str>);

impl PreparedMsg {
    pub fn prepare(out: &Outbound) -> Result<Self> {
        let s = serde_json::to_string(out)
            .map_err(|e| ParleyError::Internal(format!("json encode failed: {e}")))?;
        Ok(Self(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to axum::ws::Message for transport.
    /// NOTE: axum 0.7 text frames own a String, so every recipient copies.
    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.0.to_string())
    }
}
