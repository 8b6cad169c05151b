//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler and the frame classifier that runs before
//! anything reaches the relay.

pub mod codec;
pub mod ws;
