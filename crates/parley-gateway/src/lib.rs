//! parley gateway library entry.
//!
//! Wires the WebSocket transport, the session registry, the event router and
//! the fan-out executor into a presence-aware chat relay. Consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod realtime;
pub mod router;
pub mod transport;
