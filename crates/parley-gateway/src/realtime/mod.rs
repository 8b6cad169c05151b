//! Realtime runtime (roster + egress) for the parley gateway.

pub mod core;
pub mod types;

pub use self::core::{ConnectionTable, DeliverySink, Fanout, FanoutReport, RosterEntry, SessionRegistry};
pub use types::PreparedMsg;
