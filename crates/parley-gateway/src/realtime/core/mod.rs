//! Realtime core components for the relay runtime.
//!
//! Session registry (roster), the transport connection table, and the fan-out
//! executor that turns router output into sends.

mod connections;
mod fanout;
mod session_registry;

pub use connections::ConnectionTable;
pub use fanout::{DeliverySink, Fanout, FanoutReport};
pub use session_registry::{RosterEntry, SessionRegistry};
