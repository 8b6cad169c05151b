//! Event routing.
//!
//! `EventRouter` decides what to send; `Relay` couples it with the fan-out
//! executor so one call fully handles one inbound event.

pub mod relay;
pub mod router;

pub use relay::Relay;
pub use router::EventRouter;
