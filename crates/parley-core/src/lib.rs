//! parley core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire-level contracts (inbound action envelopes,
//! outbound payloads, delivery instructions) and the error surface shared by
//! the gateway and its tests. It carries no transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! surfaces as `ParleyError`/`Result` so one hostile frame cannot take the
//! relay down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ParleyError, Result};
pub use protocol::{ConnectionId, Delivery, Outbound, RoutedEvent, Target};
