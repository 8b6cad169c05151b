//! Protocol modules.
//!
//! - `conn`: opaque connection identity assigned by the transport.
//! - `text`: inbound JSON action envelopes and the routed events they decode to.
//! - `outbound`: payloads sent to clients and the delivery instructions that
//!   carry them.
//!
//! Decoding is panic-free: malformed input is reported as
//! `ParleyError::MalformedPayload` instead of panicking.

pub mod conn;
pub mod outbound;
pub mod text;

pub use conn::ConnectionId;
pub use outbound::{Delivery, Outbound, Target};
pub use text::{decode_event, Envelope, RoutedEvent};
