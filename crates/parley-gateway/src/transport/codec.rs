//! Frame classification for the transport layer.
//!
//! Only text frames carry protocol events. Size is checked here, before any
//! JSON parsing happens.

use axum::extract::ws::Message;

#[derive(Debug)]
pub enum Inbound {
    Text(String),
    Oversized { bytes_len: usize },
    /// Not part of the protocol.
    Binary { bytes_len: usize },
    Ping,
    Pong,
    Close,
}

pub fn classify(msg: Message, max_frame_bytes: usize) -> Inbound {
    match msg {
        Message::Text(s) if s.len() > max_frame_bytes => Inbound::Oversized { bytes_len: s.len() },
        Message::Text(s) => Inbound::Text(s),
        Message::Binary(b) => Inbound::Binary { bytes_len: b.len() },
        Message::Ping(_) => Inbound::Ping,
        Message::Pong(_) => Inbound::Pong,
        Message::Close(_) => Inbound::Close,
    }
}
