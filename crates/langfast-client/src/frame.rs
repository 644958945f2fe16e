//! Engine.IO v4 / Socket.IO text frame codec.
//!
//! Only the handful of packet types the prompt runner uses are recognised.
//! The Engine.IO type is the first digit; message packets (`4`) carry a
//! Socket.IO packet type as the second digit.

use langfast_core::{BackendError, BackendResult};
use serde_json::Value;

/// Socket.IO event carrying one execution chunk.
pub const EXECUTION_CHUNK_EVENT: &str = "execution:chunk";

/// Engine.IO pong, the answer to a server ping.
pub const PONG_FRAME: &str = "3";

/// A decoded inbound text frame, borrowing its payload from the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePacket<'a> {
    /// `0{...}`: handshake data (sid, ping interval).
    Open(&'a str),
    /// `1`: transport close.
    Close,
    /// `2`: heartbeat ping, must be answered with a pong.
    Ping(&'a str),
    /// `3`: heartbeat pong.
    Pong,
    /// `40{...}`: namespace connect acknowledged.
    Connect(&'a str),
    /// `41`: namespace disconnect.
    Disconnect,
    /// `42[...]`: event message.
    Event(&'a str),
    /// `44{...}`: namespace connect refused.
    ConnectError(&'a str),
    /// Anything else (binary events, acks, upgrades).
    Other(&'a str),
}

impl<'a> EnginePacket<'a> {
    pub fn parse(frame: &'a str) -> Self {
        if let Some(rest) = frame.strip_prefix("42") {
            return Self::Event(rest);
        }
        if let Some(rest) = frame.strip_prefix("40") {
            return Self::Connect(rest);
        }
        if frame.starts_with("41") {
            return Self::Disconnect;
        }
        if let Some(rest) = frame.strip_prefix("44") {
            return Self::ConnectError(rest);
        }
        if let Some(rest) = frame.strip_prefix('0') {
            return Self::Open(rest);
        }
        if let Some(rest) = frame.strip_prefix('2') {
            return Self::Ping(rest);
        }
        match frame {
            "1" => Self::Close,
            "3" => Self::Pong,
            other => Self::Other(other),
        }
    }
}

/// Namespace connect frame authenticating with `token`.
pub fn connect_frame(token: &str) -> String {
    format!("40{}", serde_json::json!({ "token": token }))
}

/// Decode a Socket.IO event payload into `(event name, event data)`.
pub fn parse_event(payload: &str) -> BackendResult<(String, Value)> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| BackendError::Parse(format!("invalid event JSON: {e}")))?;

    let Value::Array(mut items) = value else {
        return Err(BackendError::Parse("event payload is not an array".into()));
    };
    if items.is_empty() {
        return Err(BackendError::Parse("event payload is empty".into()));
    }

    let data = if items.len() > 1 {
        items.swap_remove(1)
    } else {
        Value::Null
    };
    match items.swap_remove(0) {
        Value::String(name) => Ok((name, data)),
        other => Err(BackendError::Parse(format!(
            "event name is not a string: {other}"
        ))),
    }
}
