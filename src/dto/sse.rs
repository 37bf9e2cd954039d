use serde::Serialize;
use utoipa::ToSchema;

use crate::{dto::format_millis, game::clock::Millis};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name, if any.
    pub event: Option<String>,
    /// Serialized payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Server wall clock, RFC 3339; clients use it to estimate their skew.
    pub server_time: String,
}

impl Handshake {
    /// Handshake for the session stream, stamped with `now`.
    pub fn session(now: Millis) -> Self {
        Self {
            stream: "session".into(),
            message: "subscribed to session updates".into(),
            server_time: format_millis(now),
        }
    }
}
