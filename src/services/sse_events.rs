use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{common::SessionSnapshot, sse::ServerEvent},
    state::SharedState,
    store::Snapshot,
};

pub(crate) const EVENT_SESSION: &str = "session";
pub(crate) const EVENT_HANDSHAKE: &str = "handshake";

/// Derive the session from `snapshot` and publish it to every subscriber.
pub fn broadcast_session(state: &SharedState, snapshot: &Snapshot) {
    let payload = SessionSnapshot::derive(snapshot, state.now(), state.timings());
    send_event(state, EVENT_SESSION, &payload);
}

/// Serialize `payload` as a named SSE event.
pub(crate) fn server_event(event: &str, payload: &impl Serialize) -> Option<ServerEvent> {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event, error = %err, "failed to serialize SSE payload");
            None
        }
    }
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    if let Some(event) = server_event(event, payload) {
        state.sse().broadcast(event);
    }
}
