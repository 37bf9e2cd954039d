use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::{common::SessionSnapshot, sse::{Handshake, ServerEvent}},
    services::sse_events::{self, EVENT_HANDSHAKE, EVENT_SESSION},
    state::SharedState,
};

/// Subscribe to the session stream.
///
/// The returned events open the stream: the handshake carrying the server
/// clock, then the current session, so a client never waits for the next
/// change to render.
pub async fn subscribe_session(
    state: &SharedState,
) -> (broadcast::Receiver<ServerEvent>, Vec<ServerEvent>) {
    let receiver = state.sse().subscribe();
    let now = state.now();

    let mut opening: Vec<ServerEvent> =
        sse_events::server_event(EVENT_HANDSHAKE, &Handshake::session(now))
            .into_iter()
            .collect();
    match state.snapshot().await {
        Ok(snapshot) => opening.extend(sse_events::server_event(
            EVENT_SESSION,
            &SessionSnapshot::derive(&snapshot, now, state.timings()),
        )),
        Err(err) => warn!(error = %err, "session unavailable for new SSE subscriber"),
    }

    (receiver, opening)
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a broadcast receiver into an SSE response, forwarding events until
/// the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    opening: Vec<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        for payload in opening {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        // Every session event is a full snapshot, so skipping is safe.
                        Err(RecvError::Lagged(_)) => continue,
                    }
                }
            }
        }

        info!("session SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
