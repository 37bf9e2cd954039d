use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/session",
    tag = "sse",
    responses((status = 200, description = "Derived session stream", content_type = "text/event-stream", body = String))
)]
/// Stream the derived session to connected clients, starting with the current state.
pub async fn session_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let (receiver, opening) = sse_service::subscribe_session(&state).await;
    info!(
        subscribers = state.sse().subscriber_count(),
        "New session SSE connection"
    );
    sse_service::to_sse_stream(receiver, opening)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/session", get(session_stream))
}
