use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// Liveness endpoint.
pub mod health;
/// Host control endpoints.
pub mod host;
/// Read-only session views.
pub mod session;
/// Server-Sent Events stream.
pub mod sse;
/// Team device endpoints.
pub mod team;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(session::router())
        .merge(team::router())
        .merge(host::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
