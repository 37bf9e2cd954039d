use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the store and report the server clock.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let now = state.now();
    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(now),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded(now)
        }
    }
}
