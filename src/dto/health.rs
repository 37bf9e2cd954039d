use serde::Serialize;
use utoipa::ToSchema;

use crate::{dto::format_millis, game::clock::Millis};

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Server wall clock, RFC 3339.
    pub server_time: String,
}

impl HealthResponse {
    /// Create a health response indicating the store is reachable.
    pub fn ok(now: Millis) -> Self {
        Self {
            status: "ok".to_string(),
            server_time: format_millis(now),
        }
    }

    /// Create a health response indicating the store is not answering.
    pub fn degraded(now: Millis) -> Self {
        Self {
            status: "degraded".to_string(),
            server_time: format_millis(now),
        }
    }
}
