use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::game::clock::Millis;

/// Response shapes shared by every route.
pub mod common;
/// Health check payloads.
pub mod health;
/// Host request bodies.
pub mod host;
/// Coarse phase exposed to clients.
pub mod phase;
/// Server-Sent Events payloads.
pub mod sse;
/// Team request and response bodies.
pub mod team;
/// Input validation helpers.
pub mod validation;

fn format_millis(millis: Millis) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|time| time.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}
