//! Service helpers that expose read-only projections of the session.

use crate::{
    dto::common::SessionSnapshot,
    error::ServiceError,
    game::{
        race::Race,
        view::{self, BoonView, TeamView},
    },
    state::SharedState,
    store::models::TeamKey,
};

/// Return the derived session, exactly as SSE subscribers see it.
pub async fn get_session(state: &SharedState) -> Result<SessionSnapshot, ServiceError> {
    let snapshot = state.snapshot().await?;
    Ok(SessionSnapshot::derive(
        &snapshot,
        state.now(),
        state.timings(),
    ))
}

/// Return one team with its inventory and buzzer eligibility.
pub async fn get_team(state: &SharedState, name: &str) -> Result<TeamView, ServiceError> {
    let snapshot = state.snapshot().await?;
    let key = TeamKey::normalize(name);
    let team = snapshot
        .team(&key)
        .ok_or_else(|| ServiceError::NotFound(format!("team '{key}' has not joined")))?;

    let timings = state.timings();
    let race = Race::resolve(&snapshot.buzzes, timings.race_window_ms);
    Ok(TeamView::derive(
        team,
        &snapshot,
        &race,
        state.now(),
        timings,
    ))
}

/// Return the boon catalog.
pub fn list_boons() -> Vec<BoonView> {
    view::catalog()
}
