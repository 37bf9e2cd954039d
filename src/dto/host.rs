//! DTO definitions used by the host REST API.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::{game::boon::BoonId, state::state_machine::Mode};

/// Switch the session mode.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ModeRequest {
    /// Mode to enter.
    pub mode: Mode,
}

/// Lock the race, optionally replacing the round's prize.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LockRaceRequest {
    /// Replacement prize; the drawn one is kept when absent.
    #[serde(default)]
    pub prize: Option<BoonId>,
}

/// Verdict on the current gauntlet contender.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GauntletDecisionRequest {
    /// Whether the contender answered correctly.
    pub correct: bool,
}

/// Offer the double-jeopardy wager to a team.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WagerOfferRequest {
    /// Name of the team receiving the offer.
    pub team: String,
}
