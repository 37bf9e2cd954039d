//! DTO definitions used by the team-facing REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::validate_team_name,
    game::{boon::BoonId, vote::VoteChoice},
    store::models::TeamKey,
};

/// Payload used to join the session as a team.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRequest {
    /// Display name, 1 to 20 characters after trimming.
    pub name: String,
}

impl Validate for JoinRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_team_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Team document returned after joining.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinResponse {
    /// Normalized identity.
    pub key: TeamKey,
    /// Display name as first joined.
    pub name: String,
    /// Boons currently held.
    pub inventory: Vec<BoonId>,
}

/// Ballot submitted by a team.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VoteRequest {
    /// `ACCEPT`/`REJECT` for hint votes, `DONE` for the focus ready check.
    pub vote: VoteChoice,
}

/// Boon activation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UseBoonRequest {
    /// Boon to play.
    pub boon: BoonId,
    /// Target team name, required by the Silencer.
    #[serde(default)]
    pub target: Option<String>,
}

/// Answer to a double-jeopardy offer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WagerDecisionRequest {
    /// `true` to take the wager.
    pub accept: bool,
}
