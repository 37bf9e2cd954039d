//! Documents held by the Shared State Store.
//!
//! Field names on the wire follow the replicated document layout
//! (`boonRound`, `hintTimerStart`, ...). Every field has a neutral default, so
//! a partially written or missing document still deserializes into a valid
//! session.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    game::{
        boon::BoonId,
        clock::Millis,
        vote::{VoteChoice, VoteOutcome},
        wager::WagerOutcome,
    },
    state::state_machine::{Mode, RoundPhase},
};

/// Normalized team identity: the trimmed, lowercased display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TeamKey(String);

impl TeamKey {
    /// Derive the key from any spelling of a team name.
    pub fn normalize(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// Normalized key as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `name` refers to this team.
    pub fn matches(&self, name: &str) -> bool {
        *self == Self::normalize(name)
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prize round currently running inside Lightning mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoonRound {
    /// Identity of the round, used to key its scheduled reveal.
    pub round_id: Uuid,
    /// Prize of the round.
    pub boon_id: BoonId,
    /// Current round phase.
    pub phase: RoundPhase,
    /// Gauntlet step (1-based); zero before the race is locked.
    #[serde(default)]
    pub step: u8,
    /// Instant the round entered `SPINNING`.
    pub started_at: Millis,
}

/// Outstanding hint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HintRequest {
    /// Requesting team.
    pub team: String,
    /// Request instant; opens the vote window.
    pub timestamp: Millis,
}

/// Outcome of the last resolved hint vote, kept for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HintResult {
    /// Pass or fail.
    pub outcome: VoteOutcome,
    /// Team that requested the hint.
    pub team: String,
    /// Accept ballots counted.
    pub accept: u32,
    /// Reject ballots counted.
    pub reject: u32,
    /// Boon that forced the outcome, if any.
    #[serde(default)]
    pub overridden_by: Option<BoonId>,
    /// Instant the vote window closed.
    pub timestamp: Millis,
}

/// Pending EXEC_ORDER / FILIBUSTER waiting for the next hint resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteOverride {
    /// Boon that was played.
    pub boon_id: BoonId,
    /// Team that played it.
    pub team: String,
    /// Outcome it forces.
    pub outcome: VoteOutcome,
}

/// Double-jeopardy offer awaiting the team's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DjOffer {
    /// Identity of the offer, used to key its expiry.
    pub id: Uuid,
    /// Team offered the wager.
    pub team: String,
    /// Instant the offer lapses as rejected.
    pub expires_at: Millis,
}

/// Settled double-jeopardy wager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DjResult {
    /// Accepted or rejected.
    pub outcome: WagerOutcome,
    /// Team that held the offer.
    pub team: String,
    /// Settlement instant.
    pub timestamp: Millis,
}

/// Silencer applied by `user` against `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SilenceEffect {
    /// Silenced team.
    pub target: String,
    /// Team that played the Silencer.
    pub user: String,
    /// Activation instant; the silence runs from here.
    pub timestamp: Millis,
}

/// Presentation-only notice that a team just played a boon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBoonUsage {
    /// Boon that was played.
    pub boon_id: BoonId,
    /// Team that played it.
    pub team_name: String,
    /// Target team, if any.
    #[serde(default)]
    pub target: Option<String>,
    /// Activation instant.
    pub timestamp: Millis,
}

/// Winner of the most recent gauntlet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastWinner {
    /// Winning team.
    pub team: String,
    /// Boon it won.
    pub boon_id: BoonId,
}

/// The single shared session document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionDoc {
    /// Bumped by the store on every committed write.
    pub version: u64,
    /// Current mode.
    pub mode: Mode,
    /// Lightning round in progress.
    pub boon_round: Option<BoonRound>,
    /// Outstanding hint request.
    pub hint_request: Option<HintRequest>,
    /// Last resolved hint vote.
    pub hint_result: Option<HintResult>,
    /// Epoch of the hint countdown.
    pub hint_timer_start: Option<Millis>,
    /// Remaining hint clock captured when a vote passed.
    pub hint_timer_paused: Option<Millis>,
    /// Pending forced outcome for the next hint vote.
    pub vote_override: Option<VoteOverride>,
    /// Epoch of the Hyper Focus countdown.
    pub focus_timer_start: Option<Millis>,
    /// Open double-jeopardy offer.
    pub dj_offer: Option<DjOffer>,
    /// Last settled wager.
    pub dj_result: Option<DjResult>,
    /// Prizes already drawn from the current deck.
    pub used_boons: Vec<BoonId>,
    /// Silencers played this round.
    pub silenced: Vec<SilenceEffect>,
    /// Most recent boon play.
    pub active_boon_usage: Option<ActiveBoonUsage>,
    /// Winner of the last gauntlet.
    pub last_winner: Option<LastWinner>,
}

/// Partial write merged into [`SessionDoc`].
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears the
/// stored value. `push_silenced` appends instead of replacing so concurrent
/// silencers from different teams are never lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    /// Mode.
    pub mode: Option<Mode>,
    /// Round.
    pub boon_round: Option<Option<BoonRound>>,
    /// Hint request.
    pub hint_request: Option<Option<HintRequest>>,
    /// Hint result.
    pub hint_result: Option<Option<HintResult>>,
    /// Hint epoch.
    pub hint_timer_start: Option<Option<Millis>>,
    /// Paused hint remaining.
    pub hint_timer_paused: Option<Option<Millis>>,
    /// Vote override.
    pub vote_override: Option<Option<VoteOverride>>,
    /// Focus epoch.
    pub focus_timer_start: Option<Option<Millis>>,
    /// Wager offer.
    pub dj_offer: Option<Option<DjOffer>>,
    /// Wager result.
    pub dj_result: Option<Option<DjResult>>,
    /// Drawn prizes.
    pub used_boons: Option<Vec<BoonId>>,
    /// Replaces the whole list.
    pub silenced: Option<Vec<SilenceEffect>>,
    /// Appended to the stored list.
    pub push_silenced: Vec<SilenceEffect>,
    /// Boon usage notice.
    pub active_boon_usage: Option<Option<ActiveBoonUsage>>,
    /// Last winner.
    pub last_winner: Option<Option<LastWinner>>,
}

fn merge_field<T>(slot: &mut T, update: Option<T>) {
    if let Some(value) = update {
        *slot = value;
    }
}

impl SessionDoc {
    /// Apply a partial write and bump the document version.
    pub fn merge(&mut self, patch: SessionPatch) {
        let SessionPatch {
            mode,
            boon_round,
            hint_request,
            hint_result,
            hint_timer_start,
            hint_timer_paused,
            vote_override,
            focus_timer_start,
            dj_offer,
            dj_result,
            used_boons,
            silenced,
            push_silenced,
            active_boon_usage,
            last_winner,
        } = patch;

        merge_field(&mut self.mode, mode);
        merge_field(&mut self.boon_round, boon_round);
        merge_field(&mut self.hint_request, hint_request);
        merge_field(&mut self.hint_result, hint_result);
        merge_field(&mut self.hint_timer_start, hint_timer_start);
        merge_field(&mut self.hint_timer_paused, hint_timer_paused);
        merge_field(&mut self.vote_override, vote_override);
        merge_field(&mut self.focus_timer_start, focus_timer_start);
        merge_field(&mut self.dj_offer, dj_offer);
        merge_field(&mut self.dj_result, dj_result);
        merge_field(&mut self.used_boons, used_boons);
        merge_field(&mut self.silenced, silenced);
        self.silenced.extend(push_silenced);
        merge_field(&mut self.active_boon_usage, active_boon_usage);
        merge_field(&mut self.last_winner, last_winner);

        self.version += 1;
    }
}

/// Entry of the buzz ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuzzEntity {
    /// Display name of the buzzing team.
    pub team_name: String,
    /// Submission instant supplied by the buzzing device.
    pub timestamp: Millis,
}

impl BuzzEntity {
    /// Normalized identity of the buzzing team.
    pub fn key(&self) -> TeamKey {
        TeamKey::normalize(&self.team_name)
    }
}

/// Entry of the vote tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteEntity {
    /// Display name of the voting team.
    pub team_name: String,
    /// Ballot cast.
    pub vote: VoteChoice,
}

impl VoteEntity {
    /// Normalized identity of the voting team.
    pub fn key(&self) -> TeamKey {
        TeamKey::normalize(&self.team_name)
    }
}

/// Team document, one per normalized key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntity {
    /// Display name as first joined.
    pub name: String,
    /// Held, unspent boons in the order they were won.
    #[serde(default)]
    pub inventory: Vec<BoonId>,
}

impl TeamEntity {
    /// Team with an empty inventory.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inventory: Vec::new(),
        }
    }

    /// Normalized identity.
    pub fn key(&self) -> TeamKey {
        TeamKey::normalize(&self.name)
    }
}
