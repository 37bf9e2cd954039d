//! Derived session view.
//!
//! Every client computes this from the same replicated fields, so the view is a
//! pure function of a [`Snapshot`], the current instant and the timings.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::GameTimings,
    game::{
        boon::{BoonId, CATALOG},
        clock::{self, Millis},
        race::{BuzzEligibility, Race, Standing},
        vote::{self, HintPhase, Tally},
        wager,
    },
    state::state_machine::{FocusPhase, Mode, RoundPhase, SessionPhase},
    store::{
        Snapshot,
        models::{
            ActiveBoonUsage, DjOffer, DjResult, HintRequest, HintResult, LastWinner,
            SilenceEffect, TeamEntity, TeamKey, VoteOverride,
        },
    },
};

/// Catalog entry as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoonView {
    /// Stable identifier.
    pub id: BoonId,
    /// Display name.
    pub name: String,
    /// Rule text.
    pub description: String,
    /// Whether playing it needs a target team.
    pub requires_target: bool,
    /// Whether the holder can play it.
    pub self_activatable: bool,
}

impl From<BoonId> for BoonView {
    fn from(id: BoonId) -> Self {
        let boon = id.boon();
        Self {
            id,
            name: boon.name.to_owned(),
            description: boon.description.to_owned(),
            requires_target: boon.requires_target,
            self_activatable: boon.self_activatable,
        }
    }
}

/// Whole catalog in display order.
pub fn catalog() -> Vec<BoonView> {
    CATALOG.iter().map(|boon| BoonView::from(boon.id)).collect()
}

/// Lightning round as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    /// Identity of the round.
    pub round_id: Uuid,
    /// Current round phase.
    pub phase: RoundPhase,
    /// Boon awarded to the gauntlet winner.
    pub prize: BoonView,
    /// Time until the prize reveal while spinning.
    pub reveal_in_ms: Option<Millis>,
    /// Gauntlet step, zero before the race is locked.
    pub step: u8,
    /// Team answering in the gauntlet.
    pub contender: Option<String>,
    /// Ranks 1 to 3.
    pub contenders: Vec<Standing>,
    /// Teams that buzzed past third place.
    pub too_slow: Vec<Standing>,
    /// Time left in the race window, once someone buzzed.
    pub window_remaining_ms: Option<Millis>,
}

/// Hint mode as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HintView {
    /// Hint sub-phase.
    pub phase: HintPhase,
    /// Outstanding hint request.
    pub request: Option<HintRequest>,
    /// Time left to vote.
    pub vote_remaining_ms: Option<Millis>,
    /// Hint countdown, frozen while paused.
    pub clock_remaining_ms: Option<Millis>,
    /// Whether a passed vote froze the countdown.
    pub paused: bool,
    /// Ballots cast so far.
    pub tally: Tally,
    /// Outcome of the previous vote.
    pub last_result: Option<HintResult>,
}

/// Hyper Focus as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FocusView {
    /// Ready check or countdown.
    pub phase: FocusPhase,
    /// Countdown left, once started.
    pub remaining_ms: Option<Millis>,
    /// Teams that signalled readiness.
    pub ready: Vec<String>,
}

/// Double-jeopardy state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WagerView {
    /// Open offer.
    pub offer: Option<DjOffer>,
    /// Decision time left on the open offer.
    pub remaining_ms: Option<Millis>,
    /// Last settled wager.
    pub result: Option<DjResult>,
}

/// One team with its inventory and buzzer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    /// Display name.
    pub name: String,
    /// Normalized identity.
    pub key: TeamKey,
    /// Held boons in the order they were won.
    pub inventory: Vec<BoonView>,
    /// Whether the team may buzz right now.
    pub buzzer: BuzzEligibility,
    /// Whether the team has a ballot in the tally.
    pub voted: bool,
}

/// Everything a client renders, derived from the shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Document version the view was derived from.
    pub version: u64,
    /// Server clock at derivation.
    pub now: Millis,
    /// Session mode.
    pub mode: Mode,
    /// Lightning round, when one runs.
    pub round: Option<RoundView>,
    /// Hint state, in hint mode only.
    pub hint: Option<HintView>,
    /// Hyper Focus state, in that mode only.
    pub focus: Option<FocusView>,
    /// Double-jeopardy offer and result.
    pub wager: WagerView,
    /// Teams in join order.
    pub teams: Vec<TeamView>,
    /// Silencers still in effect.
    pub silenced: Vec<SilenceEffect>,
    /// EXEC_ORDER or FILIBUSTER waiting for the next vote.
    pub pending_override: Option<VoteOverride>,
    /// Most recent boon play.
    pub active_boon_usage: Option<ActiveBoonUsage>,
    /// Winner of the last gauntlet.
    pub last_winner: Option<LastWinner>,
}

impl SessionView {
    /// Derive the view every client would compute from `snapshot`.
    pub fn derive(snapshot: &Snapshot, now: Millis, timings: &GameTimings) -> Self {
        let doc = &snapshot.doc;
        let phase = SessionPhase::of(doc);
        let race = Race::resolve(&snapshot.buzzes, timings.race_window_ms);

        let round = doc.boon_round.as_ref().filter(|_| doc.mode == Mode::Lightning).map(|round| {
            let current = (round.phase == RoundPhase::Gauntlet)
                .then(|| race.at_rank(usize::from(round.step)))
                .flatten();
            RoundView {
                round_id: round.round_id,
                phase: round.phase,
                prize: round.boon_id.into(),
                reveal_in_ms: (round.phase == RoundPhase::Spinning)
                    .then(|| clock::remaining(round.started_at, timings.spin_delay_ms, now)),
                step: round.step,
                contender: current.map(|standing| standing.team.clone()),
                contenders: race.contenders().to_vec(),
                too_slow: race.too_slow().to_vec(),
                window_remaining_ms: race.window_remaining(now),
            }
        });

        let hint = match phase {
            SessionPhase::Hint(hint_phase) => Some(HintView {
                phase: hint_phase,
                request: doc.hint_request.clone(),
                vote_remaining_ms: doc.hint_request.as_ref().map(|request| {
                    (vote::vote_deadline(request, timings.vote_window_ms) - now).max(0)
                }),
                clock_remaining_ms: vote::hint_clock_remaining(
                    doc.hint_timer_start,
                    doc.hint_timer_paused,
                    timings.hint_clock_ms,
                    now,
                ),
                paused: doc.hint_timer_paused.is_some(),
                tally: Tally::count(&snapshot.votes),
                last_result: doc.hint_result.clone(),
            }),
            _ => None,
        };

        let focus = match phase {
            SessionPhase::HyperFocus(focus_phase) => Some(FocusView {
                phase: focus_phase,
                remaining_ms: doc
                    .focus_timer_start
                    .map(|start| clock::remaining(start, timings.focus_clock_ms, now)),
                ready: snapshot
                    .votes
                    .iter()
                    .map(|entry| entry.team_name.clone())
                    .collect(),
            }),
            _ => None,
        };

        let wager = WagerView {
            offer: doc.dj_offer.clone(),
            remaining_ms: doc
                .dj_offer
                .as_ref()
                .filter(|offer| !wager::is_expired(offer, now))
                .map(|offer| offer.expires_at - now),
            result: doc.dj_result.clone(),
        };

        let teams = snapshot
            .teams
            .iter()
            .map(|team| TeamView::derive(team, snapshot, &race, now, timings))
            .collect();

        Self {
            version: doc.version,
            now,
            mode: doc.mode,
            round,
            hint,
            focus,
            wager,
            teams,
            silenced: doc
                .silenced
                .iter()
                .filter(|effect| now - effect.timestamp < timings.silence_ms)
                .cloned()
                .collect(),
            pending_override: doc.vote_override.clone(),
            active_boon_usage: doc.active_boon_usage.clone(),
            last_winner: doc.last_winner.clone(),
        }
    }
}

impl TeamView {
    /// Derive one team row against the ranked `race`.
    pub fn derive(
        team: &TeamEntity,
        snapshot: &Snapshot,
        race: &Race,
        now: Millis,
        timings: &GameTimings,
    ) -> Self {
        let key = team.key();
        let buzzing = SessionPhase::of(&snapshot.doc)
            == SessionPhase::Lightning(Some(RoundPhase::Buzzing));
        Self {
            name: team.name.clone(),
            inventory: team.inventory.iter().copied().map(BoonView::from).collect(),
            buzzer: BuzzEligibility::evaluate(
                buzzing,
                race,
                &snapshot.doc.silenced,
                &key,
                now,
                timings.silence_ms,
            ),
            voted: snapshot.votes.iter().any(|entry| entry.key() == key),
            key,
        }
    }
}
