use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::GameTimings,
    game::{
        boon::{BoonId, Draw},
        clock::Millis,
        vote::{self, HintPhase, Tally, VoteOutcome},
    },
    store::models::{BoonRound, HintRequest, HintResult, LastWinner, SessionDoc, SessionPatch},
};

/// Top-level session mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Waiting room between games.
    #[default]
    Lobby,
    /// Buzzer race rounds with a boon prize.
    Lightning,
    /// Question clock with hint voting.
    Hint,
    /// Timed focus question with a ready check.
    HyperFocus,
}

/// Phase of a Lightning prize round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    /// The prize wheel is spinning; reveal is scheduled.
    Spinning,
    /// The prize is shown; buzzers are still closed.
    Reveal,
    /// Buzzers are open.
    Buzzing,
    /// Race locked; contenders answer one at a time.
    Gauntlet,
}

/// Hyper Focus sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusPhase {
    /// Teams signal readiness.
    ReadyCheck,
    /// The focus clock is running.
    Countdown,
}

/// Phase of the whole session as derived from the shared document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing running.
    Lobby,
    /// Lightning mode; `None` between rounds.
    Lightning(Option<RoundPhase>),
    /// Hint mode.
    Hint(HintPhase),
    /// Hyper Focus mode.
    HyperFocus(FocusPhase),
}

impl SessionPhase {
    /// Derive the phase from stored fields only.
    pub fn of(doc: &SessionDoc) -> Self {
        match doc.mode {
            Mode::Lobby => SessionPhase::Lobby,
            Mode::Lightning => {
                SessionPhase::Lightning(doc.boon_round.as_ref().map(|round| round.phase))
            }
            Mode::Hint => SessionPhase::Hint(HintPhase::derive(
                doc.hint_request.as_ref(),
                doc.hint_timer_paused,
            )),
            Mode::HyperFocus => SessionPhase::HyperFocus(if doc.focus_timer_start.is_some() {
                FocusPhase::Countdown
            } else {
                FocusPhase::ReadyCheck
            }),
        }
    }

    /// Mode this phase belongs to.
    pub fn mode(&self) -> Mode {
        match self {
            SessionPhase::Lobby => Mode::Lobby,
            SessionPhase::Lightning(_) => Mode::Lightning,
            SessionPhase::Hint(_) => Mode::Hint,
            SessionPhase::HyperFocus(_) => Mode::HyperFocus,
        }
    }
}

/// Events that can be applied to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Return to the lobby, abandoning whatever was running.
    EnterLobby,
    /// Start a Lightning prize round with a freshly drawn boon.
    StartRound {
        /// Identity of the new round.
        round_id: Uuid,
        /// Result of the deck draw.
        draw: Draw,
    },
    /// Spin delay elapsed for the given round.
    Reveal {
        /// Round whose reveal fired.
        round_id: Uuid,
    },
    /// Host opens the buzzers.
    OpenBuzzing,
    /// Host locks the race and starts the gauntlet.
    LockRace {
        /// Number of buzzes in the ledger at lock time.
        buzz_count: usize,
        /// Replacement prize chosen by the host.
        prize: Option<BoonId>,
    },
    /// Move the gauntlet to the next contender.
    AdvanceGauntlet {
        /// Next 1-based step.
        step: u8,
    },
    /// Close the current round, with or without a winner.
    EndRound {
        /// Winner to record, if any.
        winner: Option<LastWinner>,
    },
    /// Enter Hint mode with a fresh clock.
    EnterHint,
    /// A team asks for a hint.
    RequestHint {
        /// Requesting team's display name.
        team: String,
    },
    /// Vote window of a hint request closed.
    ResolveHint {
        /// Identity of the request being resolved.
        request_timestamp: Millis,
        /// Ballots counted at resolution time.
        tally: Tally,
    },
    /// Host resumes a paused hint clock.
    ResumeHint,
    /// Host cancels the pending request and wipes ballots.
    ClearHint,
    /// Enter Hyper Focus in ready check.
    EnterHyperFocus,
    /// Host starts the focus clock.
    StartFocusCountdown,
    /// Host returns Hyper Focus to ready check.
    ResetFocus,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the session was in when the invalid event was received.
    pub from: SessionPhase,
    /// The event that cannot be applied from this phase.
    pub event: SessionEvent,
}

/// A validated transition, ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Phase the session is currently in.
    pub from: SessionPhase,
    /// Phase the session will be in once the patch lands.
    pub to: SessionPhase,
    /// Field merge to write.
    pub patch: SessionPatch,
    /// Whether the buzz ledger must be wiped.
    pub clear_buzzes: bool,
    /// Whether the vote tally must be wiped.
    pub clear_votes: bool,
}

impl Plan {
    fn new(from: SessionPhase, to: SessionPhase, patch: SessionPatch) -> Self {
        Self {
            from,
            to,
            patch,
            clear_buzzes: false,
            clear_votes: false,
        }
    }

    fn clearing_buzzes(mut self) -> Self {
        self.clear_buzzes = true;
        self
    }

    fn clearing_votes(mut self) -> Self {
        self.clear_votes = true;
        self
    }
}

/// Compute the write that moves `doc` through `event`.
///
/// Pure: the same document, event and instant always yield the same plan.
pub fn plan(
    doc: &SessionDoc,
    event: SessionEvent,
    now: Millis,
    timings: &GameTimings,
) -> Result<Plan, InvalidTransition> {
    let from = SessionPhase::of(doc);
    let invalid = |event| Err(InvalidTransition { from, event });

    let plan = match (from, &event) {
        (_, SessionEvent::EnterLobby) => Plan::new(
            from,
            SessionPhase::Lobby,
            SessionPatch {
                mode: Some(Mode::Lobby),
                boon_round: Some(None),
                silenced: Some(Vec::new()),
                hint_request: Some(None),
                hint_timer_start: Some(None),
                hint_timer_paused: Some(None),
                focus_timer_start: Some(None),
                ..SessionPatch::default()
            },
        )
        .clearing_buzzes()
        .clearing_votes(),

        (
            SessionPhase::Lobby | SessionPhase::Lightning(None),
            SessionEvent::StartRound { round_id, draw },
        ) => Plan::new(
            from,
            SessionPhase::Lightning(Some(RoundPhase::Spinning)),
            SessionPatch {
                mode: Some(Mode::Lightning),
                boon_round: Some(Some(BoonRound {
                    round_id: *round_id,
                    boon_id: draw.boon,
                    phase: RoundPhase::Spinning,
                    step: 0,
                    started_at: now,
                })),
                used_boons: Some(draw.used.clone()),
                silenced: Some(Vec::new()),
                ..SessionPatch::default()
            },
        )
        .clearing_buzzes(),

        (SessionPhase::Lightning(Some(RoundPhase::Spinning)), SessionEvent::Reveal { round_id }) => {
            match &doc.boon_round {
                Some(round) if round.round_id == *round_id => {
                    round_step(from, round, RoundPhase::Reveal, round.step)
                }
                _ => return invalid(event.clone()),
            }
        }

        (SessionPhase::Lightning(Some(RoundPhase::Reveal)), SessionEvent::OpenBuzzing) => {
            match &doc.boon_round {
                Some(round) => round_step(from, round, RoundPhase::Buzzing, round.step),
                None => return invalid(event.clone()),
            }
        }

        (
            SessionPhase::Lightning(Some(RoundPhase::Buzzing)),
            SessionEvent::LockRace { buzz_count, prize },
        ) if *buzz_count > 0 => match &doc.boon_round {
            Some(round) => {
                let mut plan = round_step(from, round, RoundPhase::Gauntlet, 1);
                if let (Some(prize), Some(Some(locked))) = (prize, plan.patch.boon_round.as_mut())
                {
                    locked.boon_id = *prize;
                }
                plan
            }
            None => return invalid(event.clone()),
        },

        (
            SessionPhase::Lightning(Some(RoundPhase::Gauntlet)),
            SessionEvent::AdvanceGauntlet { step },
        ) => match &doc.boon_round {
            Some(round) if *step > round.step => {
                round_step(from, round, RoundPhase::Gauntlet, *step)
            }
            _ => return invalid(event.clone()),
        },

        (SessionPhase::Lightning(Some(_)), SessionEvent::EndRound { winner }) => {
            let mut patch = SessionPatch {
                boon_round: Some(None),
                silenced: Some(Vec::new()),
                ..SessionPatch::default()
            };
            if let Some(winner) = winner {
                patch.last_winner = Some(Some(winner.clone()));
            }
            Plan::new(from, SessionPhase::Lightning(None), patch).clearing_buzzes()
        }

        (SessionPhase::Lobby, SessionEvent::EnterHint) => Plan::new(
            from,
            SessionPhase::Hint(HintPhase::Idle),
            SessionPatch {
                mode: Some(Mode::Hint),
                hint_request: Some(None),
                hint_result: Some(None),
                hint_timer_start: Some(Some(now)),
                hint_timer_paused: Some(None),
                ..SessionPatch::default()
            },
        )
        .clearing_votes(),

        (SessionPhase::Hint(HintPhase::Idle), SessionEvent::RequestHint { team }) => Plan::new(
            from,
            SessionPhase::Hint(HintPhase::VoteActive),
            SessionPatch {
                hint_request: Some(Some(HintRequest {
                    team: team.clone(),
                    timestamp: now,
                })),
                ..SessionPatch::default()
            },
        )
        .clearing_votes(),

        (
            SessionPhase::Hint(HintPhase::VoteActive),
            SessionEvent::ResolveHint {
                request_timestamp,
                tally,
            },
        ) => match &doc.hint_request {
            Some(request) if request.timestamp == *request_timestamp => {
                resolve_hint(from, doc, request, tally, timings)
            }
            _ => return invalid(event.clone()),
        },

        (SessionPhase::Hint(HintPhase::Paused), SessionEvent::ResumeHint) => {
            let remaining = doc.hint_timer_paused.unwrap_or_default();
            Plan::new(
                from,
                SessionPhase::Hint(HintPhase::Idle),
                SessionPatch {
                    hint_timer_start: Some(Some(vote::resumed_epoch(
                        now,
                        timings.hint_clock_ms,
                        remaining,
                    ))),
                    hint_timer_paused: Some(None),
                    ..SessionPatch::default()
                },
            )
        }

        (SessionPhase::Hint(phase), SessionEvent::ClearHint) => {
            let to = if phase == HintPhase::Paused {
                HintPhase::Paused
            } else {
                HintPhase::Idle
            };
            Plan::new(
                from,
                SessionPhase::Hint(to),
                SessionPatch {
                    hint_request: Some(None),
                    ..SessionPatch::default()
                },
            )
            .clearing_votes()
        }

        (SessionPhase::Lobby, SessionEvent::EnterHyperFocus) => Plan::new(
            from,
            SessionPhase::HyperFocus(FocusPhase::ReadyCheck),
            SessionPatch {
                mode: Some(Mode::HyperFocus),
                focus_timer_start: Some(None),
                ..SessionPatch::default()
            },
        )
        .clearing_votes(),

        (
            SessionPhase::HyperFocus(FocusPhase::ReadyCheck),
            SessionEvent::StartFocusCountdown,
        ) => Plan::new(
            from,
            SessionPhase::HyperFocus(FocusPhase::Countdown),
            SessionPatch {
                focus_timer_start: Some(Some(now)),
                ..SessionPatch::default()
            },
        ),

        (SessionPhase::HyperFocus(_), SessionEvent::ResetFocus) => Plan::new(
            from,
            SessionPhase::HyperFocus(FocusPhase::ReadyCheck),
            SessionPatch {
                focus_timer_start: Some(None),
                ..SessionPatch::default()
            },
        )
        .clearing_votes(),

        _ => return invalid(event.clone()),
    };

    Ok(plan)
}

fn round_step(from: SessionPhase, round: &BoonRound, phase: RoundPhase, step: u8) -> Plan {
    Plan::new(
        from,
        SessionPhase::Lightning(Some(phase)),
        SessionPatch {
            boon_round: Some(Some(BoonRound {
                phase,
                step,
                ..round.clone()
            })),
            ..SessionPatch::default()
        },
    )
}

fn resolve_hint(
    from: SessionPhase,
    doc: &SessionDoc,
    request: &HintRequest,
    tally: &Tally,
    timings: &GameTimings,
) -> Plan {
    let closed_at = vote::vote_deadline(request, timings.vote_window_ms);
    let (outcome, overridden_by) = vote::resolve(tally, doc.vote_override.as_ref());

    let mut patch = SessionPatch {
        hint_request: Some(None),
        hint_result: Some(Some(HintResult {
            outcome,
            team: request.team.clone(),
            accept: tally.accept,
            reject: tally.reject,
            overridden_by,
            timestamp: closed_at,
        })),
        ..SessionPatch::default()
    };
    if overridden_by.is_some() {
        patch.vote_override = Some(None);
    }

    let to = match outcome {
        VoteOutcome::Pass => {
            // Captured at the close of the window so every resolver writes the same value.
            let remaining = vote::hint_clock_remaining(
                doc.hint_timer_start,
                None,
                timings.hint_clock_ms,
                closed_at,
            )
            .unwrap_or(timings.hint_clock_ms);
            patch.hint_timer_paused = Some(Some(remaining));
            HintPhase::Paused
        }
        VoteOutcome::Fail => HintPhase::Idle,
    };

    Plan::new(from, SessionPhase::Hint(to), patch).clearing_votes()
}
