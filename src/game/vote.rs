//! Vote tally and the timed hint vote protocol.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    game::{boon::BoonId, clock::Millis},
    state::state_machine::Mode,
    store::models::{HintRequest, TeamKey, VoteEntity, VoteOverride},
};

/// Ballot cast by a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    /// Grant the requester a hint.
    Accept,
    /// Refuse the hint.
    Reject,
    /// Ready signal during Hyper Focus.
    Done,
}

/// Resolution of a hint vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteOutcome {
    /// Hint granted.
    Pass,
    /// Hint refused.
    Fail,
}

/// Counted ballots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Tally {
    /// `ACCEPT` ballots.
    pub accept: u32,
    /// `REJECT` ballots.
    pub reject: u32,
    /// Hyper Focus readiness signals.
    pub done: u32,
}

impl Tally {
    /// Count every ballot in the tally.
    pub fn count(votes: &[VoteEntity]) -> Self {
        votes.iter().fold(Self::default(), |mut tally, entry| {
            match entry.vote {
                VoteChoice::Accept => tally.accept += 1,
                VoteChoice::Reject => tally.reject += 1,
                VoteChoice::Done => tally.done += 1,
            }
            tally
        })
    }

    /// Majority rule: no ballots passes, ties fail.
    pub fn outcome(&self) -> VoteOutcome {
        if self.accept + self.reject == 0 || self.accept > self.reject {
            VoteOutcome::Pass
        } else {
            VoteOutcome::Fail
        }
    }
}

/// Final outcome of a hint vote and the boon that forced it, if any.
pub fn resolve(tally: &Tally, pending: Option<&VoteOverride>) -> (VoteOutcome, Option<BoonId>) {
    match pending {
        Some(forced) => (forced.outcome, Some(forced.boon_id)),
        None => (tally.outcome(), None),
    }
}

/// Hint sub-state, derived from the session document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HintPhase {
    /// No request outstanding.
    Idle,
    /// Teams are voting on a request.
    VoteActive,
    /// A passed vote froze the hint clock.
    Paused,
}

impl HintPhase {
    /// Paused wins over an outstanding request.
    pub fn derive(request: Option<&HintRequest>, paused: Option<Millis>) -> Self {
        if paused.is_some() {
            HintPhase::Paused
        } else if request.is_some() {
            HintPhase::VoteActive
        } else {
            HintPhase::Idle
        }
    }
}

/// Instant the vote window of `request` closes.
pub fn vote_deadline(request: &HintRequest, window_ms: Millis) -> Millis {
    request.timestamp + window_ms
}

/// Hint countdown remaining at `now`, honouring a captured pause value.
pub fn hint_clock_remaining(
    start: Option<Millis>,
    paused: Option<Millis>,
    clock_ms: Millis,
    now: Millis,
) -> Option<Millis> {
    match (paused, start) {
        (Some(remaining), _) => Some(remaining),
        (None, Some(start)) => Some(crate::game::clock::remaining(start, clock_ms, now)),
        (None, None) => None,
    }
}

/// Fresh epoch that makes a resumed clock show `remaining`.
pub fn resumed_epoch(now: Millis, clock_ms: Millis, remaining: Millis) -> Millis {
    now - (clock_ms - remaining)
}

/// Reason a ballot was not recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteRejection {
    /// Nothing to vote on in this phase.
    #[error("no vote is open")]
    NoVoteOpen,
    /// The vote deadline passed.
    #[error("the vote window has closed")]
    WindowClosed,
    /// Requesters sit their own vote out.
    #[error("the requesting team cannot vote on its own hint")]
    Requester,
    /// One ballot per team.
    #[error("team has already voted")]
    AlreadyVoted,
    /// Ballot kind does not match the mode.
    #[error("{choice:?} is not a valid ballot right now")]
    WrongChoice {
        /// The ballot that was sent.
        choice: VoteChoice,
    },
}

/// Inputs needed to admit a ballot.
pub struct Ballot<'a> {
    /// Session mode.
    pub mode: Mode,
    /// Outstanding hint request.
    pub request: Option<&'a HintRequest>,
    /// Ballots already in the tally.
    pub votes: &'a [VoteEntity],
    /// Team casting the ballot.
    pub voter: &'a TeamKey,
    /// Ballot being cast.
    pub choice: VoteChoice,
    /// Submission instant.
    pub now: Millis,
    /// Length of the vote window.
    pub window_ms: Millis,
}

/// Decide whether a ballot may be appended to the tally.
pub fn admit(ballot: &Ballot<'_>) -> Result<(), VoteRejection> {
    match ballot.mode {
        Mode::Hint => {
            let Some(request) = ballot.request else {
                return Err(VoteRejection::NoVoteOpen);
            };
            if ballot.choice == VoteChoice::Done {
                return Err(VoteRejection::WrongChoice {
                    choice: ballot.choice,
                });
            }
            if ballot.now >= vote_deadline(request, ballot.window_ms) {
                return Err(VoteRejection::WindowClosed);
            }
            if ballot.voter.matches(&request.team) {
                return Err(VoteRejection::Requester);
            }
        }
        Mode::HyperFocus => {
            if ballot.choice != VoteChoice::Done {
                return Err(VoteRejection::WrongChoice {
                    choice: ballot.choice,
                });
            }
        }
        Mode::Lobby | Mode::Lightning => return Err(VoteRejection::NoVoteOpen),
    }

    if ballot.votes.iter().any(|entry| entry.key() == *ballot.voter) {
        return Err(VoteRejection::AlreadyVoted);
    }
    Ok(())
}
