use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    game::vote::HintPhase,
    state::state_machine::{FocusPhase, RoundPhase, SessionPhase},
};

/// Publicly visible session phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// Waiting room.
    Lobby,
    /// Lightning mode between rounds.
    LightningIdle,
    /// Prize wheel spinning.
    Spinning,
    /// Prize revealed, buzzers closed.
    Reveal,
    /// Buzzers open.
    Buzzing,
    /// Contenders answering in turn.
    Gauntlet,
    /// Hint mode, no vote running.
    HintIdle,
    /// Hint vote open.
    HintVote,
    /// Hint granted, clock paused.
    HintPaused,
    /// Hyper Focus ready check.
    FocusReadyCheck,
    /// Hyper Focus clock running.
    FocusCountdown,
}

impl From<&SessionPhase> for VisiblePhase {
    fn from(value: &SessionPhase) -> Self {
        match value {
            SessionPhase::Lobby => VisiblePhase::Lobby,
            SessionPhase::Lightning(None) => VisiblePhase::LightningIdle,
            SessionPhase::Lightning(Some(RoundPhase::Spinning)) => VisiblePhase::Spinning,
            SessionPhase::Lightning(Some(RoundPhase::Reveal)) => VisiblePhase::Reveal,
            SessionPhase::Lightning(Some(RoundPhase::Buzzing)) => VisiblePhase::Buzzing,
            SessionPhase::Lightning(Some(RoundPhase::Gauntlet)) => VisiblePhase::Gauntlet,
            SessionPhase::Hint(HintPhase::Idle) => VisiblePhase::HintIdle,
            SessionPhase::Hint(HintPhase::VoteActive) => VisiblePhase::HintVote,
            SessionPhase::Hint(HintPhase::Paused) => VisiblePhase::HintPaused,
            SessionPhase::HyperFocus(FocusPhase::ReadyCheck) => VisiblePhase::FocusReadyCheck,
            SessionPhase::HyperFocus(FocusPhase::Countdown) => VisiblePhase::FocusCountdown,
        }
    }
}
