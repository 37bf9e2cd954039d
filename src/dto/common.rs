use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::GameTimings,
    dto::phase::VisiblePhase,
    game::{clock::Millis, view::SessionView},
    state::{state_machine::SessionPhase, transitions::Transition},
    store::Snapshot,
};

/// Outcome of a gameplay action.
///
/// Actions that do not fit the current phase are not errors: they come back
/// with `applied = false` and leave the session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Whether the action changed the session.
    pub applied: bool,
    /// Confirmation or the reason it was ignored.
    pub message: String,
}

impl ActionResponse {
    /// Action that landed.
    pub fn applied(message: impl Into<String>) -> Self {
        Self {
            applied: true,
            message: message.into(),
        }
    }

    /// Action rejected by the rules.
    pub fn ignored(message: impl Into<String>) -> Self {
        Self {
            applied: false,
            message: message.into(),
        }
    }

    /// Report a state machine transition, using `message` when it applied.
    pub fn from_transition(transition: &Transition, message: impl Into<String>) -> Self {
        match transition {
            Transition::Applied { .. } => Self::applied(message),
            Transition::Ignored(invalid) => Self::ignored(invalid.to_string()),
            Transition::Superseded { .. } => {
                Self::ignored("the session changed before this action landed")
            }
        }
    }
}

/// Derived session state with its coarse phase, served over REST and SSE.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    /// Coarse phase for clients that only switch screens.
    pub phase: VisiblePhase,
    /// Full derived view.
    pub view: SessionView,
}

impl SessionSnapshot {
    /// Pair a view with the phase it was derived in.
    pub fn new(phase: &SessionPhase, view: SessionView) -> Self {
        Self {
            phase: phase.into(),
            view,
        }
    }

    /// Derive the snapshot every client would compute from the same store read.
    pub fn derive(snapshot: &Snapshot, now: Millis, timings: &GameTimings) -> Self {
        let phase = SessionPhase::of(&snapshot.doc);
        Self::new(&phase, SessionView::derive(snapshot, now, timings))
    }
}
