use tracing::{debug, info};

use crate::{
    error::ServiceError,
    state::{
        SharedState,
        state_machine::{InvalidTransition, SessionEvent, SessionPhase, plan},
    },
    store::{ConditionalWrite, models::SessionDoc},
};

/// Result of pushing an event through the session state machine.
#[derive(Debug)]
pub enum Transition {
    /// The plan was written to the store.
    Applied {
        /// Phase before the write.
        from: SessionPhase,
        /// Phase after the write.
        to: SessionPhase,
        /// Document as committed.
        doc: SessionDoc,
    },
    /// The event did not apply to the current phase; nothing was written.
    Ignored(InvalidTransition),
    /// Another write landed between the read and the write; nothing was written.
    Superseded {
        /// Version the plan was built against.
        expected: u64,
        /// Version found in the store.
        actual: u64,
    },
}

impl Transition {
    /// Whether the plan reached the store.
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied { .. })
    }
}

/// Plan `event` against the current document and write the result.
///
/// An event that does not fit the current phase is logged and ignored.
pub async fn run_transition(
    state: &SharedState,
    event: SessionEvent,
) -> Result<Transition, ServiceError> {
    let current = state.store().session().await?;
    run_transition_from(state, &current, event).await
}

/// Plan `event` against `current` and write it only if the stored document is
/// still at `current.version`.
///
/// Callers that decided on the event from an earlier read pass that read here,
/// so a decision taken on a stale document never lands.
pub async fn run_transition_from(
    state: &SharedState,
    current: &SessionDoc,
    event: SessionEvent,
) -> Result<Transition, ServiceError> {
    let store = state.store();

    let plan = match plan(current, event, state.now(), state.timings()) {
        Ok(plan) => plan,
        Err(invalid) => {
            debug!(error = %invalid, "session event ignored");
            return Ok(Transition::Ignored(invalid));
        }
    };

    let doc = match store.merge_session_if(current.version, plan.patch).await? {
        ConditionalWrite::Committed(doc) => doc,
        ConditionalWrite::VersionMismatch { expected, actual } => {
            debug!(from = ?plan.from, to = ?plan.to, expected, actual, "session transition superseded");
            return Ok(Transition::Superseded { expected, actual });
        }
    };
    if plan.clear_buzzes {
        store.clear_buzzes().await?;
    }
    if plan.clear_votes {
        store.clear_votes().await?;
    }

    info!(from = ?plan.from, to = ?plan.to, version = doc.version, "session transition applied");
    Ok(Transition::Applied {
        from: plan.from,
        to: plan.to,
        doc,
    })
}
