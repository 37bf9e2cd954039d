//! Deadline writes and the watcher that keeps them armed.
//!
//! Any observer may perform a deadline write once its instant has passed. Each
//! write is guarded by the identity of what it resolves (round id, request
//! timestamp, offer id), so a second or late firing finds nothing to do.

use std::time::Duration;

use futures::future::select_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::GameTimings,
    error::ServiceError,
    game::{
        clock::Millis,
        vote::{self, HintPhase, Tally},
        wager::{self, WagerOutcome},
    },
    services::{sse_events, team_service},
    state::{
        DeadlineKey, SharedState,
        state_machine::{Mode, RoundPhase, SessionEvent, SessionPhase},
        transitions::run_transition,
    },
    store::{
        StoreKey,
        models::{DjResult, SessionDoc, SessionPatch},
    },
};

/// Deadlines implied by `doc`, with the instant each one falls due.
pub fn pending_deadlines(doc: &SessionDoc, timings: &GameTimings) -> Vec<(DeadlineKey, Millis)> {
    let mut pending = Vec::new();

    if let Some(round) = doc
        .boon_round
        .as_ref()
        .filter(|round| doc.mode == Mode::Lightning && round.phase == RoundPhase::Spinning)
    {
        pending.push((
            DeadlineKey::Reveal(round.round_id),
            round.started_at + timings.spin_delay_ms,
        ));
    }

    if let Some(request) = doc
        .hint_request
        .as_ref()
        .filter(|_| SessionPhase::of(doc) == SessionPhase::Hint(HintPhase::VoteActive))
    {
        pending.push((
            DeadlineKey::HintVote(request.timestamp),
            vote::vote_deadline(request, timings.vote_window_ms),
        ));
    }

    if let Some(offer) = &doc.dj_offer {
        pending.push((DeadlineKey::WagerExpiry(offer.id), offer.expires_at));
    }

    pending
}

/// Perform every deadline write that is due, returning the ones that landed.
pub async fn reconcile(state: &SharedState) -> Result<Vec<DeadlineKey>, ServiceError> {
    let doc = state.store().session().await?;
    let now = state.now();

    let mut fired = Vec::new();
    for (key, due) in pending_deadlines(&doc, state.timings()) {
        if now < due {
            continue;
        }
        if fire(state, key).await? {
            fired.push(key);
        }
    }
    Ok(fired)
}

async fn fire(state: &SharedState, key: DeadlineKey) -> Result<bool, ServiceError> {
    match key {
        DeadlineKey::Reveal(round_id) => {
            let transition = run_transition(state, SessionEvent::Reveal { round_id }).await?;
            Ok(transition.is_applied())
        }
        DeadlineKey::HintVote(request_timestamp) => {
            let votes = state.store().votes().await?;
            let tally = Tally::count(&votes);
            let transition = run_transition(
                state,
                SessionEvent::ResolveHint {
                    request_timestamp,
                    tally,
                },
            )
            .await?;
            Ok(transition.is_applied())
        }
        DeadlineKey::WagerExpiry(offer_id) => expire_offer(state, offer_id).await,
    }
}

async fn expire_offer(state: &SharedState, offer_id: Uuid) -> Result<bool, ServiceError> {
    let doc = state.store().session().await?;
    let Some(offer) = doc.dj_offer.filter(|offer| offer.id == offer_id) else {
        return Ok(false);
    };
    if !wager::is_expired(&offer, state.now()) {
        return Ok(false);
    }

    let patch = SessionPatch {
        dj_offer: Some(None),
        dj_result: Some(Some(DjResult {
            outcome: WagerOutcome::Rejected,
            team: offer.team.clone(),
            timestamp: offer.expires_at,
        })),
        ..SessionPatch::default()
    };
    if !team_service::settle_offer(state, doc.version, offer_id, patch).await? {
        return Ok(false);
    }
    info!(team = %offer.team, %offer_id, "double jeopardy offer expired");
    Ok(true)
}

/// Align the scheduler with the deadlines `doc` implies.
///
/// Stale tasks are cancelled and missing ones armed; a deadline already in the
/// past fires immediately.
pub fn arm_deadlines(state: &SharedState, doc: &SessionDoc) {
    let pending = pending_deadlines(doc, state.timings());
    let scheduler = state.deadlines();
    scheduler.retain(|key| pending.iter().any(|(wanted, _)| wanted == key));

    let now = state.now();
    for (key, due) in pending {
        let delay = Duration::from_millis(u64::try_from(due - now).unwrap_or_default());
        let task_state = state.clone();
        scheduler.schedule(key, delay, async move {
            // Detached: cancelling the timer must never cut a write short.
            tokio::spawn(async move {
                match reconcile(&task_state).await {
                    Ok(fired) if !fired.is_empty() => debug!(?fired, "deadlines fired"),
                    Ok(_) => {}
                    Err(err) => warn!(?key, error = %err, "deadline write failed"),
                }
            });
        });
    }
}

/// Follow the store: re-arm deadlines and publish the derived session after
/// every change.
///
/// Runs until the store drops its revision channels.
pub async fn run_session_watcher(state: SharedState) {
    let mut revisions: Vec<_> = StoreKey::ALL
        .iter()
        .map(|key| state.store().subscribe(*key))
        .collect();

    loop {
        match state.snapshot().await {
            Ok(snapshot) => {
                arm_deadlines(&state, &snapshot.doc);
                sse_events::broadcast_session(&state, &snapshot);
            }
            Err(err) => warn!(error = %err, "failed to read the session"),
        }

        let changes = revisions.iter_mut().map(|rx| Box::pin(rx.changed()));
        let (changed, _, _) = select_all(changes).await;
        if changed.is_err() {
            info!("session store closed, watcher stopping");
            break;
        }
    }
}
