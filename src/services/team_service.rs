//! Actions performed by team devices.
//!
//! Every action reads the store, checks its rule against what it read and
//! writes at most once per key. Rule violations come back as an unapplied
//! [`ActionResponse`]; only unknown teams and storage failures are errors.

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::{
        common::ActionResponse,
        team::{JoinRequest, JoinResponse, UseBoonRequest},
    },
    error::ServiceError,
    game::{
        boon::BoonId,
        effects::{self, BoonContext, EffectDelta},
        inventory,
        race::{BuzzEligibility, Race},
        vote::{self, Ballot, VoteChoice},
        wager::{self, WagerOutcome},
    },
    state::{
        SharedState,
        state_machine::{RoundPhase, SessionEvent, SessionPhase},
        transitions::run_transition,
    },
    store::{
        ConditionalWrite,
        models::{
            ActiveBoonUsage, BuzzEntity, DjResult, SessionPatch, TeamEntity, TeamKey, VoteEntity,
        },
    },
};

/// Look up a joined team by any spelling of its name.
pub(crate) async fn require_team(
    state: &SharedState,
    name: &str,
) -> Result<TeamEntity, ServiceError> {
    let key = TeamKey::normalize(name);
    state
        .store()
        .team(key.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("team '{key}' has not joined")))
}

/// Register a team, or return the existing document when it already joined.
pub async fn join(state: &SharedState, request: JoinRequest) -> Result<JoinResponse, ServiceError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("team name must not be blank".into()));
    }

    let team = state.store().ensure_team(name.to_owned()).await?;
    let key = team.key();
    info!(team = %key, "team joined");
    Ok(JoinResponse {
        key,
        name: team.name,
        inventory: team.inventory,
    })
}

/// Press the buzzer at the server's current instant.
pub async fn submit_buzz(state: &SharedState, name: &str) -> Result<ActionResponse, ServiceError> {
    let team = require_team(state, name).await?;
    let key = team.key();
    let store = state.store();
    let timings = state.timings();

    let (doc, buzzes) = futures::try_join!(store.session(), store.buzzes())?;
    let now = state.now();
    let buzzing = SessionPhase::of(&doc) == SessionPhase::Lightning(Some(RoundPhase::Buzzing));
    let race = Race::resolve(&buzzes, timings.race_window_ms);
    let eligibility = BuzzEligibility::evaluate(
        buzzing,
        &race,
        &doc.silenced,
        &key,
        now,
        timings.silence_ms,
    );
    if eligibility != BuzzEligibility::Open {
        debug!(team = %key, %eligibility, "buzz ignored");
        return Ok(ActionResponse::ignored(eligibility.to_string()));
    }

    let stored = store
        .append_buzz(BuzzEntity {
            team_name: team.name,
            timestamp: now,
        })
        .await?;
    if !stored {
        debug!(team = %key, "duplicate buzz ignored");
        return Ok(ActionResponse::ignored("already buzzed this round"));
    }

    info!(team = %key, timestamp = now, "buzz recorded");
    Ok(ActionResponse::applied("buzz recorded"))
}

/// Ask for a hint, opening a vote among the other teams.
pub async fn request_hint(state: &SharedState, name: &str) -> Result<ActionResponse, ServiceError> {
    let team = require_team(state, name).await?;
    let transition = run_transition(state, SessionEvent::RequestHint { team: team.name }).await?;
    Ok(ActionResponse::from_transition(
        &transition,
        "hint requested, vote is open",
    ))
}

/// Cast a ballot in the running hint vote, or signal readiness in Hyper Focus.
pub async fn cast_vote(
    state: &SharedState,
    name: &str,
    choice: VoteChoice,
) -> Result<ActionResponse, ServiceError> {
    let team = require_team(state, name).await?;
    let key = team.key();
    let store = state.store();

    let (doc, votes) = futures::try_join!(store.session(), store.votes())?;
    let ballot = Ballot {
        mode: doc.mode,
        request: doc.hint_request.as_ref(),
        votes: &votes,
        voter: &key,
        choice,
        now: state.now(),
        window_ms: state.timings().vote_window_ms,
    };
    if let Err(rejection) = vote::admit(&ballot) {
        debug!(team = %key, %rejection, "vote ignored");
        return Ok(ActionResponse::ignored(rejection.to_string()));
    }

    let stored = store
        .append_vote(VoteEntity {
            team_name: team.name,
            vote: choice,
        })
        .await?;
    if !stored {
        return Ok(ActionResponse::ignored("already voted"));
    }

    info!(team = %key, vote = ?choice, "vote recorded");
    Ok(ActionResponse::applied("vote recorded"))
}

/// Play a boon from the team's inventory.
///
/// The boon leaves the inventory before its effect is written. An effect that
/// finds nothing to act on still spends the boon; a boon played in a phase
/// where it is not allowed is refused and kept.
pub async fn use_boon(
    state: &SharedState,
    name: &str,
    request: UseBoonRequest,
) -> Result<ActionResponse, ServiceError> {
    let team = require_team(state, name).await?;
    let key = team.key();
    let boon = request.boon;

    if !boon.boon().self_activatable {
        debug!(team = %key, boon = ?boon, "boon is not self-activatable");
        return Ok(ActionResponse::ignored(format!(
            "{boon} cannot be played by a team"
        )));
    }
    if !inventory::holds(&team.inventory, boon) {
        return Ok(ActionResponse::ignored(format!("{boon} is not in the inventory")));
    }

    let store = state.store();
    let target = match request.target.as_deref() {
        Some(target) => store.team(TeamKey::normalize(target)).await?,
        None => None,
    };
    let (doc, buzzes) = futures::try_join!(store.session(), store.buzzes())?;

    let round = match SessionPhase::of(&doc) {
        SessionPhase::Lightning(round) => round,
        _ => None,
    };
    if !effects::allowed(boon, doc.mode, round) {
        debug!(team = %key, boon = ?boon, mode = ?doc.mode, "boon not allowed in this phase");
        return Ok(ActionResponse::ignored(format!("{boon} cannot be played right now")));
    }

    if !store.pull_inventory(key.clone(), boon).await? {
        return Ok(ActionResponse::ignored(format!("{boon} is not in the inventory")));
    }

    let now = state.now();
    let race = Race::resolve(&buzzes, state.timings().race_window_ms);
    let target_name = target.map(|team| team.name);
    let ctx = BoonContext {
        caller: &team.name,
        target: target_name.as_deref(),
        race: &race,
        now,
    };

    let mut patch = SessionPatch {
        active_boon_usage: Some(Some(ActiveBoonUsage {
            boon_id: boon,
            team_name: team.name.clone(),
            target: target_name.clone(),
            timestamp: now,
        })),
        ..SessionPatch::default()
    };

    let response = match effects::resolve_effect(boon, &ctx) {
        EffectDelta::OverrideVote(pending) => {
            let message = format!("{boon} will decide the next hint vote");
            patch.vote_override = Some(Some(pending));
            ActionResponse::applied(message)
        }
        EffectDelta::Silence(effect) => {
            let message = format!("{} is silenced", effect.target);
            patch.push_silenced.push(effect);
            ActionResponse::applied(message)
        }
        EffectDelta::Retime {
            team: retimed,
            timestamp,
        } => {
            store
                .retime_buzz(TeamKey::normalize(&retimed), timestamp)
                .await?;
            ActionResponse::applied(format!("{retimed} moved up the race"))
        }
        EffectDelta::Fizzle(fizzle) => {
            debug!(team = %key, boon = ?boon, %fizzle, "boon had no effect");
            ActionResponse::applied(format!("{boon} was used but had no effect: {fizzle}"))
        }
    };

    store.merge_session(patch).await?;
    info!(team = %key, boon = ?boon, target = ?target_name, "boon used");
    Ok(response)
}

/// Accept or decline the outstanding double-jeopardy offer.
///
/// The result only lands while the same offer is still open; an accept that
/// loses to an expiry or a second decision gets its boon back.
pub async fn decide_wager(
    state: &SharedState,
    name: &str,
    accept: bool,
) -> Result<ActionResponse, ServiceError> {
    let team = require_team(state, name).await?;
    let key = team.key();
    let store = state.store();
    let doc = store.session().await?;
    let now = state.now();

    let offer = match wager::check_decision(&key, doc.dj_offer.as_ref(), now) {
        Ok(offer) => offer.clone(),
        Err(rejection) => {
            debug!(team = %key, %rejection, "wager decision ignored");
            return Ok(ActionResponse::ignored(rejection.to_string()));
        }
    };

    let outcome = if !accept {
        WagerOutcome::Rejected
    } else if store.pull_inventory(key.clone(), BoonId::DoubleJeopardy).await? {
        WagerOutcome::Accepted
    } else {
        return Ok(ActionResponse::ignored(format!(
            "{} is not in the inventory",
            BoonId::DoubleJeopardy
        )));
    };

    let patch = SessionPatch {
        dj_offer: Some(None),
        dj_result: Some(Some(DjResult {
            outcome,
            team: offer.team.clone(),
            timestamp: now,
        })),
        ..SessionPatch::default()
    };
    if !settle_offer(state, doc.version, offer.id, patch).await? {
        if outcome == WagerOutcome::Accepted {
            store.push_inventory(key.clone(), BoonId::DoubleJeopardy).await?;
        }
        debug!(team = %key, offer_id = %offer.id, "wager decision lost to another write");
        return Ok(ActionResponse::ignored("the offer is no longer open"));
    }

    info!(team = %key, outcome = ?outcome, "wager settled");
    Ok(ActionResponse::applied(match outcome {
        WagerOutcome::Accepted => "wager accepted",
        WagerOutcome::Rejected => "wager declined",
    }))
}

/// Write `patch` while the offer `offer_id` is still the open one.
///
/// Unrelated writes that move the version in between are retried against the
/// fresh document. Returns whether the patch landed.
pub(crate) async fn settle_offer(
    state: &SharedState,
    mut expected: u64,
    offer_id: Uuid,
    patch: SessionPatch,
) -> Result<bool, ServiceError> {
    let store = state.store();
    loop {
        match store.merge_session_if(expected, patch.clone()).await? {
            ConditionalWrite::Committed(_) => return Ok(true),
            ConditionalWrite::VersionMismatch { .. } => {
                let current = store.session().await?;
                if current.dj_offer.as_ref().map(|offer| offer.id) != Some(offer_id) {
                    return Ok(false);
                }
                expected = current.version;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        game::{boon::BoonId, race::Race, vote::VoteOutcome},
        services::{deadline_service, host_service, test_support::Harness},
        state::state_machine::Mode,
        store::SessionStore,
    };

    async fn join_all(harness: &Harness, names: &[&str]) {
        for name in names {
            join(
                &harness.state,
                JoinRequest {
                    name: (*name).into(),
                },
            )
            .await
            .unwrap();
        }
    }

    /// Start a round and walk it to BUZZING.
    async fn open_buzzers(harness: &Harness) {
        assert!(host_service::start_round(&harness.state).await.unwrap().applied);
        harness
            .clock
            .advance(harness.state.timings().spin_delay_ms);
        deadline_service::reconcile(&harness.state).await.unwrap();
        assert!(host_service::open_buzzing(&harness.state).await.unwrap().applied);
    }

    async fn buzz_at(harness: &Harness, name: &str, at: i64) -> ActionResponse {
        harness.clock.set(at);
        submit_buzz(&harness.state, name).await.unwrap()
    }

    async fn race(harness: &Harness) -> Vec<String> {
        let buzzes = harness.store.buzzes().await.unwrap();
        Race::resolve(&buzzes, harness.state.timings().race_window_ms)
            .standings()
            .iter()
            .map(|standing| standing.team.clone())
            .collect()
    }

    #[tokio::test]
    async fn joining_normalizes_and_is_idempotent() {
        let harness = Harness::new(0);
        let first = join(
            &harness.state,
            JoinRequest {
                name: "  Owls ".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(first.name, "Owls");
        assert_eq!(first.key.as_str(), "owls");

        join(&harness.state, JoinRequest { name: "OWLS".into() })
            .await
            .unwrap();
        assert_eq!(harness.store.teams().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_teams_are_not_found() {
        let harness = Harness::new(0);
        let err = submit_buzz(&harness.state, "ghosts").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn buzzes_outside_buzzing_are_ignored() {
        let harness = Harness::new(0);
        join_all(&harness, &["a"]).await;
        let response = submit_buzz(&harness.state, "a").await.unwrap();
        assert!(!response.applied);
        assert!(harness.store.buzzes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn race_window_locks_out_late_teams() {
        let harness = Harness::new(0);
        join_all(&harness, &["a", "b", "c", "d", "e"]).await;
        open_buzzers(&harness).await;

        assert!(buzz_at(&harness, "a", 10_100).await.applied);
        assert!(buzz_at(&harness, "b", 10_200).await.applied);
        assert!(!buzz_at(&harness, "a", 10_300).await.applied);
        assert!(buzz_at(&harness, "c", 10_400).await.applied);
        assert!(buzz_at(&harness, "d", 10_900).await.applied);
        // window closes 3500 ms after the first buzz
        assert!(!buzz_at(&harness, "e", 13_601).await.applied);

        let buzzes = harness.store.buzzes().await.unwrap();
        let resolved = Race::resolve(&buzzes, harness.state.timings().race_window_ms);
        let contenders: Vec<_> = resolved.contenders().iter().map(|s| s.team.as_str()).collect();
        let too_slow: Vec<_> = resolved.too_slow().iter().map(|s| s.team.as_str()).collect();
        assert_eq!(contenders, ["a", "b", "c"]);
        assert_eq!(too_slow, ["d"]);
    }

    #[tokio::test]
    async fn silencer_holds_the_target_buzzer_down() {
        let harness = Harness::new(0);
        join_all(&harness, &["a", "b"]).await;
        harness.store.push_inventory(TeamKey::normalize("a"), BoonId::Silencer).await.unwrap();
        open_buzzers(&harness).await;

        harness.clock.set(20_000);
        let used = use_boon(
            &harness.state,
            "a",
            UseBoonRequest {
                boon: BoonId::Silencer,
                target: Some("B".into()),
            },
        )
        .await
        .unwrap();
        assert!(used.applied);

        assert!(!buzz_at(&harness, "b", 21_000).await.applied);
        assert!(buzz_at(&harness, "b", 21_500).await.applied);

        let doc = harness.store.session().await.unwrap();
        let usage = doc.active_boon_usage.unwrap();
        assert_eq!(usage.boon_id, BoonId::Silencer);
        assert_eq!(usage.target.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn priority_jumps_to_the_front() {
        let harness = Harness::new(0);
        join_all(&harness, &["a", "b", "c"]).await;
        harness.store.push_inventory(TeamKey::normalize("b"), BoonId::Priority).await.unwrap();
        open_buzzers(&harness).await;

        buzz_at(&harness, "a", 10_100).await;
        buzz_at(&harness, "b", 10_200).await;
        buzz_at(&harness, "c", 10_400).await;

        let used = use_boon(
            &harness.state,
            "b",
            UseBoonRequest {
                boon: BoonId::Priority,
                target: None,
            },
        )
        .await
        .unwrap();
        assert!(used.applied);
        assert_eq!(race(&harness).await, ["b", "a", "c"]);

        let buzzes = harness.store.buzzes().await.unwrap();
        let b = buzzes.iter().find(|buzz| buzz.team_name == "b").unwrap();
        assert!(b.timestamp < 10_100);
        assert!(harness.store.team(TeamKey::normalize("b")).await.unwrap().unwrap().inventory.is_empty());
    }

    #[tokio::test]
    async fn slingshot_without_a_third_buzz_is_spent_for_nothing() {
        let harness = Harness::new(0);
        join_all(&harness, &["a", "b", "c"]).await;
        harness.store.push_inventory(TeamKey::normalize("c"), BoonId::Slingshot).await.unwrap();
        open_buzzers(&harness).await;

        buzz_at(&harness, "a", 10_100).await;
        buzz_at(&harness, "c", 10_400).await;

        let used = use_boon(
            &harness.state,
            "c",
            UseBoonRequest {
                boon: BoonId::Slingshot,
                target: None,
            },
        )
        .await
        .unwrap();
        assert!(used.applied);
        assert!(used.message.contains("no effect"));
        assert_eq!(race(&harness).await, ["a", "c"]);
        assert!(harness.store.team(TeamKey::normalize("c")).await.unwrap().unwrap().inventory.is_empty());
    }

    #[tokio::test]
    async fn slingshot_lifts_a_too_slow_team_into_third() {
        let harness = Harness::new(0);
        join_all(&harness, &["a", "b", "c", "d"]).await;
        harness.store.push_inventory(TeamKey::normalize("d"), BoonId::Slingshot).await.unwrap();
        open_buzzers(&harness).await;

        buzz_at(&harness, "a", 10_100).await;
        buzz_at(&harness, "b", 10_200).await;
        buzz_at(&harness, "c", 10_400).await;
        buzz_at(&harness, "d", 10_900).await;

        use_boon(
            &harness.state,
            "d",
            UseBoonRequest {
                boon: BoonId::Slingshot,
                target: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(race(&harness).await, ["a", "b", "d", "c"]);
    }

    #[tokio::test]
    async fn boons_played_in_the_wrong_phase_are_kept() {
        let harness = Harness::new(0);
        join_all(&harness, &["a"]).await;
        harness.store.push_inventory(TeamKey::normalize("a"), BoonId::Priority).await.unwrap();

        let used = use_boon(
            &harness.state,
            "a",
            UseBoonRequest {
                boon: BoonId::Priority,
                target: None,
            },
        )
        .await
        .unwrap();
        assert!(!used.applied);
        let team = harness.store.team(TeamKey::normalize("a")).await.unwrap().unwrap();
        assert_eq!(team.inventory, vec![BoonId::Priority]);
    }

    #[tokio::test]
    async fn silencer_is_kept_while_the_prize_spins() {
        let harness = Harness::new(0);
        join_all(&harness, &["a", "b"]).await;
        harness.store.push_inventory(TeamKey::normalize("a"), BoonId::Silencer).await.unwrap();
        assert!(host_service::start_round(&harness.state).await.unwrap().applied);

        let used = use_boon(
            &harness.state,
            "a",
            UseBoonRequest {
                boon: BoonId::Silencer,
                target: Some("b".into()),
            },
        )
        .await
        .unwrap();
        assert!(!used.applied);
        let team = harness.store.team(TeamKey::normalize("a")).await.unwrap().unwrap();
        assert_eq!(team.inventory, vec![BoonId::Silencer]);
        assert!(harness.store.session().await.unwrap().silenced.is_empty());
    }

    #[tokio::test]
    async fn double_jeopardy_cannot_be_self_activated() {
        let harness = Harness::new(0);
        join_all(&harness, &["a"]).await;
        harness
            .store
            .push_inventory(TeamKey::normalize("a"), BoonId::DoubleJeopardy)
            .await
            .unwrap();

        let used = use_boon(
            &harness.state,
            "a",
            UseBoonRequest {
                boon: BoonId::DoubleJeopardy,
                target: None,
            },
        )
        .await
        .unwrap();
        assert!(!used.applied);
    }

    #[tokio::test]
    async fn hint_votes_exclude_the_requester_and_repeat_voters() {
        let harness = Harness::new(0);
        join_all(&harness, &["a", "b", "c"]).await;
        host_service::set_mode(&harness.state, Mode::Hint).await.unwrap();

        assert!(!cast_vote(&harness.state, "b", VoteChoice::Accept).await.unwrap().applied);
        assert!(request_hint(&harness.state, "a").await.unwrap().applied);
        assert!(!request_hint(&harness.state, "b").await.unwrap().applied);

        assert!(!cast_vote(&harness.state, "a", VoteChoice::Accept).await.unwrap().applied);
        assert!(cast_vote(&harness.state, "b", VoteChoice::Accept).await.unwrap().applied);
        assert!(!cast_vote(&harness.state, "b", VoteChoice::Reject).await.unwrap().applied);
        assert!(!cast_vote(&harness.state, "c", VoteChoice::Done).await.unwrap().applied);

        harness.clock.advance(harness.state.timings().vote_window_ms);
        assert!(!cast_vote(&harness.state, "c", VoteChoice::Reject).await.unwrap().applied);
        assert_eq!(harness.store.votes().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn exec_order_forces_the_next_vote_through() {
        let harness = Harness::new(0);
        join_all(&harness, &["a", "b", "c"]).await;
        harness.store.push_inventory(TeamKey::normalize("c"), BoonId::ExecOrder).await.unwrap();
        host_service::set_mode(&harness.state, Mode::Hint).await.unwrap();

        use_boon(
            &harness.state,
            "c",
            UseBoonRequest {
                boon: BoonId::ExecOrder,
                target: None,
            },
        )
        .await
        .unwrap();
        request_hint(&harness.state, "a").await.unwrap();
        cast_vote(&harness.state, "b", VoteChoice::Reject).await.unwrap();

        harness.clock.advance(harness.state.timings().vote_window_ms);
        deadline_service::reconcile(&harness.state).await.unwrap();

        let doc = harness.store.session().await.unwrap();
        let result = doc.hint_result.unwrap();
        assert_eq!(result.outcome, VoteOutcome::Pass);
        assert_eq!(result.overridden_by, Some(BoonId::ExecOrder));
        assert!(doc.vote_override.is_none());
        assert!(doc.hint_timer_paused.is_some());
    }

    #[tokio::test]
    async fn focus_ready_check_only_takes_done() {
        let harness = Harness::new(0);
        join_all(&harness, &["a"]).await;
        host_service::set_mode(&harness.state, Mode::HyperFocus).await.unwrap();

        assert!(!cast_vote(&harness.state, "a", VoteChoice::Accept).await.unwrap().applied);
        assert!(cast_vote(&harness.state, "a", VoteChoice::Done).await.unwrap().applied);
    }

    #[tokio::test]
    async fn wager_decisions_need_an_offer_for_that_team() {
        let harness = Harness::new(0);
        join_all(&harness, &["a", "b"]).await;

        let response = decide_wager(&harness.state, "a", true).await.unwrap();
        assert!(!response.applied);
    }

    async fn offer_to(harness: &Harness, name: &str, copies: usize) -> Uuid {
        join_all(harness, &[name]).await;
        for _ in 0..copies {
            harness
                .store
                .push_inventory(TeamKey::normalize(name), BoonId::DoubleJeopardy)
                .await
                .unwrap();
        }
        let offer = wager::new_offer(name, 0, harness.state.timings().wager_window_ms);
        let offer_id = offer.id;
        harness
            .store
            .merge_session(SessionPatch {
                dj_offer: Some(Some(offer)),
                ..SessionPatch::default()
            })
            .await
            .unwrap();
        offer_id
    }

    #[tokio::test]
    async fn simultaneous_accepts_spend_a_single_boon() {
        let harness = Harness::with_latency(0, Duration::from_millis(1), Duration::from_millis(3));
        offer_to(&harness, "a", 2).await;

        let (first, second) = tokio::join!(
            decide_wager(&harness.state, "a", true),
            decide_wager(&harness.state, "a", true)
        );
        let applied = [first.unwrap().applied, second.unwrap().applied];
        assert_eq!(applied.iter().filter(|applied| **applied).count(), 1);

        let team = harness.store.team(TeamKey::normalize("a")).await.unwrap().unwrap();
        assert_eq!(team.inventory, vec![BoonId::DoubleJeopardy]);
        let doc = harness.store.session().await.unwrap();
        assert_eq!(doc.dj_result.unwrap().outcome, WagerOutcome::Accepted);
    }

    #[tokio::test]
    async fn settling_retries_past_unrelated_writes_but_not_a_closed_offer() {
        let harness = Harness::new(0);
        let offer_id = offer_to(&harness, "a", 0).await;
        let read = harness.store.session().await.unwrap();
        let close = || SessionPatch {
            dj_offer: Some(None),
            ..SessionPatch::default()
        };

        harness
            .store
            .merge_session(SessionPatch {
                active_boon_usage: Some(None),
                ..SessionPatch::default()
            })
            .await
            .unwrap();
        assert!(settle_offer(&harness.state, read.version, offer_id, close()).await.unwrap());
        assert!(!settle_offer(&harness.state, read.version, offer_id, close()).await.unwrap());
    }
}
