//! Host actions: mode switches, round control, gauntlet verdicts and resets.

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::common::ActionResponse,
    error::ServiceError,
    game::{
        boon::{self, BoonId, Draw},
        gauntlet::{self, GauntletOutcome},
        race::Race,
        wager,
    },
    services::{deadline_service, team_service::require_team},
    state::{
        SharedState,
        state_machine::{Mode, RoundPhase, SessionEvent},
        transitions::{Transition, run_transition, run_transition_from},
    },
    store::{
        ConditionalWrite,
        models::{LastWinner, SessionDoc, SessionPatch, TeamKey},
    },
};

/// Switch the session to `mode`.
///
/// Lightning starts a round straight away; every mode other than the lobby is
/// entered from the lobby only.
pub async fn set_mode(state: &SharedState, mode: Mode) -> Result<ActionResponse, ServiceError> {
    let (event, message) = match mode {
        Mode::Lightning => return start_round(state).await,
        Mode::Lobby => (SessionEvent::EnterLobby, "back in the lobby"),
        Mode::Hint => (SessionEvent::EnterHint, "hint mode started"),
        Mode::HyperFocus => (SessionEvent::EnterHyperFocus, "hyper focus ready check"),
    };
    let transition = run_transition(state, event).await?;
    Ok(ActionResponse::from_transition(&transition, message))
}

fn draw_prize(used: &[BoonId]) -> Draw {
    boon::draw(used, &mut rand::rng())
}

/// Start a Lightning round with a fresh prize from the deck.
pub async fn start_round(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let current = state.store().session().await?;
    let draw = draw_prize(&current.used_boons);
    let round_id = Uuid::new_v4();
    let prize = draw.boon;
    let reshuffled = draw.reshuffled;

    let transition = run_transition(state, SessionEvent::StartRound { round_id, draw }).await?;
    if let Transition::Applied { doc, .. } = &transition {
        info!(%round_id, boon = ?prize, reshuffled, "lightning round started");
        deadline_service::arm_deadlines(state, doc);
    }
    Ok(ActionResponse::from_transition(
        &transition,
        "round started, the prize is spinning",
    ))
}

/// Open the buzzers once the prize is revealed.
pub async fn open_buzzing(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let transition = run_transition(state, SessionEvent::OpenBuzzing).await?;
    Ok(ActionResponse::from_transition(&transition, "buzzers are open"))
}

/// Lock the race and start the gauntlet, optionally swapping the prize.
pub async fn lock_race(
    state: &SharedState,
    prize: Option<BoonId>,
) -> Result<ActionResponse, ServiceError> {
    let buzz_count = state.store().buzzes().await?.len();
    let transition = run_transition(state, SessionEvent::LockRace { buzz_count, prize }).await?;
    if !transition.is_applied() && buzz_count == 0 {
        return Ok(ActionResponse::ignored("nobody buzzed yet"));
    }
    Ok(ActionResponse::from_transition(
        &transition,
        "race locked, gauntlet started",
    ))
}

/// Rule on the current gauntlet contender's answer.
///
/// The verdict is planned against the document it was decided on, so a
/// duplicate or late verdict never grants the prize twice.
pub async fn gauntlet_decision(
    state: &SharedState,
    correct: bool,
) -> Result<ActionResponse, ServiceError> {
    let store = state.store();
    let (doc, buzzes) = futures::try_join!(store.session(), store.buzzes())?;
    let Some(round) = doc
        .boon_round
        .clone()
        .filter(|round| doc.mode == Mode::Lightning && round.phase == RoundPhase::Gauntlet)
    else {
        debug!("gauntlet decision outside a gauntlet");
        return Ok(ActionResponse::ignored("no gauntlet is running"));
    };

    let race = Race::resolve(&buzzes, state.timings().race_window_ms);
    match gauntlet::decide(&race, round.step, round.boon_id, correct) {
        GauntletOutcome::Award { team, boon } => {
            let winner = LastWinner {
                team: team.clone(),
                boon_id: boon,
            };
            let transition = run_transition_from(
                state,
                &doc,
                SessionEvent::EndRound {
                    winner: Some(winner),
                },
            )
            .await?;
            if !transition.is_applied() {
                return Ok(ActionResponse::from_transition(&transition, ""));
            }
            store.push_inventory(TeamKey::normalize(&team), boon).await?;
            info!(team = %team, boon = ?boon, step = round.step, "gauntlet won");
            Ok(ActionResponse::applied(format!("{team} wins {boon}")))
        }
        GauntletOutcome::Advance { step } => {
            let transition =
                run_transition_from(state, &doc, SessionEvent::AdvanceGauntlet { step }).await?;
            Ok(ActionResponse::from_transition(
                &transition,
                format!("wrong answer, contender {step} is up"),
            ))
        }
        GauntletOutcome::Exhausted => {
            let transition =
                run_transition_from(state, &doc, SessionEvent::EndRound { winner: None }).await?;
            if transition.is_applied() {
                info!(round_id = %round.round_id, "gauntlet exhausted without a winner");
            }
            Ok(ActionResponse::from_transition(
                &transition,
                "no contender left, the round ends without a winner",
            ))
        }
    }
}

/// Abandon the current round without awarding anything.
pub async fn reset_round(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let transition = run_transition(state, SessionEvent::EndRound { winner: None }).await?;
    Ok(ActionResponse::from_transition(&transition, "round reset"))
}

/// Restart the hint clock paused by a passed vote.
pub async fn resume_hint(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let transition = run_transition(state, SessionEvent::ResumeHint).await?;
    Ok(ActionResponse::from_transition(&transition, "hint clock resumed"))
}

/// Cancel the outstanding hint request and wipe its ballots.
pub async fn clear_hint(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let transition = run_transition(state, SessionEvent::ClearHint).await?;
    Ok(ActionResponse::from_transition(&transition, "hint votes cleared"))
}

/// Start the Hyper Focus countdown.
pub async fn start_focus_countdown(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let transition = run_transition(state, SessionEvent::StartFocusCountdown).await?;
    Ok(ActionResponse::from_transition(&transition, "focus countdown started"))
}

/// Stop the countdown and return to the ready check.
pub async fn reset_focus(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    let transition = run_transition(state, SessionEvent::ResetFocus).await?;
    Ok(ActionResponse::from_transition(&transition, "back to the ready check"))
}

/// Offer the double-jeopardy wager to the team that just won it.
pub async fn offer_wager(state: &SharedState, name: &str) -> Result<ActionResponse, ServiceError> {
    let team = require_team(state, name).await?;
    let key = team.key();
    let store = state.store();
    let doc = store.session().await?;

    if let Err(rejection) =
        wager::can_offer(&key, doc.last_winner.as_ref(), doc.dj_offer.as_ref())
    {
        debug!(team = %key, %rejection, "wager offer ignored");
        return Ok(ActionResponse::ignored(rejection.to_string()));
    }

    let offer = wager::new_offer(&team.name, state.now(), state.timings().wager_window_ms);
    let offer_id = offer.id;
    let patch = SessionPatch {
        dj_offer: Some(Some(offer)),
        dj_result: Some(None),
        ..SessionPatch::default()
    };
    let doc = match store.merge_session_if(doc.version, patch).await? {
        ConditionalWrite::Committed(doc) => doc,
        ConditionalWrite::VersionMismatch { expected, actual } => {
            debug!(team = %key, expected, actual, "wager offer superseded");
            return Ok(ActionResponse::ignored(
                "the session changed before the offer landed",
            ));
        }
    };
    deadline_service::arm_deadlines(state, &doc);

    info!(team = %key, %offer_id, "double jeopardy offered");
    Ok(ActionResponse::applied(format!("{} has been offered the wager", team.name)))
}

/// Wipe every key and return the session to a fresh lobby.
pub async fn factory_reset(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    state.deadlines().cancel_all();
    let store = state.store();
    futures::try_join!(store.clear_buzzes(), store.clear_votes(), store.clear_teams())?;
    let doc = store.replace_session(SessionDoc::default()).await?;
    info!(version = doc.version, "session reset to defaults");
    Ok(ActionResponse::applied("session reset"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        dto::team::JoinRequest,
        game::{boon::drawable, wager::WagerOutcome},
        services::{team_service, test_support::Harness},
        state::state_machine::SessionPhase,
        store::{SessionStore, models::BuzzEntity},
    };

    async fn gauntlet_with(harness: &Harness, teams: &[&str], prize: BoonId) {
        start_round(&harness.state).await.unwrap();
        harness.clock.advance(harness.state.timings().spin_delay_ms);
        deadline_service::reconcile(&harness.state).await.unwrap();
        open_buzzing(&harness.state).await.unwrap();

        for (offset, name) in teams.iter().enumerate() {
            team_service::join(
                &harness.state,
                JoinRequest {
                    name: (*name).into(),
                },
            )
            .await
            .unwrap();
            harness
                .store
                .append_buzz(BuzzEntity {
                    team_name: (*name).into(),
                    timestamp: 10_000 + 100 * offset as i64,
                })
                .await
                .unwrap();
        }
        assert!(lock_race(&harness.state, Some(prize)).await.unwrap().applied);
    }

    async fn inventory(harness: &Harness, name: &str) -> Vec<BoonId> {
        harness
            .store
            .team(TeamKey::normalize(name))
            .await
            .unwrap()
            .unwrap()
            .inventory
    }

    #[tokio::test]
    async fn rounds_draw_from_the_deck_without_repeats() {
        let harness = Harness::new(0);
        let mut seen = Vec::new();
        for _ in 0..drawable().count() {
            assert!(start_round(&harness.state).await.unwrap().applied);
            let doc = harness.store.session().await.unwrap();
            let prize = doc.boon_round.unwrap().boon_id;
            assert!(!seen.contains(&prize));
            assert_ne!(prize, BoonId::DoubleJeopardy);
            seen.push(prize);
            reset_round(&harness.state).await.unwrap();
        }
    }

    #[tokio::test]
    async fn lock_requires_at_least_one_buzz() {
        let harness = Harness::new(0);
        start_round(&harness.state).await.unwrap();
        harness.clock.advance(harness.state.timings().spin_delay_ms);
        deadline_service::reconcile(&harness.state).await.unwrap();
        open_buzzing(&harness.state).await.unwrap();

        let response = lock_race(&harness.state, None).await.unwrap();
        assert!(!response.applied);
    }

    #[tokio::test]
    async fn three_wrong_answers_end_the_round_without_an_award() {
        let harness = Harness::new(0);
        gauntlet_with(&harness, &["a", "b", "c"], BoonId::Priority).await;

        for _ in 0..3 {
            assert!(gauntlet_decision(&harness.state, false).await.unwrap().applied);
        }

        let doc = harness.store.session().await.unwrap();
        assert_eq!(SessionPhase::of(&doc), SessionPhase::Lightning(None));
        assert!(doc.last_winner.is_none());
        assert!(harness.store.buzzes().await.unwrap().is_empty());
        for name in ["a", "b", "c"] {
            assert!(inventory(&harness, name).await.is_empty());
        }
    }

    #[tokio::test]
    async fn correct_answer_at_step_two_awards_only_that_team() {
        let harness = Harness::new(0);
        gauntlet_with(&harness, &["a", "b", "c"], BoonId::Silencer).await;

        gauntlet_decision(&harness.state, false).await.unwrap();
        let response = gauntlet_decision(&harness.state, true).await.unwrap();
        assert!(response.applied);

        assert!(inventory(&harness, "a").await.is_empty());
        assert_eq!(inventory(&harness, "b").await, vec![BoonId::Silencer]);
        assert!(inventory(&harness, "c").await.is_empty());

        let doc = harness.store.session().await.unwrap();
        assert!(doc.boon_round.is_none());
        assert_eq!(doc.last_winner.unwrap().team, "b");
        assert!(!gauntlet_decision(&harness.state, true).await.unwrap().applied);
    }

    #[tokio::test]
    async fn simultaneous_verdicts_award_the_prize_once() {
        let harness = Harness::with_latency(0, Duration::from_millis(1), Duration::from_millis(3));
        gauntlet_with(&harness, &["a"], BoonId::Priority).await;

        let (first, second) = tokio::join!(
            gauntlet_decision(&harness.state, true),
            gauntlet_decision(&harness.state, true)
        );
        let applied = [first.unwrap().applied, second.unwrap().applied];
        assert_eq!(applied.iter().filter(|applied| **applied).count(), 1);
        assert_eq!(inventory(&harness, "a").await, vec![BoonId::Priority]);
    }

    #[tokio::test]
    async fn verdict_planned_on_an_earlier_step_is_dropped() {
        let harness = Harness::new(0);
        gauntlet_with(&harness, &["a", "b"], BoonId::Priority).await;
        let stale = harness.store.session().await.unwrap();

        gauntlet_decision(&harness.state, false).await.unwrap();
        let transition = run_transition_from(
            &harness.state,
            &stale,
            SessionEvent::EndRound {
                winner: Some(LastWinner {
                    team: "a".into(),
                    boon_id: BoonId::Priority,
                }),
            },
        )
        .await
        .unwrap();

        assert!(matches!(transition, Transition::Superseded { .. }));
        let doc = harness.store.session().await.unwrap();
        assert_eq!(doc.boon_round.unwrap().step, 2);
        assert!(doc.last_winner.is_none());
    }

    #[tokio::test]
    async fn gauntlet_stops_at_the_last_buzzed_team() {
        let harness = Harness::new(0);
        gauntlet_with(&harness, &["a", "b"], BoonId::Priority).await;

        gauntlet_decision(&harness.state, false).await.unwrap();
        gauntlet_decision(&harness.state, false).await.unwrap();
        let doc = harness.store.session().await.unwrap();
        assert!(doc.boon_round.is_none());
    }

    #[tokio::test]
    async fn double_jeopardy_offer_is_accepted_by_the_winner() {
        let harness = Harness::new(0);
        gauntlet_with(&harness, &["a", "b"], BoonId::DoubleJeopardy).await;
        gauntlet_decision(&harness.state, true).await.unwrap();

        assert!(!offer_wager(&harness.state, "b").await.unwrap().applied);
        assert!(offer_wager(&harness.state, "a").await.unwrap().applied);
        assert!(!offer_wager(&harness.state, "a").await.unwrap().applied);

        assert!(!team_service::decide_wager(&harness.state, "b", true).await.unwrap().applied);
        assert!(team_service::decide_wager(&harness.state, "a", true).await.unwrap().applied);

        let doc = harness.store.session().await.unwrap();
        assert!(doc.dj_offer.is_none());
        assert_eq!(doc.dj_result.unwrap().outcome, WagerOutcome::Accepted);
        assert!(inventory(&harness, "a").await.is_empty());
    }

    #[tokio::test]
    async fn unanswered_offers_expire_as_rejected() {
        let harness = Harness::new(0);
        gauntlet_with(&harness, &["a"], BoonId::DoubleJeopardy).await;
        gauntlet_decision(&harness.state, true).await.unwrap();
        offer_wager(&harness.state, "a").await.unwrap();

        harness.clock.advance(harness.state.timings().wager_window_ms);
        assert!(!team_service::decide_wager(&harness.state, "a", true).await.unwrap().applied);
        deadline_service::reconcile(&harness.state).await.unwrap();

        let doc = harness.store.session().await.unwrap();
        assert!(doc.dj_offer.is_none());
        assert_eq!(doc.dj_result.unwrap().outcome, WagerOutcome::Rejected);
        assert_eq!(inventory(&harness, "a").await, vec![BoonId::DoubleJeopardy]);
    }

    #[tokio::test]
    async fn modes_other_than_lobby_start_from_the_lobby() {
        let harness = Harness::new(0);
        assert!(set_mode(&harness.state, Mode::Hint).await.unwrap().applied);
        assert!(!set_mode(&harness.state, Mode::HyperFocus).await.unwrap().applied);
        assert!(set_mode(&harness.state, Mode::Lobby).await.unwrap().applied);
        assert!(set_mode(&harness.state, Mode::HyperFocus).await.unwrap().applied);
        assert!(start_focus_countdown(&harness.state).await.unwrap().applied);
        assert!(reset_focus(&harness.state).await.unwrap().applied);
    }

    #[tokio::test]
    async fn factory_reset_wipes_everything() {
        let harness = Harness::new(0);
        gauntlet_with(&harness, &["a"], BoonId::Priority).await;

        assert!(factory_reset(&harness.state).await.unwrap().applied);
        let doc = harness.store.session().await.unwrap();
        assert_eq!(doc.mode, Mode::Lobby);
        assert!(doc.used_boons.is_empty());
        assert!(harness.store.teams().await.unwrap().is_empty());
        assert!(harness.store.buzzes().await.unwrap().is_empty());
        assert!(harness.state.deadlines().is_empty());
    }
}
