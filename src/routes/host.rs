use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::{
        common::ActionResponse,
        host::{GauntletDecisionRequest, LockRaceRequest, ModeRequest, WagerOfferRequest},
    },
    error::AppError,
    services::host_service,
    state::SharedState,
};

/// Host-only endpoints driving the session.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/host/mode", post(set_mode))
        .route("/host/lightning/round", post(start_round))
        .route("/host/lightning/buzzing", post(open_buzzing))
        .route("/host/lightning/lock", post(lock_race))
        .route("/host/gauntlet/decision", post(gauntlet_decision))
        .route("/host/round/reset", post(reset_round))
        .route("/host/hint/resume", post(resume_hint))
        .route("/host/hint/clear", post(clear_hint))
        .route("/host/focus/countdown", post(start_focus_countdown))
        .route("/host/focus/reset", post(reset_focus))
        .route("/host/wager/offer", post(offer_wager))
        .route("/host/reset", post(factory_reset))
}

#[utoipa::path(
    post,
    path = "/host/mode",
    tag = "host",
    request_body = ModeRequest,
    responses((status = 200, description = "Mode switched or ignored", body = ActionResponse))
)]
/// Switch the session mode; Lightning starts a round straight away.
pub async fn set_mode(
    State(state): State<SharedState>,
    Json(payload): Json<ModeRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::set_mode(&state, payload.mode).await?))
}

#[utoipa::path(
    post,
    path = "/host/lightning/round",
    tag = "host",
    responses((status = 200, description = "Round started or ignored", body = ActionResponse))
)]
/// Start a Lightning round with a freshly drawn prize.
pub async fn start_round(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::start_round(&state).await?))
}

#[utoipa::path(
    post,
    path = "/host/lightning/buzzing",
    tag = "host",
    responses((status = 200, description = "Buzzers opened or ignored", body = ActionResponse))
)]
/// Open the buzzers after the reveal.
pub async fn open_buzzing(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::open_buzzing(&state).await?))
}

#[utoipa::path(
    post,
    path = "/host/lightning/lock",
    tag = "host",
    request_body = LockRaceRequest,
    responses((status = 200, description = "Race locked or ignored", body = ActionResponse))
)]
/// Lock the race and start the gauntlet.
pub async fn lock_race(
    State(state): State<SharedState>,
    Json(payload): Json<LockRaceRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::lock_race(&state, payload.prize).await?))
}

#[utoipa::path(
    post,
    path = "/host/gauntlet/decision",
    tag = "host",
    request_body = GauntletDecisionRequest,
    responses((status = 200, description = "Verdict applied or ignored", body = ActionResponse))
)]
/// Rule on the current contender's answer.
pub async fn gauntlet_decision(
    State(state): State<SharedState>,
    Json(payload): Json<GauntletDecisionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        host_service::gauntlet_decision(&state, payload.correct).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/host/round/reset",
    tag = "host",
    responses((status = 200, description = "Round reset or ignored", body = ActionResponse))
)]
/// Abandon the current round and clear the buzzers.
pub async fn reset_round(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::reset_round(&state).await?))
}

#[utoipa::path(
    post,
    path = "/host/hint/resume",
    tag = "host",
    responses((status = 200, description = "Hint clock resumed or ignored", body = ActionResponse))
)]
/// Resume a hint clock paused by a granted hint.
pub async fn resume_hint(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::resume_hint(&state).await?))
}

#[utoipa::path(
    post,
    path = "/host/hint/clear",
    tag = "host",
    responses((status = 200, description = "Hint votes cleared or ignored", body = ActionResponse))
)]
/// Cancel the outstanding hint request and its votes.
pub async fn clear_hint(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::clear_hint(&state).await?))
}

#[utoipa::path(
    post,
    path = "/host/focus/countdown",
    tag = "host",
    responses((status = 200, description = "Countdown started or ignored", body = ActionResponse))
)]
/// Start the Hyper Focus clock.
pub async fn start_focus_countdown(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::start_focus_countdown(&state).await?))
}

#[utoipa::path(
    post,
    path = "/host/focus/reset",
    tag = "host",
    responses((status = 200, description = "Ready check restored or ignored", body = ActionResponse))
)]
/// Return Hyper Focus to its ready check.
pub async fn reset_focus(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::reset_focus(&state).await?))
}

#[utoipa::path(
    post,
    path = "/host/wager/offer",
    tag = "host",
    request_body = WagerOfferRequest,
    responses(
        (status = 200, description = "Offer made or ignored", body = ActionResponse),
        (status = 404, description = "Team has not joined")
    )
)]
/// Offer the double-jeopardy wager to its winner.
pub async fn offer_wager(
    State(state): State<SharedState>,
    Json(payload): Json<WagerOfferRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::offer_wager(&state, &payload.team).await?))
}

#[utoipa::path(
    post,
    path = "/host/reset",
    tag = "host",
    responses((status = 200, description = "Session wiped", body = ActionResponse))
)]
/// Wipe teams, buzzes and votes and return to a fresh lobby.
pub async fn factory_reset(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::factory_reset(&state).await?))
}
