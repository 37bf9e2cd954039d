use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use validator::Validate;

use crate::{
    dto::{
        common::ActionResponse,
        team::{JoinRequest, JoinResponse, UseBoonRequest, VoteRequest, WagerDecisionRequest},
    },
    error::AppError,
    services::team_service,
    state::SharedState,
};

/// Actions a team device performs on its own behalf.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/teams", post(join))
        .route("/teams/{name}/buzz", post(buzz))
        .route("/teams/{name}/hint", post(request_hint))
        .route("/teams/{name}/vote", post(vote))
        .route("/teams/{name}/boons/use", post(use_boon))
        .route("/teams/{name}/wager", post(decide_wager))
}

#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    request_body = JoinRequest,
    responses(
        (status = 200, description = "Team joined", body = JoinResponse),
        (status = 400, description = "Invalid team name")
    )
)]
/// Join the session, creating the team on first use.
pub async fn join(
    State(state): State<SharedState>,
    Json(payload): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, AppError> {
    payload.validate()?;
    Ok(Json(team_service::join(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/teams/{name}/buzz",
    tag = "teams",
    params(("name" = String, Path, description = "Team name")),
    responses(
        (status = 200, description = "Buzz recorded or ignored", body = ActionResponse),
        (status = 404, description = "Team has not joined")
    )
)]
/// Press the team's buzzer.
pub async fn buzz(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(team_service::submit_buzz(&state, &name).await?))
}

#[utoipa::path(
    post,
    path = "/teams/{name}/hint",
    tag = "teams",
    params(("name" = String, Path, description = "Team name")),
    responses(
        (status = 200, description = "Hint requested or ignored", body = ActionResponse),
        (status = 404, description = "Team has not joined")
    )
)]
/// Ask for a hint, opening a vote.
pub async fn request_hint(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(team_service::request_hint(&state, &name).await?))
}

#[utoipa::path(
    post,
    path = "/teams/{name}/vote",
    tag = "teams",
    params(("name" = String, Path, description = "Team name")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded or ignored", body = ActionResponse),
        (status = 404, description = "Team has not joined")
    )
)]
/// Vote on the open hint request, or signal readiness in Hyper Focus.
pub async fn vote(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        team_service::cast_vote(&state, &name, payload.vote).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/teams/{name}/boons/use",
    tag = "teams",
    params(("name" = String, Path, description = "Team name")),
    request_body = UseBoonRequest,
    responses(
        (status = 200, description = "Boon played or refused", body = ActionResponse),
        (status = 404, description = "Team has not joined")
    )
)]
/// Play a boon from the team's inventory.
pub async fn use_boon(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(payload): Json<UseBoonRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(team_service::use_boon(&state, &name, payload).await?))
}

#[utoipa::path(
    post,
    path = "/teams/{name}/wager",
    tag = "teams",
    params(("name" = String, Path, description = "Team name")),
    request_body = WagerDecisionRequest,
    responses(
        (status = 200, description = "Wager settled or ignored", body = ActionResponse),
        (status = 404, description = "Team has not joined")
    )
)]
/// Accept or decline a double-jeopardy offer.
pub async fn decide_wager(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(payload): Json<WagerDecisionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        team_service::decide_wager(&state, &name, payload.accept).await?,
    ))
}
