use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::common::SessionSnapshot,
    error::AppError,
    game::view::{BoonView, TeamView},
    services::public_service,
    state::SharedState,
};

/// Read-only views every client derives from the shared state.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/teams/{name}", get(get_team))
        .route("/boons", get(list_boons))
}

#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses(
        (status = 200, description = "Derived session", body = SessionSnapshot),
        (status = 503, description = "Store unavailable")
    )
)]
/// Return the derived session view.
pub async fn get_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(public_service::get_session(&state).await?))
}

#[utoipa::path(
    get,
    path = "/teams/{name}",
    tag = "session",
    params(("name" = String, Path, description = "Team name, any case")),
    responses(
        (status = 200, description = "Team view", body = TeamView),
        (status = 404, description = "Team has not joined")
    )
)]
/// Return one team with its inventory and buzzer state.
pub async fn get_team(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<TeamView>, AppError> {
    Ok(Json(public_service::get_team(&state, &name).await?))
}

#[utoipa::path(
    get,
    path = "/boons",
    tag = "session",
    responses((status = 200, description = "Boon catalog", body = [BoonView]))
)]
/// Return the boon catalog.
pub async fn list_boons() -> Json<Vec<BoonView>> {
    Json(public_service::list_boons())
}
