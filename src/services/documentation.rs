use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the trivia buzzer backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::session_stream,
        crate::routes::session::get_session,
        crate::routes::session::get_team,
        crate::routes::session::list_boons,
        crate::routes::team::join,
        crate::routes::team::buzz,
        crate::routes::team::request_hint,
        crate::routes::team::vote,
        crate::routes::team::use_boon,
        crate::routes::team::decide_wager,
        crate::routes::host::set_mode,
        crate::routes::host::start_round,
        crate::routes::host::open_buzzing,
        crate::routes::host::lock_race,
        crate::routes::host::gauntlet_decision,
        crate::routes::host::reset_round,
        crate::routes::host::resume_hint,
        crate::routes::host::clear_hint,
        crate::routes::host::start_focus_countdown,
        crate::routes::host::reset_focus,
        crate::routes::host::offer_wager,
        crate::routes::host::factory_reset,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::common::ActionResponse,
            crate::dto::common::SessionSnapshot,
            crate::dto::phase::VisiblePhase,
            crate::dto::team::JoinRequest,
            crate::dto::team::JoinResponse,
            crate::dto::team::VoteRequest,
            crate::dto::team::UseBoonRequest,
            crate::dto::team::WagerDecisionRequest,
            crate::dto::host::ModeRequest,
            crate::dto::host::LockRaceRequest,
            crate::dto::host::GauntletDecisionRequest,
            crate::dto::host::WagerOfferRequest,
            crate::game::view::SessionView,
            crate::game::view::TeamView,
            crate::game::view::BoonView,
            crate::game::race::BuzzEligibility,
            crate::game::boon::BoonId,
            crate::config::GameTimings,
            crate::store::models::SessionDoc,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "session", description = "Derived session views"),
        (name = "teams", description = "Actions performed by team devices"),
        (name = "host", description = "Actions performed by the host"),
    )
)]
/// OpenAPI document covering every route.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/teams/{name}/boons/use"));
        assert!(doc.paths.paths.contains_key("/host/gauntlet/decision"));
        assert_eq!(doc.paths.paths.len(), 23);
    }
}
