use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the BabyFOOT backend.
#[openapi(
    info(title = "BabyFOOT Back", description = "Foosball league scorekeeping API"),
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::league_stream,
        crate::routes::matches::list_matches,
        crate::routes::matches::list_active_matches,
        crate::routes::matches::list_matches_by_player,
        crate::routes::matches::get_match,
        crate::routes::matches::create_match,
        crate::routes::matches::update_score,
        crate::routes::matches::finish_match,
        crate::routes::matches::cancel_match,
        crate::routes::matches::delete_match,
        crate::routes::players::list_players,
        crate::routes::players::get_player,
        crate::routes::players::get_player_by_name,
        crate::routes::players::create_player,
        crate::routes::players::update_player,
        crate::routes::players::delete_player,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::matches::CreateMatchRequest,
            crate::dto::matches::ScoreUpdateRequest,
            crate::dto::matches::MatchResponse,
            crate::dto::player::CreatePlayerRequest,
            crate::dto::player::UpdatePlayerRequest,
            crate::dto::player::PlayerResponse,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::MatchDeletedEvent,
            crate::dto::sse::PlayerDeletedEvent,
            crate::dao::models::MatchStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "matches", description = "Match lifecycle"),
        (name = "players", description = "Player registry and statistics"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/api/events",
            "/api/matches",
            "/api/matches/active",
            "/api/matches/player/{name}",
            "/api/matches/{id}",
            "/api/matches/{id}/score",
            "/api/matches/{id}/finish",
            "/api/matches/{id}/cancel",
            "/api/players",
            "/api/players/{id}",
            "/api/players/name/{name}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
