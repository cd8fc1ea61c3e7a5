use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::matches::{CreateMatchRequest, MatchResponse, ScoreUpdateRequest},
    error::AppError,
    services::match_service,
    state::SharedState,
};

/// Match lifecycle endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/matches", get(list_matches).post(create_match))
        .route("/api/matches/active", get(list_active_matches))
        .route("/api/matches/player/{name}", get(list_matches_by_player))
        .route("/api/matches/{id}", get(get_match).delete(delete_match))
        .route("/api/matches/{id}/score", put(update_score))
        .route("/api/matches/{id}/finish", put(finish_match))
        .route("/api/matches/{id}/cancel", put(cancel_match))
}

/// List every match, newest first.
#[utoipa::path(
    get,
    path = "/api/matches",
    tag = "matches",
    responses((status = 200, description = "All matches", body = [MatchResponse]))
)]
pub async fn list_matches(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MatchResponse>>, AppError> {
    Ok(Json(match_service::list_matches(&state).await?))
}

/// List matches that are still being played.
#[utoipa::path(
    get,
    path = "/api/matches/active",
    tag = "matches",
    responses((status = 200, description = "Matches in progress", body = [MatchResponse]))
)]
pub async fn list_active_matches(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MatchResponse>>, AppError> {
    Ok(Json(match_service::list_active_matches(&state).await?))
}

/// List matches a player took part in.
#[utoipa::path(
    get,
    path = "/api/matches/player/{name}",
    tag = "matches",
    params(("name" = String, Path, description = "Exact player name")),
    responses((status = 200, description = "Matches of the player", body = [MatchResponse]))
)]
pub async fn list_matches_by_player(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<MatchResponse>>, AppError> {
    Ok(Json(
        match_service::list_matches_by_player(&state, name).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/matches/{id}",
    tag = "matches",
    params(("id" = String, Path, description = "Identifier of the match")),
    responses(
        (status = 200, description = "Match", body = MatchResponse),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn get_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, AppError> {
    Ok(Json(match_service::get_match(&state, id).await?))
}

/// Open a match, registering unknown players on the fly.
#[utoipa::path(
    post,
    path = "/api/matches",
    tag = "matches",
    request_body = CreateMatchRequest,
    responses(
        (status = 200, description = "Match created", body = MatchResponse),
        (status = 400, description = "Blank player name")
    )
)]
pub async fn create_match(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateMatchRequest>>,
) -> Result<Json<MatchResponse>, AppError> {
    Ok(Json(match_service::create_match(&state, payload).await?))
}

/// Replace both scores of a match.
#[utoipa::path(
    put,
    path = "/api/matches/{id}/score",
    tag = "matches",
    params(("id" = String, Path, description = "Identifier of the match")),
    request_body = ScoreUpdateRequest,
    responses(
        (status = 200, description = "Scores updated", body = MatchResponse),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn update_score(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScoreUpdateRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    Ok(Json(match_service::update_score(&state, id, payload).await?))
}

/// Finish a match and credit the players.
#[utoipa::path(
    put,
    path = "/api/matches/{id}/finish",
    tag = "matches",
    params(("id" = String, Path, description = "Identifier of the match")),
    responses(
        (status = 200, description = "Match finished", body = MatchResponse),
        (status = 404, description = "Unknown match"),
        (status = 409, description = "Match is not in progress")
    )
)]
pub async fn finish_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, AppError> {
    Ok(Json(match_service::finish_match(&state, id).await?))
}

/// Abandon a match without recording a result.
#[utoipa::path(
    put,
    path = "/api/matches/{id}/cancel",
    tag = "matches",
    params(("id" = String, Path, description = "Identifier of the match")),
    responses(
        (status = 200, description = "Match cancelled", body = MatchResponse),
        (status = 404, description = "Unknown match"),
        (status = 409, description = "Match is not in progress")
    )
)]
pub async fn cancel_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, AppError> {
    Ok(Json(match_service::cancel_match(&state, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/matches/{id}",
    tag = "matches",
    params(("id" = String, Path, description = "Identifier of the match")),
    responses((status = 200, description = "Match deleted, or never existed"))
)]
pub async fn delete_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    match_service::delete_match(&state, id).await?;
    Ok(())
}
