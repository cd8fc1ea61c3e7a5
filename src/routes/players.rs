use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::player::{CreatePlayerRequest, PlayerResponse, UpdatePlayerRequest},
    error::AppError,
    services::player_service,
    state::SharedState,
};

/// Player registry endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/players", get(list_players).post(create_player))
        .route("/api/players/name/{name}", get(get_player_by_name))
        .route(
            "/api/players/{id}",
            get(get_player).put(update_player).delete(delete_player),
        )
}

#[utoipa::path(
    get,
    path = "/api/players",
    tag = "players",
    responses((status = 200, description = "All players, by name", body = [PlayerResponse]))
)]
pub async fn list_players(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PlayerResponse>>, AppError> {
    Ok(Json(player_service::list_players(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Identifier of the player")),
    responses(
        (status = 200, description = "Player", body = PlayerResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn get_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerResponse>, AppError> {
    Ok(Json(player_service::get_player(&state, id).await?))
}

/// Look a player up by exact name.
#[utoipa::path(
    get,
    path = "/api/players/name/{name}",
    tag = "players",
    params(("name" = String, Path, description = "Exact player name")),
    responses(
        (status = 200, description = "Player", body = PlayerResponse),
        (status = 404, description = "No player with this name")
    )
)]
pub async fn get_player_by_name(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerResponse>, AppError> {
    player_service::get_player_by_name(&state, &name)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("player `{name}` not found")))
}

/// Register a player with empty statistics.
#[utoipa::path(
    post,
    path = "/api/players",
    tag = "players",
    request_body = CreatePlayerRequest,
    responses(
        (status = 200, description = "Player created", body = PlayerResponse),
        (status = 400, description = "Blank name"),
        (status = 409, description = "Name already registered")
    )
)]
pub async fn create_player(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreatePlayerRequest>>,
) -> Result<Json<PlayerResponse>, AppError> {
    Ok(Json(player_service::create_player(&state, payload).await?))
}

/// Overwrite a player's name and statistics.
#[utoipa::path(
    put,
    path = "/api/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Identifier of the player")),
    request_body = UpdatePlayerRequest,
    responses(
        (status = 200, description = "Player updated", body = PlayerResponse),
        (status = 404, description = "Unknown player"),
        (status = 409, description = "Name already registered")
    )
)]
pub async fn update_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdatePlayerRequest>>,
) -> Result<Json<PlayerResponse>, AppError> {
    Ok(Json(
        player_service::update_player(&state, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Identifier of the player")),
    responses((status = 200, description = "Player deleted, or never existed"))
)]
pub async fn delete_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    player_service::delete_player(&state, id).await?;
    Ok(())
}
