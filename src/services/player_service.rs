//! Player registry and statistics.
//!
//! Names are unique and act as the key matches refer to players by. The store
//! enforces uniqueness; these helpers only translate its conflicts.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        league_store::LeagueStore,
        models::{PlayerEntity, PlayerResult},
    },
    dto::player::{CreatePlayerRequest, PlayerResponse, UpdatePlayerRequest},
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

pub async fn list_players(state: &SharedState) -> Result<Vec<PlayerResponse>, ServiceError> {
    let store = state.require_store().await?;
    let players = store.list_players().await?;
    Ok(players.into_iter().map(Into::into).collect())
}

pub async fn get_player(state: &SharedState, id: Uuid) -> Result<PlayerResponse, ServiceError> {
    let store = state.require_store().await?;
    let Some(player) = store.find_player(id).await? else {
        return Err(ServiceError::NotFound(format!("player `{id}` not found")));
    };
    Ok(player.into())
}

/// Look a player up by exact name. An unknown name is not an error.
pub async fn get_player_by_name(
    state: &SharedState,
    name: &str,
) -> Result<Option<PlayerResponse>, ServiceError> {
    let store = state.require_store().await?;
    let player = store.find_player_by_name(name.to_owned()).await?;
    Ok(player.map(Into::into))
}

/// Register a player with zero statistics.
pub async fn create_player(
    state: &SharedState,
    request: CreatePlayerRequest,
) -> Result<PlayerResponse, ServiceError> {
    ensure_name(&request.name)?;
    let store = state.require_store().await?;

    let player = PlayerEntity::new(request.name);
    store.insert_player(player.clone()).await?;
    info!(player_id = %player.id, name = %player.name, "player created");

    let response = PlayerResponse::from(player);
    sse_events::broadcast_player_created(state, &response);
    Ok(response)
}

/// Overwrite a player's name and every counter.
pub async fn update_player(
    state: &SharedState,
    id: Uuid,
    request: UpdatePlayerRequest,
) -> Result<PlayerResponse, ServiceError> {
    ensure_name(&request.name)?;
    let store = state.require_store().await?;
    let _gate = state.write_gate().await;

    let Some(mut player) = store.find_player(id).await? else {
        return Err(ServiceError::NotFound(format!("player `{id}` not found")));
    };

    player.name = request.name;
    player.wins = request.wins;
    player.losses = request.losses;
    player.goals_scored = request.goals_scored;
    player.goals_conceded = request.goals_conceded;
    store.save_player(player.clone()).await?;

    let response = PlayerResponse::from(player);
    sse_events::broadcast_player_updated(state, &response);
    Ok(response)
}

/// Remove a player. Matches naming it are left untouched.
pub async fn delete_player(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let _gate = state.write_gate().await;
    if store.delete_player(id).await? {
        info!(player_id = %id, "player deleted");
        sse_events::broadcast_player_deleted(state, id);
    }
    Ok(())
}

/// Add one match outcome to the named player's counters.
///
/// Does nothing when no player carries that name.
pub async fn apply_match_result(
    state: &SharedState,
    result: PlayerResult,
) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let _gate = state.write_gate().await;

    let name = result.name.clone();
    if !store.apply_player_result(result).await? {
        debug!(%name, "no player registered under this name; result ignored");
        return Ok(());
    }

    broadcast_player_stats(state, store.as_ref(), name).await;
    Ok(())
}

/// Publish the current statistics of `name` once they have been committed.
///
/// A failed lookup is logged and skipped; the write it follows already succeeded.
pub(crate) async fn broadcast_player_stats(
    state: &SharedState,
    store: &dyn LeagueStore,
    name: String,
) {
    match store.find_player_by_name(name.clone()).await {
        Ok(Some(player)) => sse_events::broadcast_player_updated(state, &player.into()),
        Ok(None) => {}
        Err(err) => warn!(%name, error = %err, "failed to load player for stats broadcast"),
    }
}

/// Make sure a player called `name` exists, creating it when needed.
///
/// Losing a creation race against another request is not an error.
pub(crate) async fn ensure_player(
    state: &SharedState,
    store: &dyn LeagueStore,
    name: &str,
) -> Result<(), ServiceError> {
    if store.find_player_by_name(name.to_owned()).await?.is_some() {
        return Ok(());
    }

    let player = PlayerEntity::new(name.to_owned());
    match store.insert_player(player.clone()).await.map_err(ServiceError::from) {
        Ok(()) => {
            info!(player_id = %player.id, name, "player registered from a new match");
            sse_events::broadcast_player_created(state, &player.into());
            Ok(())
        }
        Err(ServiceError::AlreadyExists(_)) => Ok(()),
        Err(err) => Err(err),
    }
}

pub(crate) fn ensure_name(name: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "player name must not be blank".into(),
        ));
    }
    Ok(())
}
