//! Match lifecycle: creation, live score updates, finishing and cancelling.
//!
//! Every read-modify-write sequence holds the state's write gate so the status
//! guard cannot be passed twice for the same match. Finishing commits the
//! match and the players' statistics in a single store call.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        league_store::LeagueStore,
        models::{MatchEntity, MatchFilter, MatchStatus},
    },
    dto::matches::{CreateMatchRequest, MatchResponse, ScoreUpdateRequest},
    error::ServiceError,
    services::{player_service, sse_events},
    state::{
        SharedState,
        match_lifecycle::{MatchEvent, next_status},
    },
};

/// Every match, newest first.
pub async fn list_matches(state: &SharedState) -> Result<Vec<MatchResponse>, ServiceError> {
    list_filtered(state, MatchFilter::All).await
}

pub async fn get_match(state: &SharedState, id: Uuid) -> Result<MatchResponse, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_match(store.as_ref(), id).await?.into())
}

/// Matches where `name` is either participant.
pub async fn list_matches_by_player(
    state: &SharedState,
    name: String,
) -> Result<Vec<MatchResponse>, ServiceError> {
    list_filtered(state, MatchFilter::Player(name)).await
}

/// Matches still in progress.
pub async fn list_active_matches(
    state: &SharedState,
) -> Result<Vec<MatchResponse>, ServiceError> {
    list_filtered(state, MatchFilter::Status(MatchStatus::InProgress)).await
}

/// Open a match, registering either participant that is not known yet.
pub async fn create_match(
    state: &SharedState,
    request: CreateMatchRequest,
) -> Result<MatchResponse, ServiceError> {
    player_service::ensure_name(&request.player1)?;
    player_service::ensure_name(&request.player2)?;
    let store = state.require_store().await?;

    player_service::ensure_player(state, store.as_ref(), &request.player1).await?;
    player_service::ensure_player(state, store.as_ref(), &request.player2).await?;

    let entity = MatchEntity::new(
        request.player1,
        request.player2,
        request.score1.unwrap_or_default(),
        request.score2.unwrap_or_default(),
    );
    store.save_match(entity.clone()).await?;
    info!(
        match_id = %entity.id,
        player1 = %entity.player1,
        player2 = %entity.player2,
        "match created"
    );

    let response = MatchResponse::from(entity);
    sse_events::broadcast_match_created(state, &response);
    Ok(response)
}

/// Overwrite both scores.
pub async fn update_score(
    state: &SharedState,
    id: Uuid,
    request: ScoreUpdateRequest,
) -> Result<MatchResponse, ServiceError> {
    let store = state.require_store().await?;
    let _gate = state.write_gate().await;

    let mut entity = load_match(store.as_ref(), id).await?;
    entity.score1 = request.score1;
    entity.score2 = request.score2;
    store.save_match(entity.clone()).await?;

    let response = MatchResponse::from(entity);
    sse_events::broadcast_match_updated(state, &response);
    Ok(response)
}

/// Close a running match and credit both players.
pub async fn finish_match(state: &SharedState, id: Uuid) -> Result<MatchResponse, ServiceError> {
    let store = state.require_store().await?;
    let _gate = state.write_gate().await;

    let mut entity = load_match(store.as_ref(), id).await?;
    entity.status = next_status(entity.status, MatchEvent::Finish)?;
    entity.finished_at = Some(SystemTime::now());

    let results = entity.player_results();
    store.record_finish(entity.clone(), results.clone()).await?;

    let response = MatchResponse::from(entity);
    info!(
        match_id = %response.id,
        winner = response.winner.as_deref().unwrap_or_default(),
        "match finished"
    );
    sse_events::broadcast_match_finished(state, &response);

    for result in results {
        player_service::broadcast_player_stats(state, store.as_ref(), result.name).await;
    }

    Ok(response)
}

/// Abandon a running match without touching statistics.
pub async fn cancel_match(state: &SharedState, id: Uuid) -> Result<MatchResponse, ServiceError> {
    let store = state.require_store().await?;
    let _gate = state.write_gate().await;

    let mut entity = load_match(store.as_ref(), id).await?;
    entity.status = next_status(entity.status, MatchEvent::Cancel)?;
    store.save_match(entity.clone()).await?;
    info!(match_id = %id, "match cancelled");

    let response = MatchResponse::from(entity);
    sse_events::broadcast_match_cancelled(state, &response);
    Ok(response)
}

/// Remove a match. Statistics it contributed are kept.
pub async fn delete_match(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let _gate = state.write_gate().await;
    if store.delete_match(id).await? {
        info!(match_id = %id, "match deleted");
        sse_events::broadcast_match_deleted(state, id);
    }
    Ok(())
}

async fn list_filtered(
    state: &SharedState,
    filter: MatchFilter,
) -> Result<Vec<MatchResponse>, ServiceError> {
    let store = state.require_store().await?;
    let matches = store.list_matches(filter).await?;
    Ok(matches.into_iter().map(Into::into).collect())
}

async fn load_match(store: &dyn LeagueStore, id: Uuid) -> Result<MatchEntity, ServiceError> {
    store
        .find_match(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{id}` not found")))
}
