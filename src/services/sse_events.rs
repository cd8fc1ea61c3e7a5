use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        matches::MatchResponse,
        player::PlayerResponse,
        sse::{MatchDeletedEvent, PlayerDeletedEvent, ServerEvent, SystemStatus},
    },
    state::{SharedState, SseHub},
};

const EVENT_MATCH_CREATED: &str = "match.created";
const EVENT_MATCH_UPDATED: &str = "match.updated";
const EVENT_MATCH_FINISHED: &str = "match.finished";
const EVENT_MATCH_CANCELLED: &str = "match.cancelled";
const EVENT_MATCH_DELETED: &str = "match.deleted";
const EVENT_PLAYER_CREATED: &str = "player.created";
const EVENT_PLAYER_UPDATED: &str = "player.updated";
const EVENT_PLAYER_DELETED: &str = "player.deleted";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast a newly opened match.
pub fn broadcast_match_created(state: &SharedState, payload: &MatchResponse) {
    send_public_event(state.events(), EVENT_MATCH_CREATED, payload);
}

/// Broadcast a score change.
pub fn broadcast_match_updated(state: &SharedState, payload: &MatchResponse) {
    send_public_event(state.events(), EVENT_MATCH_UPDATED, payload);
}

/// Broadcast a finished match, winner included.
pub fn broadcast_match_finished(state: &SharedState, payload: &MatchResponse) {
    send_public_event(state.events(), EVENT_MATCH_FINISHED, payload);
}

pub fn broadcast_match_cancelled(state: &SharedState, payload: &MatchResponse) {
    send_public_event(state.events(), EVENT_MATCH_CANCELLED, payload);
}

pub fn broadcast_match_deleted(state: &SharedState, id: Uuid) {
    send_public_event(state.events(), EVENT_MATCH_DELETED, &MatchDeletedEvent { id });
}

/// Broadcast a player registration, explicit or implied by a new match.
pub fn broadcast_player_created(state: &SharedState, payload: &PlayerResponse) {
    send_public_event(state.events(), EVENT_PLAYER_CREATED, payload);
}

/// Broadcast a player whose name or statistics changed.
pub fn broadcast_player_updated(state: &SharedState, payload: &PlayerResponse) {
    send_public_event(state.events(), EVENT_PLAYER_UPDATED, payload);
}

pub fn broadcast_player_deleted(state: &SharedState, id: Uuid) {
    send_public_event(state.events(), EVENT_PLAYER_DELETED, &PlayerDeletedEvent { id });
}

/// Broadcast whether the backend is running without storage.
pub fn broadcast_system_status(hub: &SseHub, degraded: bool) {
    send_public_event(hub, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_public_event(hub: &SseHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[tokio::test]
    async fn deletions_carry_only_the_id() {
        let state = AppState::new(4);
        let mut receiver = state.events().subscribe();
        let id = Uuid::new_v4();

        broadcast_match_deleted(&state, id);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("match.deleted"));
        assert_eq!(event.data, format!(r#"{{"id":"{id}"}}"#));
    }
}
