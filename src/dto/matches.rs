//! Payloads of the `/api/matches` routes, serialized in camelCase for the web frontend.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{MatchEntity, MatchStatus},
    dto::{format_system_time, validation::validate_player_name},
};

/// Payload used to open a new match.
///
/// Unknown fields (such as a client-supplied `status`) are ignored.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    #[validate(custom(function = "validate_player_name"))]
    pub player1: String,
    #[validate(custom(function = "validate_player_name"))]
    pub player2: String,
    /// Initial score of the first player, 0 when omitted.
    #[serde(default)]
    pub score1: Option<u32>,
    /// Initial score of the second player, 0 when omitted.
    #[serde(default)]
    pub score2: Option<u32>,
}

/// Replacement scores for a running match. An omitted score is 0.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScoreUpdateRequest {
    #[serde(default)]
    pub score1: u32,
    #[serde(default)]
    pub score2: u32,
}

/// Public projection of a match.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub id: Uuid,
    pub player1: String,
    pub player2: String,
    pub score1: u32,
    pub score2: u32,
    pub status: MatchStatus,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp, present only once the match is finished.
    pub finished_at: Option<String>,
    /// Winner's name, `"Draw"` for a tie, absent until the match is finished.
    pub winner: Option<String>,
}

impl From<MatchEntity> for MatchResponse {
    fn from(entity: MatchEntity) -> Self {
        let winner = entity.winner().map(|winner| winner.label().to_owned());
        Self {
            id: entity.id,
            player1: entity.player1,
            player2: entity.player2,
            score1: entity.score1,
            score2: entity.score2,
            status: entity.status,
            created_at: format_system_time(entity.created_at),
            finished_at: entity.finished_at.map(format_system_time),
            winner,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_in_camel_case_with_winner() {
        let mut entity = MatchEntity::new("alice".into(), "bob".into(), 5, 3);
        entity.status = MatchStatus::Finished;
        entity.finished_at = Some(SystemTime::now());

        let value = serde_json::to_value(MatchResponse::from(entity)).unwrap();
        assert_eq!(value["status"], json!("FINISHED"));
        assert_eq!(value["winner"], json!("alice"));
        assert!(value["createdAt"].is_string());
        assert!(value["finishedAt"].is_string());
    }

    #[test]
    fn running_match_has_no_winner_nor_finish_time() {
        let entity = MatchEntity::new("alice".into(), "bob".into(), 1, 0);
        let value = serde_json::to_value(MatchResponse::from(entity)).unwrap();
        assert_eq!(value["status"], json!("IN_PROGRESS"));
        assert!(value["winner"].is_null());
        assert!(value["finishedAt"].is_null());
    }

    #[test]
    fn create_request_defaults_scores_and_ignores_extra_fields() {
        let request: CreateMatchRequest = serde_json::from_value(json!({
            "player1": "alice",
            "player2": "bob",
            "status": "FINISHED"
        }))
        .unwrap();
        assert_eq!(request.score1, None);
        assert_eq!(request.score2, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_blank_names() {
        let request: CreateMatchRequest = serde_json::from_value(json!({
            "player1": " ",
            "player2": "bob"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("player1"));
    }

    #[test]
    fn score_update_defaults_missing_scores_to_zero() {
        let request: ScoreUpdateRequest = serde_json::from_value(json!({"score1": 4})).unwrap();
        assert_eq!((request.score1, request.score2), (4, 0));
    }
}
