use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::PlayerEntity, dto::validation::validate_player_name};

/// Payload registering a new player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePlayerRequest {
    #[validate(custom(function = "validate_player_name"))]
    pub name: String,
}

/// Full replacement of a player's name and counters.
///
/// Omitted counters are reset to 0.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerRequest {
    #[validate(custom(function = "validate_player_name"))]
    pub name: String,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub goals_scored: u32,
    #[serde(default)]
    pub goals_conceded: u32,
}

/// Public projection of a player and its statistics.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: Uuid,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    /// Share of decided matches won, between 0 and 1.
    pub win_rate: f64,
}

impl From<PlayerEntity> for PlayerResponse {
    fn from(entity: PlayerEntity) -> Self {
        let win_rate = entity.win_rate();
        Self {
            id: entity.id,
            name: entity.name,
            wins: entity.wins,
            losses: entity.losses,
            goals_scored: entity.goals_scored,
            goals_conceded: entity.goals_conceded,
            win_rate,
        }
    }
}
