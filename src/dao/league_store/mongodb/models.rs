use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::models::{MatchEntity, MatchStatus, PlayerEntity, PlayerResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: String,
    player1: String,
    player2: String,
    score1: i64,
    score2: i64,
    status: MatchStatus,
    created_at: DateTime,
    #[serde(default)]
    finished_at: Option<DateTime>,
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id.to_string(),
            player1: value.player1,
            player2: value.player2,
            score1: i64::from(value.score1),
            score2: i64::from(value.score2),
            status: value.status,
            created_at: DateTime::from_system_time(value.created_at),
            finished_at: value.finished_at.map(DateTime::from_system_time),
        }
    }
}

impl TryFrom<MongoMatchDocument> for MatchEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoMatchDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&value.id)?,
            score1: counter(&value.id, "score1", value.score1)?,
            score2: counter(&value.id, "score2", value.score2)?,
            player1: value.player1,
            player2: value.player2,
            status: value.status,
            created_at: value.created_at.to_system_time(),
            finished_at: value.finished_at.map(DateTime::to_system_time),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    wins: i64,
    losses: i64,
    goals_scored: i64,
    goals_conceded: i64,
}

impl From<PlayerEntity> for MongoPlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            wins: i64::from(value.wins),
            losses: i64::from(value.losses),
            goals_scored: i64::from(value.goals_scored),
            goals_conceded: i64::from(value.goals_conceded),
        }
    }
}

impl TryFrom<MongoPlayerDocument> for PlayerEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoPlayerDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&value.id)?,
            wins: counter(&value.id, "wins", value.wins)?,
            losses: counter(&value.id, "losses", value.losses)?,
            goals_scored: counter(&value.id, "goals_scored", value.goals_scored)?,
            goals_conceded: counter(&value.id, "goals_conceded", value.goals_conceded)?,
            name: value.name,
        })
    }
}

fn parse_id(raw: &str) -> Result<Uuid, MongoDaoError> {
    Uuid::parse_str(raw).map_err(|err| MongoDaoError::MalformedDocument {
        id: raw.to_owned(),
        reason: err.to_string(),
    })
}

fn counter(id: &str, field: &str, value: i64) -> Result<u32, MongoDaoError> {
    u32::try_from(value).map_err(|_| MongoDaoError::MalformedDocument {
        id: id.to_owned(),
        reason: format!("`{field}` out of range: {value}"),
    })
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

/// `$inc` update folding one match result into a player document.
pub fn result_update(result: &PlayerResult) -> Document {
    let (wins, losses) = if result.won { (1_i64, 0_i64) } else { (0, 1) };
    doc! {
        "$inc": {
            "wins": wins,
            "losses": losses,
            "goals_scored": i64::from(result.goals_for),
            "goals_conceded": i64::from(result.goals_against),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loser_update_increments_losses_only() {
        let update = result_update(&PlayerResult {
            name: "bob".into(),
            won: false,
            goals_for: 1,
            goals_against: 3,
        });
        let inc = update.get_document("$inc").unwrap();
        assert_eq!(inc.get_i64("wins").unwrap(), 0);
        assert_eq!(inc.get_i64("losses").unwrap(), 1);
        assert_eq!(inc.get_i64("goals_scored").unwrap(), 1);
        assert_eq!(inc.get_i64("goals_conceded").unwrap(), 3);
    }

    #[test]
    fn negative_counters_are_rejected() {
        let mut document = MongoPlayerDocument::from(PlayerEntity::new("alice".into()));
        document.losses = -1;

        let err = PlayerEntity::try_from(document).unwrap_err();
        assert!(matches!(err, MongoDaoError::MalformedDocument { .. }));
    }

    #[test]
    fn status_is_stored_as_wire_string() {
        let document = MongoMatchDocument::from(MatchEntity::new("a".into(), "b".into(), 0, 0));
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["status"], "IN_PROGRESS");
    }
}
