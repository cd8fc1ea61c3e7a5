use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Winner label reported for a finished match with equal scores.
pub const DRAW: &str = "Draw";

/// Lifecycle status of a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Match is being played; scores may still change.
    InProgress,
    /// Match is over and its result has been applied to the players.
    Finished,
    /// Match was abandoned; no result is recorded.
    Cancelled,
}

impl MatchStatus {
    /// Stable textual form, identical to the serialized value.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::InProgress => "IN_PROGRESS",
            MatchStatus::Finished => "FINISHED",
            MatchStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Match between two players referenced by name, as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    /// Name of the first participant.
    pub player1: String,
    /// Name of the second participant.
    pub player2: String,
    /// Goals scored by the first participant.
    pub score1: u32,
    /// Goals scored by the second participant.
    pub score2: u32,
    /// Current lifecycle status.
    pub status: MatchStatus,
    /// Creation timestamp, used for ordering.
    pub created_at: SystemTime,
    /// Set when, and only when, the match is finished.
    pub finished_at: Option<SystemTime>,
}

/// Outcome of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner<'a> {
    /// The named participant scored more goals.
    Player(&'a str),
    /// Both participants scored the same number of goals.
    Draw,
}

impl Winner<'_> {
    /// Name of the winner, or [`DRAW`].
    pub fn label(&self) -> &str {
        match self {
            Winner::Player(name) => name,
            Winner::Draw => DRAW,
        }
    }
}

impl MatchEntity {
    /// Build a fresh in-progress match created now.
    pub fn new(player1: String, player2: String, score1: u32, score2: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            player1,
            player2,
            score1,
            score2,
            status: MatchStatus::InProgress,
            created_at: SystemTime::now(),
            finished_at: None,
        }
    }

    /// Winner derived from the current scores; `None` unless the match is finished.
    pub fn winner(&self) -> Option<Winner<'_>> {
        if self.status != MatchStatus::Finished {
            return None;
        }

        Some(match self.score1.cmp(&self.score2) {
            std::cmp::Ordering::Greater => Winner::Player(&self.player1),
            std::cmp::Ordering::Less => Winner::Player(&self.player2),
            std::cmp::Ordering::Equal => Winner::Draw,
        })
    }

    /// Per-participant results to apply to player statistics, winner first.
    ///
    /// Empty for draws and for matches that are not finished.
    pub fn player_results(&self) -> Vec<PlayerResult> {
        let first = PlayerResult {
            name: self.player1.clone(),
            won: self.score1 > self.score2,
            goals_for: self.score1,
            goals_against: self.score2,
        };
        let second = PlayerResult {
            name: self.player2.clone(),
            won: self.score2 > self.score1,
            goals_for: self.score2,
            goals_against: self.score1,
        };

        match self.winner() {
            Some(Winner::Player(_)) if first.won => vec![first, second],
            Some(Winner::Player(_)) => vec![second, first],
            Some(Winner::Draw) | None => Vec::new(),
        }
    }

    /// Whether `name` takes part in this match.
    pub fn involves(&self, name: &str) -> bool {
        self.player1 == name || self.player2 == name
    }
}

/// Registered player with cumulative statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Primary key of the player.
    pub id: Uuid,
    /// Unique display name, also the join key used by matches.
    pub name: String,
    /// Matches won.
    pub wins: u32,
    /// Matches lost.
    pub losses: u32,
    /// Goals scored across finished matches.
    pub goals_scored: u32,
    /// Goals conceded across finished matches.
    pub goals_conceded: u32,
}

impl PlayerEntity {
    /// Register a new player with zeroed statistics.
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            wins: 0,
            losses: 0,
            goals_scored: 0,
            goals_conceded: 0,
        }
    }

    /// Fold one match result into the statistics.
    pub fn apply_result(&mut self, result: &PlayerResult) {
        if result.won {
            self.wins = self.wins.saturating_add(1);
        } else {
            self.losses = self.losses.saturating_add(1);
        }
        self.goals_scored = self.goals_scored.saturating_add(result.goals_for);
        self.goals_conceded = self.goals_conceded.saturating_add(result.goals_against);
    }

    /// Share of decided matches won, between 0 and 1.
    pub fn win_rate(&self) -> f64 {
        let decided = u64::from(self.wins) + u64::from(self.losses);
        if decided == 0 {
            0.0
        } else {
            f64::from(self.wins) / decided as f64
        }
    }
}

/// Statistics delta contributed by one participant of a finished match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerResult {
    /// Name of the participant.
    pub name: String,
    /// Whether the participant won (otherwise lost).
    pub won: bool,
    /// Goals the participant scored.
    pub goals_for: u32,
    /// Goals the participant conceded.
    pub goals_against: u32,
}

/// Selection criteria for listing matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchFilter {
    /// Every match.
    All,
    /// Matches where the name appears as either participant.
    Player(String),
    /// Matches in the given status.
    Status(MatchStatus),
}

impl MatchFilter {
    /// Whether `entity` is selected by this filter.
    pub fn accepts(&self, entity: &MatchEntity) -> bool {
        match self {
            MatchFilter::All => true,
            MatchFilter::Player(name) => entity.involves(name),
            MatchFilter::Status(status) => entity.status == *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(score1: u32, score2: u32) -> MatchEntity {
        let mut entity = MatchEntity::new("alice".into(), "bob".into(), score1, score2);
        entity.status = MatchStatus::Finished;
        entity.finished_at = Some(SystemTime::now());
        entity
    }

    #[test]
    fn new_match_starts_in_progress_without_finish_time() {
        let entity = MatchEntity::new("alice".into(), "bob".into(), 0, 0);
        assert_eq!(entity.status, MatchStatus::InProgress);
        assert!(entity.finished_at.is_none());
        assert_eq!((entity.score1, entity.score2), (0, 0));
    }

    #[test]
    fn winner_is_undefined_until_finished() {
        let entity = MatchEntity::new("alice".into(), "bob".into(), 5, 1);
        assert_eq!(entity.winner(), None);

        let mut cancelled = entity.clone();
        cancelled.status = MatchStatus::Cancelled;
        assert_eq!(cancelled.winner(), None);
    }

    #[test]
    fn winner_follows_scores() {
        assert_eq!(finished(3, 1).winner(), Some(Winner::Player("alice")));
        assert_eq!(finished(1, 3).winner(), Some(Winner::Player("bob")));
        assert_eq!(finished(2, 2).winner(), Some(Winner::Draw));
        assert_eq!(finished(2, 2).winner().map(|w| w.label().to_owned()), Some(DRAW.into()));
    }

    #[test]
    fn player_results_list_winner_first_with_swapped_goals() {
        let results = finished(1, 4).player_results();
        assert_eq!(
            results,
            vec![
                PlayerResult {
                    name: "bob".into(),
                    won: true,
                    goals_for: 4,
                    goals_against: 1,
                },
                PlayerResult {
                    name: "alice".into(),
                    won: false,
                    goals_for: 1,
                    goals_against: 4,
                },
            ]
        );
    }

    #[test]
    fn draws_and_unfinished_matches_produce_no_results() {
        assert!(finished(2, 2).player_results().is_empty());
        assert!(
            MatchEntity::new("alice".into(), "bob".into(), 3, 0)
                .player_results()
                .is_empty()
        );
    }

    #[test]
    fn apply_result_increments_counters() {
        let mut player = PlayerEntity::new("alice".into());
        player.apply_result(&PlayerResult {
            name: "alice".into(),
            won: true,
            goals_for: 3,
            goals_against: 1,
        });
        player.apply_result(&PlayerResult {
            name: "alice".into(),
            won: false,
            goals_for: 0,
            goals_against: 2,
        });

        assert_eq!(player.wins, 1);
        assert_eq!(player.losses, 1);
        assert_eq!(player.goals_scored, 3);
        assert_eq!(player.goals_conceded, 3);
        assert!((player.win_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn counters_saturate() {
        let mut player = PlayerEntity::new("alice".into());
        player.goals_scored = u32::MAX - 1;
        player.apply_result(&PlayerResult {
            name: "alice".into(),
            won: true,
            goals_for: 10,
            goals_against: 0,
        });
        assert_eq!(player.goals_scored, u32::MAX);
    }

    #[test]
    fn filters_select_by_participant_and_status() {
        let entity = MatchEntity::new("alice".into(), "bob".into(), 0, 0);
        assert!(MatchFilter::All.accepts(&entity));
        assert!(MatchFilter::Player("bob".into()).accepts(&entity));
        assert!(!MatchFilter::Player("Bob".into()).accepts(&entity));
        assert!(MatchFilter::Status(MatchStatus::InProgress).accepts(&entity));
        assert!(!MatchFilter::Status(MatchStatus::Finished).accepts(&entity));
    }
}
