//! Process-local [`LeagueStore`] used for development and tests.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dao::{
    league_store::LeagueStore,
    models::{MatchEntity, MatchFilter, PlayerEntity, PlayerResult},
    storage::{StorageError, StorageResult},
};

/// In-memory store backed by concurrent maps.
///
/// Writes that span several entries (unique player names, finish commits) are
/// serialized through a commit lock so they appear atomic to other callers.
#[derive(Clone, Default)]
pub struct InMemoryLeagueStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    matches: DashMap<Uuid, MatchEntity>,
    players: DashMap<Uuid, PlayerEntity>,
    commit: Mutex<()>,
}

impl InMemoryLeagueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryInner {
    fn name_taken(&self, name: &str, exclude: Option<Uuid>) -> bool {
        self.players
            .iter()
            .any(|entry| entry.name == name && Some(entry.id) != exclude)
    }

    fn find_by_name(&self, name: &str) -> Option<PlayerEntity> {
        self.players
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value().clone())
    }

    /// Caller must hold the commit lock.
    fn apply_locked(&self, result: &PlayerResult) -> bool {
        match self
            .players
            .iter_mut()
            .find(|entry| entry.name == result.name)
        {
            Some(mut entry) => {
                entry.apply_result(result);
                true
            }
            None => false,
        }
    }

    fn list_matches(&self, filter: &MatchFilter) -> Vec<MatchEntity> {
        let mut matches: Vec<MatchEntity> = self
            .matches
            .iter()
            .filter(|entry| filter.accepts(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches
    }
}

impl LeagueStore for InMemoryLeagueStore {
    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.matches.insert(entity.id, entity);
            Ok(())
        })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.matches.get(&id).map(|entry| entry.value().clone())) })
    }

    fn list_matches(
        &self,
        filter: MatchFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.list_matches(&filter)) })
    }

    fn delete_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.matches.remove(&id).is_some()) })
    }

    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let _commit = inner.commit.lock().await;
            if inner.name_taken(&player.name, None) {
                return Err(StorageError::conflict(format!(
                    "player name `{}` already registered",
                    player.name
                )));
            }
            inner.players.insert(player.id, player);
            Ok(())
        })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let _commit = inner.commit.lock().await;
            if inner.name_taken(&player.name, Some(player.id)) {
                return Err(StorageError::conflict(format!(
                    "player name `{}` already registered",
                    player.name
                )));
            }
            inner.players.insert(player.id, player);
            Ok(())
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.players.get(&id).map(|entry| entry.value().clone())) })
    }

    fn find_player_by_name(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.find_by_name(&name)) })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut players: Vec<PlayerEntity> = inner
                .players
                .iter()
                .map(|entry| entry.value().clone())
                .collect();
            players.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(players)
        })
    }

    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.players.remove(&id).is_some()) })
    }

    fn apply_player_result(&self, result: PlayerResult) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let _commit = inner.commit.lock().await;
            Ok(inner.apply_locked(&result))
        })
    }

    fn record_finish(
        &self,
        entity: MatchEntity,
        results: Vec<PlayerResult>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let _commit = inner.commit.lock().await;
            for result in &results {
                inner.apply_locked(result);
            }
            inner.matches.insert(entity.id, entity);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::dao::models::MatchStatus;

    fn result(name: &str, won: bool, goals_for: u32, goals_against: u32) -> PlayerResult {
        PlayerResult {
            name: name.into(),
            won,
            goals_for,
            goals_against,
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_player_names() {
        let store = InMemoryLeagueStore::new();
        store
            .insert_player(PlayerEntity::new("alice".into()))
            .await
            .unwrap();

        let err = store
            .insert_player(PlayerEntity::new("alice".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
        assert_eq!(store.list_players().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rename_onto_taken_name_conflicts() {
        let store = InMemoryLeagueStore::new();
        let alice = PlayerEntity::new("alice".into());
        let mut bob = PlayerEntity::new("bob".into());
        store.insert_player(alice).await.unwrap();
        store.insert_player(bob.clone()).await.unwrap();

        bob.name = "alice".into();
        let err = store.save_player(bob.clone()).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));

        bob.wins = 4;
        bob.name = "bob".into();
        store.save_player(bob.clone()).await.unwrap();
        assert_eq!(store.find_player(bob.id).await.unwrap(), Some(bob));
    }

    #[tokio::test]
    async fn lists_matches_newest_first_with_filters() {
        let store = InMemoryLeagueStore::new();
        let base = SystemTime::now();

        let mut older = MatchEntity::new("alice".into(), "bob".into(), 0, 0);
        older.created_at = base - Duration::from_secs(60);
        let mut newer = MatchEntity::new("carol".into(), "alice".into(), 0, 0);
        newer.created_at = base;
        newer.status = MatchStatus::Finished;
        newer.finished_at = Some(base);

        store.save_match(older.clone()).await.unwrap();
        store.save_match(newer.clone()).await.unwrap();

        let all = store.list_matches(MatchFilter::All).await.unwrap();
        assert_eq!(all, vec![newer.clone(), older.clone()]);

        let bob = store
            .list_matches(MatchFilter::Player("bob".into()))
            .await
            .unwrap();
        assert_eq!(bob, vec![older.clone()]);

        let active = store
            .list_matches(MatchFilter::Status(MatchStatus::InProgress))
            .await
            .unwrap();
        assert_eq!(active, vec![older]);
    }

    #[tokio::test]
    async fn apply_result_on_unknown_name_reports_missing() {
        let store = InMemoryLeagueStore::new();
        let applied = store
            .apply_player_result(result("ghost", true, 1, 0))
            .await
            .unwrap();
        assert!(!applied);
        assert!(store.list_players().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_finish_writes_match_and_stats_together() {
        let store = InMemoryLeagueStore::new();
        store
            .insert_player(PlayerEntity::new("alice".into()))
            .await
            .unwrap();

        let mut entity = MatchEntity::new("alice".into(), "ghost".into(), 3, 1);
        entity.status = MatchStatus::Finished;
        entity.finished_at = Some(SystemTime::now());

        store
            .record_finish(
                entity.clone(),
                vec![result("alice", true, 3, 1), result("ghost", false, 1, 3)],
            )
            .await
            .unwrap();

        assert_eq!(store.find_match(entity.id).await.unwrap(), Some(entity));
        let alice = store
            .find_player_by_name("alice".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!((alice.wins, alice.goals_scored, alice.goals_conceded), (1, 3, 1));
        assert!(
            store
                .find_player_by_name("ghost".into())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = InMemoryLeagueStore::new();
        let entity = MatchEntity::new("alice".into(), "bob".into(), 0, 0);
        store.save_match(entity.clone()).await.unwrap();

        assert!(store.delete_match(entity.id).await.unwrap());
        assert!(!store.delete_match(entity.id).await.unwrap());
    }
}
