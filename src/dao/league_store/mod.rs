pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{MatchEntity, MatchFilter, PlayerEntity, PlayerResult};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for matches and players.
///
/// Listing with [`MatchFilter::All`] returns matches newest first; the other
/// filters keep the same ordering.
pub trait LeagueStore: Send + Sync {
    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    fn list_matches(
        &self,
        filter: MatchFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    /// Returns whether a match was removed.
    fn delete_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Insert a new player, failing with a conflict when the name is taken.
    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Overwrite an existing player, failing with a conflict when renamed onto a taken name.
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    fn find_player_by_name(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Returns whether a player was removed.
    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Fold a result into the named player's statistics. Returns `false` when
    /// no player carries that name.
    fn apply_player_result(&self, result: PlayerResult) -> BoxFuture<'static, StorageResult<bool>>;
    /// Persist a finished match together with its player results as a single unit of work.
    fn record_finish(
        &self,
        entity: MatchEntity,
        results: Vec<PlayerResult>,
    ) -> BoxFuture<'static, StorageResult<()>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
