use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, ClientSession, Collection, Database, IndexModel,
    bson::{Document, doc},
    error::Error as MongoError,
    options::IndexOptions,
};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoMatchDocument, MongoPlayerDocument, doc_id, result_update},
};
use crate::dao::{
    league_store::LeagueStore,
    models::{MatchEntity, MatchFilter, PlayerEntity, PlayerResult},
    storage::StorageResult,
};

const MATCH_COLLECTION_NAME: &str = "matches";
const PLAYER_COLLECTION_NAME: &str = "players";

/// MongoDB-backed [`LeagueStore`].
///
/// Finishing a match runs inside a multi-document transaction, which needs a
/// replica set (a single-node replica set is enough).
#[derive(Clone)]
pub struct MongoLeagueStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoLeagueStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let players = self.players().await;
        let unique_name = IndexModel::builder()
            .keys(doc! {"name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("player_name_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        players
            .create_index(unique_name)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: PLAYER_COLLECTION_NAME,
                index: "name",
                source,
            })?;

        let matches = self.matches().await;
        let indexes = [
            ("match_created_idx", "created_at", doc! {"created_at": -1}),
            ("match_player1_idx", "player1", doc! {"player1": 1}),
            ("match_player2_idx", "player2", doc! {"player2": 1}),
            ("match_status_idx", "status", doc! {"status": 1}),
        ];
        for (name, field, keys) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(Some(name.to_owned())).build())
                .build();
            matches
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: MATCH_COLLECTION_NAME,
                    index: field,
                    source,
                })?;
        }

        Ok(())
    }

    async fn client(&self) -> Client {
        let guard = self.inner.state.read().await;
        guard.client.clone()
    }

    async fn matches(&self) -> Collection<MongoMatchDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    async fn players(&self) -> Collection<MongoPlayerDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoPlayerDocument>(PLAYER_COLLECTION_NAME)
    }

    async fn save_match(&self, entity: MatchEntity) -> MongoResult<()> {
        let id = entity.id;
        let document: MongoMatchDocument = entity.into();
        self.matches()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveMatch { id, source })?;
        Ok(())
    }

    async fn find_match(&self, id: Uuid) -> MongoResult<Option<MatchEntity>> {
        let document = self
            .matches()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadMatch { id, source })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn list_matches(&self, filter: MatchFilter) -> MongoResult<Vec<MatchEntity>> {
        let query = match filter {
            MatchFilter::All => doc! {},
            MatchFilter::Player(name) => doc! {
                "$or": [{"player1": name.as_str()}, {"player2": name.as_str()}]
            },
            MatchFilter::Status(status) => doc! {"status": status.as_str()},
        };

        let documents: Vec<MongoMatchDocument> = self
            .matches()
            .await
            .find(query)
            .sort(doc! {"created_at": -1})
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_match(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .matches()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteMatch { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn insert_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let name = player.name.clone();
        let document: MongoPlayerDocument = player.into();
        self.players()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SavePlayer { name, source })?;
        Ok(())
    }

    async fn save_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let id = player.id;
        let name = player.name.clone();
        let document: MongoPlayerDocument = player.into();
        self.players()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SavePlayer { name, source })?;
        Ok(())
    }

    async fn find_player_where(
        &self,
        key: String,
        query: Document,
    ) -> MongoResult<Option<PlayerEntity>> {
        let document = self
            .players()
            .await
            .find_one(query)
            .await
            .map_err(|source| MongoDaoError::LoadPlayer { key, source })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn list_players(&self) -> MongoResult<Vec<PlayerEntity>> {
        let documents: Vec<MongoPlayerDocument> = self
            .players()
            .await
            .find(doc! {})
            .sort(doc! {"name": 1})
            .await
            .map_err(|source| MongoDaoError::ListPlayers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListPlayers { source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_player(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .players()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeletePlayer { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn apply_player_result(&self, result: PlayerResult) -> MongoResult<bool> {
        let update = result_update(&result);
        let outcome = self
            .players()
            .await
            .update_one(doc! {"name": result.name.as_str()}, update)
            .await
            .map_err(|source| MongoDaoError::ApplyResult {
                name: result.name.clone(),
                source,
            })?;
        Ok(outcome.matched_count > 0)
    }

    async fn record_finish(
        &self,
        entity: MatchEntity,
        results: Vec<PlayerResult>,
    ) -> MongoResult<()> {
        let id = entity.id;
        let document: MongoMatchDocument = entity.into();
        let players = self.players().await;
        let matches = self.matches().await;

        let mut session = self
            .client()
            .await
            .start_session()
            .await
            .map_err(|source| MongoDaoError::FinishTransaction { id, source })?;
        session
            .start_transaction()
            .await
            .map_err(|source| MongoDaoError::FinishTransaction { id, source })?;

        let outcome = finish_in_session(
            &mut session,
            &players,
            &matches,
            id,
            &document,
            &results,
        )
        .await;

        match outcome {
            Ok(()) => session
                .commit_transaction()
                .await
                .map_err(|source| MongoDaoError::FinishTransaction { id, source }),
            Err(source) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    warn!(match_id = %id, error = %abort_err, "failed to abort finish transaction");
                }
                Err(MongoDaoError::FinishTransaction { id, source })
            }
        }
    }
}

async fn finish_in_session(
    session: &mut ClientSession,
    players: &Collection<MongoPlayerDocument>,
    matches: &Collection<MongoMatchDocument>,
    id: Uuid,
    document: &MongoMatchDocument,
    results: &[PlayerResult],
) -> Result<(), MongoError> {
    for result in results {
        players
            .update_one(doc! {"name": result.name.as_str()}, result_update(result))
            .session(&mut *session)
            .await?;
    }

    matches
        .replace_one(doc_id(id), document)
        .upsert(true)
        .session(&mut *session)
        .await?;

    Ok(())
}

impl LeagueStore for MongoLeagueStore {
    fn save_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_match(entity).await.map_err(Into::into) })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_match(id).await.map_err(Into::into) })
    }

    fn list_matches(
        &self,
        filter: MatchFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_matches(filter).await.map_err(Into::into) })
    }

    fn delete_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_match(id).await.map_err(Into::into) })
    }

    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_player(player).await.map_err(Into::into) })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_player(player).await.map_err(Into::into) })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_player_where(id.to_string(), doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn find_player_by_name(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query = doc! {"name": name.as_str()};
            store
                .find_player_where(name, query)
                .await
                .map_err(Into::into)
        })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_players().await.map_err(Into::into) })
    }

    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_player(id).await.map_err(Into::into) })
    }

    fn apply_player_result(&self, result: PlayerResult) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.apply_player_result(result).await.map_err(Into::into) })
    }

    fn record_finish(
        &self,
        entity: MatchEntity,
        results: Vec<PlayerResult>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .record_finish(entity, results)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
