use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;
use uuid::Uuid;

use super::DUPLICATE_KEY_CODE;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save match `{id}`")]
    SaveMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load match `{id}`")]
    LoadMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list matches")]
    ListMatches {
        #[source]
        source: MongoError,
    },
    #[error("failed to delete match `{id}`")]
    DeleteMatch {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to save player `{name}`")]
    SavePlayer {
        name: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load player `{key}`")]
    LoadPlayer {
        key: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list players")]
    ListPlayers {
        #[source]
        source: MongoError,
    },
    #[error("failed to delete player `{id}`")]
    DeletePlayer {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to apply match result to player `{name}`")]
    ApplyResult {
        name: String,
        #[source]
        source: MongoError,
    },
    #[error("finish transaction for match `{id}` failed")]
    FinishTransaction {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("stored document `{id}` is malformed: {reason}")]
    MalformedDocument { id: String, reason: String },
}

impl MongoDaoError {
    fn source_error(&self) -> Option<&MongoError> {
        match self {
            MongoDaoError::InvalidUri { source, .. }
            | MongoDaoError::ClientConstruction { source }
            | MongoDaoError::InitialPing { source, .. }
            | MongoDaoError::HealthPing { source }
            | MongoDaoError::EnsureIndex { source, .. }
            | MongoDaoError::SaveMatch { source, .. }
            | MongoDaoError::LoadMatch { source, .. }
            | MongoDaoError::ListMatches { source }
            | MongoDaoError::DeleteMatch { source, .. }
            | MongoDaoError::SavePlayer { source, .. }
            | MongoDaoError::LoadPlayer { source, .. }
            | MongoDaoError::ListPlayers { source }
            | MongoDaoError::DeletePlayer { source, .. }
            | MongoDaoError::ApplyResult { source, .. }
            | MongoDaoError::FinishTransaction { source, .. } => Some(source),
            MongoDaoError::MalformedDocument { .. } => None,
        }
    }

    /// Whether the server rejected the write because of a unique index.
    pub fn is_duplicate_key(&self) -> bool {
        self.source_error().is_some_and(|source| {
            matches!(
                source.kind.as_ref(),
                ErrorKind::Write(WriteFailure::WriteError(write))
                    if write.code == DUPLICATE_KEY_CODE
            )
        })
    }
}
