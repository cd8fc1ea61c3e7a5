use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::warn;

use super::error::{MongoDaoError, MongoResult};

/// Probes before giving up; the storage supervisor retries on a slower cadence.
const HANDSHAKE_ATTEMPTS: u32 = 3;
const HANDSHAKE_DELAY: Duration = Duration::from_millis(500);

/// Build a client and wait until the server answers `hello`.
///
/// Logs a warning when the server is not part of a replica set, since finishing
/// a match then fails at commit time.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempts = 0;
    let reply = loop {
        match database.run_command(doc! { "hello": 1 }).await {
            Ok(reply) => break reply,
            Err(source) => {
                attempts += 1;
                if attempts >= HANDSHAKE_ATTEMPTS {
                    return Err(MongoDaoError::InitialPing { attempts, source });
                }
                sleep(HANDSHAKE_DELAY * attempts).await;
            }
        }
    };

    if reply.get_str("setName").is_err() {
        warn!(
            database = database_name,
            "MongoDB is not running as a replica set; finishing matches will fail"
        );
    }

    Ok((client, database))
}
