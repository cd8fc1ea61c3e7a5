//! Application-level configuration loading: listening port and storage backend.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::DEFAULT_EVENTS_CAPACITY;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BABYFOOT_BACK_CONFIG_PATH";
const DEFAULT_PORT: u16 = 8085;
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";

/// Where league data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local maps, lost on restart.
    Memory,
    /// MongoDB, supervised in the background.
    Mongo,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "mongo" | "mongodb" => Some(Self::Mongo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    pub port: u16,
    pub storage: StorageBackend,
    pub mongo_uri: String,
    /// Database name, `babyfoot` when absent.
    pub mongo_database: Option<String>,
    /// Capacity of the SSE broadcast channel.
    pub events_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage: if cfg!(feature = "mongo-store") {
                StorageBackend::Mongo
            } else {
                StorageBackend::Memory
            },
            mongo_uri: DEFAULT_MONGO_URI.into(),
            mongo_database: None,
            events_capacity: DEFAULT_EVENTS_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Load the configuration file, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    fn load_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration file");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Override fields from `PORT`, `BABYFOOT_STORAGE`, `MONGO_URI` and `MONGO_DB`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("PORT") {
            match value.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => warn!(%value, "ignoring invalid PORT"),
            }
        }
        if let Some(value) = lookup("BABYFOOT_STORAGE") {
            match StorageBackend::parse(&value) {
                Some(storage) => self.storage = storage,
                None => warn!(%value, "ignoring unknown BABYFOOT_STORAGE"),
            }
        }
        if let Some(uri) = lookup("MONGO_URI").filter(|uri| !uri.is_empty()) {
            self.mongo_uri = uri;
        }
        if let Some(name) = lookup("MONGO_DB").filter(|name| !name.is_empty()) {
            self.mongo_database = Some(name);
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"storage":"memory","eventsCapacity":8}"#).unwrap();
        assert_eq!(config.port, 8085);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.events_capacity, 8);
        assert_eq!(config.mongo_uri, DEFAULT_MONGO_URI);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = AppConfig::default();
        config.apply_overrides(lookup(&[
            ("PORT", "9000"),
            ("BABYFOOT_STORAGE", "Memory"),
            ("MONGO_URI", "mongodb://db:27017"),
            ("MONGO_DB", "league"),
        ]));

        assert_eq!(config.port, 9000);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.mongo_uri, "mongodb://db:27017");
        assert_eq!(config.mongo_database.as_deref(), Some("league"));
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(lookup(&[("PORT", "eighty"), ("BABYFOOT_STORAGE", "redis")]));
        assert_eq!(config, AppConfig::default());
    }
}
