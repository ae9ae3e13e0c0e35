//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use loader::LoaderConfig;
use store::StoreConfig;

/// Signing secret used when `JWT_SECRET` is unset. Only fit for development.
pub const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8080`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATA_DIR` — snapshot directory (default: `"store/data"`)
/// - `PERSIST_INTERVAL_MS` — snapshot period, must be positive (default: `1000`)
/// - `JWT_SECRET` — token signing secret (default: [`DEFAULT_JWT_SECRET`])
/// - `LOADER_WAIT_MS` — loader batching window (default: `1`)
/// - `LOADER_MAX_BATCH` — keys per loader batch (default: unbounded)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub data_dir: PathBuf,
    pub persist_interval: Duration,
    pub jwt_secret: String,
    pub loader_wait: Duration,
    pub loader_max_batch: Option<usize>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };
        let persist_interval = lookup("PERSIST_INTERVAL_MS")
            .and_then(|v| v.parse().ok())
            .filter(|ms: &u64| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.persist_interval);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            persist_interval,
            jwt_secret: lookup("JWT_SECRET")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.jwt_secret),
            loader_wait: millis("LOADER_WAIT_MS", defaults.loader_wait),
            loader_max_batch: lookup("LOADER_MAX_BATCH")
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when tokens are signed with the built-in development secret.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            data_dir: self.data_dir.clone(),
            persist_interval: self.persist_interval,
        }
    }

    pub fn loader_config(&self) -> LoaderConfig {
        let config = LoaderConfig::default().wait(self.loader_wait);
        match self.loader_max_batch {
            Some(max) => config.max_batch(max),
            None => config,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            data_dir: store.data_dir,
            persist_interval: store.persist_interval,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            loader_wait: Duration::from_millis(1),
            loader_max_batch: None,
        }
    }
}
