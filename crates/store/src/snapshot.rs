//! Periodic JSON snapshots of the store.
//!
//! Each collection lives in its own human-readable file (`users.json`,
//! `products.json`, `orders.json`) holding an object keyed by record id.
//! Files are rewritten wholesale on every tick.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::memory::{Collections, seed_users};
use crate::{Collection, InMemoryStore, Result};

/// Shortest period the persistence task will tick at.
pub const MIN_PERSIST_INTERVAL: Duration = Duration::from_millis(1);

/// Where and how often the store persists itself.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub persist_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("store").join("data"),
            persist_interval: Duration::from_secs(1),
        }
    }
}

/// Outcome of one snapshot pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    pub written: Vec<Collection>,
    pub failed: Vec<Collection>,
}

impl SnapshotReport {
    /// Returns true when every collection was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl InMemoryStore {
    /// Opens a store from the snapshot files in `config.data_dir`.
    ///
    /// A missing or unreadable file leaves that collection empty. If no
    /// users were loaded, the seed users are created in memory; they reach
    /// disk on the next snapshot.
    #[tracing::instrument(skip(config), fields(data_dir = %config.data_dir.display()))]
    pub async fn open(config: &StoreConfig) -> Self {
        let dir = &config.data_dir;
        let mut collections = Collections {
            users: load_or_empty(dir, Collection::Users).await,
            products: load_or_empty(dir, Collection::Products).await,
            orders: load_or_empty(dir, Collection::Orders).await,
        };

        if collections.users.is_empty() {
            tracing::info!("no users loaded, seeding default accounts");
            collections.users = seed_users();
        }

        tracing::info!(
            users = collections.users.len(),
            products = collections.products.len(),
            orders = collections.orders.len(),
            "store opened"
        );

        Self::from_collections(collections)
    }

    /// Writes every collection to `dir` once.
    ///
    /// The maps are serialized under one read lock so the three files
    /// describe the same instant; the lock is released before any file I/O.
    /// A failure on one collection is logged and does not stop the others.
    pub async fn persist_now(&self, dir: &Path) -> SnapshotReport {
        let encoded = {
            let state = self.inner.read().await;
            [
                (Collection::Users, encode(&state.users)),
                (Collection::Products, encode(&state.products)),
                (Collection::Orders, encode(&state.orders)),
            ]
        };

        let mut report = SnapshotReport::default();

        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::error!(error = %e, dir = %dir.display(), "failed to create data directory");
            for collection in Collection::ALL {
                metrics::counter!(
                    "store_snapshot_failures_total",
                    "collection" => collection.as_str()
                )
                .increment(1);
                report.failed.push(collection);
            }
            return report;
        }

        for (collection, bytes) in encoded {
            let result = match bytes {
                Ok(bytes) => write_atomic(&dir.join(collection.file_name()), &bytes).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    metrics::counter!(
                        "store_snapshot_writes_total",
                        "collection" => collection.as_str()
                    )
                    .increment(1);
                    report.written.push(collection);
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        collection = collection.as_str(),
                        "failed to write snapshot"
                    );
                    metrics::counter!(
                        "store_snapshot_failures_total",
                        "collection" => collection.as_str()
                    )
                    .increment(1);
                    report.failed.push(collection);
                }
            }
        }

        report
    }

    /// Starts the background task that snapshots the store every
    /// `config.persist_interval` until `shutdown` is cancelled.
    ///
    /// On cancellation the task writes one last snapshot before exiting.
    /// Intervals shorter than [`MIN_PERSIST_INTERVAL`] are raised to it.
    pub fn spawn_persistence(
        &self,
        config: StoreConfig,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let period = config.persist_interval.max(MIN_PERSIST_INTERVAL);
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = shutdown.cancelled() => {
                        tracing::info!("persistence stopping, writing final snapshot");
                        store.persist_now(&config.data_dir).await;
                        break;
                    }
                    _ = ticker.tick() => {
                        let report = store.persist_now(&config.data_dir).await;
                        tracing::trace!(
                            written = report.written.len(),
                            failed = report.failed.len(),
                            "snapshot tick"
                        );
                    }
                }
            }
        })
    }
}

fn encode<T: Serialize>(map: &HashMap<String, T>) -> Result<Vec<u8>> {
    // Sorted keys keep the files diffable.
    let sorted: BTreeMap<&String, &T> = map.iter().collect();
    Ok(serde_json::to_vec_pretty(&sorted)?)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn load_collection<T: DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn load_or_empty<T: DeserializeOwned>(
    dir: &Path,
    collection: Collection,
) -> HashMap<String, T> {
    let path = dir.join(collection.file_name());
    match load_collection(&path).await {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "could not load snapshot, starting with an empty collection"
            );
            HashMap::new()
        }
    }
}
