//! The batching loader.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, oneshot};

use crate::{BatchFn, LoaderError, Result};

type Outcome<V> = Result<Option<V>>;
type Slot<V> = Shared<BoxFuture<'static, Outcome<V>>>;

/// Tuning for a [`Loader`].
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// How long to accumulate keys after the first `load` of a window.
    pub wait: Duration,
    /// Upper bound on keys per batch. A full batch dispatches immediately
    /// and further keys start a new one.
    pub max_batch: Option<usize>,
}

impl LoaderConfig {
    /// Sets the wait window.
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Caps the number of keys per batch.
    pub fn max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = Some(max_batch);
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(1),
            max_batch: None,
        }
    }
}

/// Keys collected during the current window.
struct PendingBatch<K, V> {
    id: u64,
    keys: Vec<K>,
    waiters: HashMap<K, Vec<oneshot::Sender<Outcome<V>>>>,
}

impl<K: Eq + Hash + Clone, V> PendingBatch<K, V> {
    fn new(id: u64) -> Self {
        Self {
            id,
            keys: Vec::new(),
            waiters: HashMap::new(),
        }
    }

    fn push(&mut self, key: K, tx: oneshot::Sender<Outcome<V>>) {
        match self.waiters.entry(key) {
            Entry::Occupied(e) => e.into_mut().push(tx),
            Entry::Vacant(e) => {
                self.keys.push(e.key().clone());
                e.insert(vec![tx]);
            }
        }
    }
}

struct State<K, V> {
    cache: HashMap<K, Slot<V>>,
    pending: Option<PendingBatch<K, V>>,
    next_batch_id: u64,
}

/// Coalesces individual lookups into batch calls.
///
/// Every key gets one cache slot for the loader's lifetime: the first
/// `load(k)` registers `k` in the current batch, every later `load(k)`
/// awaits the same slot and sees the same value or error. The batch is
/// dispatched when the wait window elapses, when it reaches `max_batch`, or
/// on [`Loader::flush`]. Dispatch runs on its own task, so a batch in flight
/// completes even if the callers awaiting it go away.
///
/// Clones share state; create a fresh loader per request.
pub struct Loader<K, V, F> {
    name: &'static str,
    batch_fn: Arc<F>,
    config: LoaderConfig,
    state: Arc<Mutex<State<K, V>>>,
    batches: Arc<AtomicU64>,
}

impl<K, V, F> Clone for Loader<K, V, F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            batch_fn: Arc::clone(&self.batch_fn),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            batches: Arc::clone(&self.batches),
        }
    }
}

impl<K, V, F> Loader<K, V, F>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: BatchFn<K, V>,
{
    /// Creates a loader. `name` labels its logs and metrics.
    pub fn new(name: &'static str, batch_fn: F, config: LoaderConfig) -> Self {
        Self::with_shared(name, Arc::new(batch_fn), config)
    }

    /// Creates a loader around a batch function shared with other loaders.
    pub fn with_shared(name: &'static str, batch_fn: Arc<F>, config: LoaderConfig) -> Self {
        Self {
            name,
            batch_fn,
            config,
            state: Arc::new(Mutex::new(State {
                cache: HashMap::new(),
                pending: None,
                next_batch_id: 0,
            })),
            batches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Loads one value. `Ok(None)` means the batch ran and had no value for
    /// `key`.
    pub async fn load(&self, key: K) -> Result<Option<V>> {
        self.slot(key).await.await
    }

    /// Loads several values, aligned with `keys` (same order and length,
    /// duplicates included). Fails with the first error encountered.
    pub async fn load_many(&self, keys: &[K]) -> Result<Vec<Option<V>>> {
        // Register every key before awaiting so they share a window.
        let mut slots = Vec::with_capacity(keys.len());
        for key in keys {
            slots.push(self.slot(key.clone()).await);
        }
        future::try_join_all(slots).await
    }

    /// Seeds the cache. Returns false if `key` already had a slot.
    pub async fn prime(&self, key: K, value: V) -> bool {
        let mut state = self.state.lock().await;
        match state.cache.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                e.insert(future::ready(Ok(Some(value))).boxed().shared());
                true
            }
        }
    }

    /// Forgets the cached outcome for `key`; the next `load` fetches again.
    pub async fn clear(&self, key: &K) {
        self.state.lock().await.cache.remove(key);
    }

    /// Dispatches the current batch without waiting for the window.
    pub async fn flush(&self) {
        let batch = self.state.lock().await.pending.take();
        if let Some(batch) = batch {
            self.spawn_dispatch(batch);
        }
    }

    /// Number of batch calls this loader has made.
    pub fn batches_dispatched(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    async fn slot(&self, key: K) -> Slot<V> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if let Some(slot) = state.cache.get(&key) {
            return slot.clone();
        }

        let (tx, rx) = oneshot::channel();
        let slot = async move { rx.await.unwrap_or(Err(LoaderError::Dropped)) }
            .boxed()
            .shared();
        state.cache.insert(key.clone(), slot.clone());
        metrics::counter!("loader_keys_requested_total", "loader" => self.name).increment(1);

        let batch = state.pending.get_or_insert_with(|| {
            state.next_batch_id += 1;
            self.schedule(state.next_batch_id);
            PendingBatch::new(state.next_batch_id)
        });
        batch.push(key, tx);

        let full = self
            .config
            .max_batch
            .is_some_and(|max| batch.keys.len() >= max);
        if full && let Some(batch) = state.pending.take() {
            self.spawn_dispatch(batch);
        }

        slot
    }

    /// Dispatches batch `batch_id` once the window elapses, unless it was
    /// already dispatched early.
    fn schedule(&self, batch_id: u64) {
        let loader = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(loader.config.wait).await;
            let batch = {
                let mut state = loader.state.lock().await;
                let current = state.pending.as_ref().is_some_and(|b| b.id == batch_id);
                if current {
                    state.pending.take()
                } else {
                    None
                }
            };
            if let Some(batch) = batch {
                loader.dispatch(batch).await;
            }
        });
    }

    fn spawn_dispatch(&self, batch: PendingBatch<K, V>) {
        let loader = self.clone();
        tokio::spawn(async move { loader.dispatch(batch).await });
    }

    async fn dispatch(&self, batch: PendingBatch<K, V>) {
        let PendingBatch { id, keys, waiters } = batch;

        self.batches.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("loader_batches_dispatched_total", "loader" => self.name).increment(1);
        tracing::debug!(loader = self.name, batch = id, keys = keys.len(), "dispatching batch");

        match self.batch_fn.load(&keys).await {
            Ok(found) => {
                for (key, senders) in waiters {
                    let value = found.get(&key).cloned();
                    for tx in senders {
                        // The caller may have gone away; the outcome stays cached.
                        let _ = tx.send(Ok(value.clone()));
                    }
                }
            }
            Err(e) => {
                tracing::warn!(loader = self.name, batch = id, error = %e, "batch fetch failed");
                metrics::counter!("loader_batch_failures_total", "loader" => self.name)
                    .increment(1);
                let err = LoaderError::BatchFetchFailed(Arc::new(e));
                for tx in waiters.into_values().flatten() {
                    let _ = tx.send(Err(err.clone()));
                }
            }
        }
    }
}
