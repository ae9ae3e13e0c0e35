//! Batch function trait.

use std::collections::HashMap;

use async_trait::async_trait;

/// Fetches many values in one call.
///
/// Implementations return the values they found keyed by their key. Keys
/// absent from the map resolve to `None` for their callers; only an `Err`
/// fails the batch.
#[async_trait]
pub trait BatchFn<K, V>: Send + Sync + 'static {
    /// Error produced when the whole batch fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads the values for `keys`. Keys are distinct.
    async fn load(&self, keys: &[K]) -> Result<HashMap<K, V>, Self::Error>;
}
