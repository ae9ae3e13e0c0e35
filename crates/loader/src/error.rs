//! Loader error types.

use std::sync::Arc;

use thiserror::Error;

/// Errors delivered to callers waiting on a loader.
///
/// Cloneable so one failure can be handed to every caller of a batch.
#[derive(Debug, Clone, Error)]
pub enum LoaderError {
    /// The batch function failed; every key in that batch gets this error.
    #[error("Batch fetch failed: {0}")]
    BatchFetchFailed(Arc<dyn std::error::Error + Send + Sync>),

    /// The batch was dropped before it produced a result.
    #[error("Batch was dropped before completing")]
    Dropped,
}

/// Convenience type alias for loader results.
pub type Result<T> = std::result::Result<T, LoaderError>;
