use thiserror::Error;

use crate::Collection;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given key exists in the collection.
    #[error("{collection} not found: {id}")]
    NotFound { collection: Collection, id: String },

    /// A record with the given id is already present.
    #[error("{collection} with id {id} already exists")]
    AlreadyExists { collection: Collection, id: String },

    /// Reading or writing a snapshot file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection,
            id: id.into(),
        }
    }

    pub(crate) fn already_exists(collection: Collection, id: impl Into<String>) -> Self {
        StoreError::AlreadyExists {
            collection,
            id: id.into(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
