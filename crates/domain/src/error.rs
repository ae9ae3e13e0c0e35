//! Domain error types.

use common::Role;
use store::StoreError;
use thiserror::Error;

use crate::token::TokenError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested record does not exist, or is not visible to the caller.
    #[error("{0}")]
    NotFound(String),

    /// A record with the same id already exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// The request was rejected before touching the store.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown email or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No authenticated identity is attached to the request.
    #[error("Unauthorized")]
    Unauthorized,

    /// The identity lacks the role the operation requires.
    #[error("User does not have the required role: {required}")]
    Forbidden { required: Role },

    /// Issuing or verifying a token failed.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Store failure other than a missing or duplicate key.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => DomainError::NotFound(e.to_string()),
            StoreError::AlreadyExists { .. } => DomainError::AlreadyExists(e.to_string()),
            other => DomainError::Store(other),
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
