//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use loader::LoaderError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain logic error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A loader batch failed.
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// The request body or query string could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// The per-request context was never attached.
    #[error("request context is missing")]
    MissingContext,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %self, "internal server error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(err) => domain_error_status(err),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Loader(_) | ApiError::MissingContext => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn domain_error_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::AlreadyExists(_) => StatusCode::CONFLICT,
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::InvalidCredentials | DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden { .. } => StatusCode::FORBIDDEN,
        DomainError::Token(_) | DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Role;
    use std::sync::Arc;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (DomainError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DomainError::AlreadyExists("x".into()), StatusCode::CONFLICT),
            (DomainError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (DomainError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                DomainError::Forbidden {
                    required: Role::Admin,
                },
                StatusCode::FORBIDDEN,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn loader_failure_is_internal() {
        let source: Arc<dyn std::error::Error + Send + Sync> =
            Arc::new(std::io::Error::other("disk"));
        let err = ApiError::from(LoaderError::BatchFetchFailed(source));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
