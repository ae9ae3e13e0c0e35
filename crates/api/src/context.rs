//! Per-request context: the caller's identity and a fresh set of loaders.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use common::Role;
use domain::TokenService;
use store::Repository;

use crate::error::ApiError;
use crate::loaders::Loaders;
use crate::state::AppState;

/// Who is making the request, taken from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

/// Everything a resolver needs that is scoped to one request.
pub struct RequestContext<R> {
    pub identity: Option<Identity>,
    pub loaders: Loaders<R>,
}

impl<R> Clone for RequestContext<R> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            loaders: self.loaders.clone(),
        }
    }
}

impl<R> std::fmt::Debug for RequestContext<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl<R: Repository + Clone + 'static> RequestContext<R> {
    pub fn new(identity: Option<Identity>, state: &AppState<R>) -> Self {
        Self {
            identity,
            loaders: Loaders::new(state.query.clone(), &state.loader_config),
        }
    }
}

/// Middleware attaching a new [`RequestContext`] to every request.
///
/// A missing or invalid bearer token leaves the request anonymous; guards
/// reject it later if the operation needs an identity.
pub async fn attach<R: Repository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = bearer_token(request.headers()).and_then(|token| {
        match state.tokens.verify(token) {
            Ok(claims) => Some(Identity {
                user_id: claims.sub,
                role: claims.role,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring invalid bearer token");
                None
            }
        }
    });

    let ctx = RequestContext::new(identity, &state);
    request.extensions_mut().insert(ctx);
    next.run(request).await
}

fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S, R> FromRequestParts<S> for RequestContext<R>
where
    S: Send + Sync,
    R: Repository + Clone + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext<R>>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!(uri = %parts.uri, "request context was not attached");
                ApiError::MissingContext
            })
    }
}
