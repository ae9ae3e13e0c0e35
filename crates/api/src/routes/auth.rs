//! Login and identity endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use store::Repository;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::resolvers::{AuthPayload, Resolver, UserView};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login — exchange credentials for tokens.
#[tracing::instrument(skip_all)]
pub async fn login<R: Repository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ctx: RequestContext<R>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthPayload>, ApiError> {
    let payload = Resolver::new(&state, &ctx)
        .login(req.email, req.password)
        .await?;
    Ok(Json(payload))
}

/// GET /me — the authenticated user.
#[tracing::instrument(skip(state))]
pub async fn me<R: Repository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ctx: RequestContext<R>,
) -> Result<Json<UserView>, ApiError> {
    Ok(Json(Resolver::new(&state, &ctx).me().await?))
}
