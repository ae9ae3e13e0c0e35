//! Order placement and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use store::Repository;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::resolvers::{OrderFilter, OrderView, Resolver};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub product_ids: Vec<String>,
}

/// POST /orders — place an order for the authenticated user.
#[tracing::instrument(skip(state, ctx))]
pub async fn place<R: Repository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ctx: RequestContext<R>,
    JsonBody(req): JsonBody<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderView>), ApiError> {
    let order = Resolver::new(&state, &ctx)
        .place_order(req.product_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders — the authenticated user's orders.
#[tracing::instrument(skip(state, ctx))]
pub async fn list<R: Repository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ctx: RequestContext<R>,
    QueryParams(filter): QueryParams<OrderFilter>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    Ok(Json(Resolver::new(&state, &ctx).orders(filter).await?))
}

/// GET /orders/{id} — one of the authenticated user's orders.
#[tracing::instrument(skip(state, ctx))]
pub async fn get<R: Repository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ctx: RequestContext<R>,
    Path(id): Path<String>,
) -> Result<Json<OrderView>, ApiError> {
    Ok(Json(Resolver::new(&state, &ctx).order(&id).await?))
}
