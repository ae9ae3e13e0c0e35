//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use store::Repository;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::resolvers::{
    CreateProductInput, ProductFilter, ProductView, Resolver, UpdateProductInput,
};
use crate::state::AppState;

/// GET /products — paginated listing with optional category filter.
#[tracing::instrument(skip(state, ctx))]
pub async fn list<R: Repository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ctx: RequestContext<R>,
    QueryParams(filter): QueryParams<ProductFilter>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    Ok(Json(Resolver::new(&state, &ctx).products(filter).await?))
}

/// GET /products/{id} — a single product.
#[tracing::instrument(skip(state, ctx))]
pub async fn get<R: Repository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ctx: RequestContext<R>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(Resolver::new(&state, &ctx).product(&id).await?))
}

/// POST /products — create a product (admin only).
#[tracing::instrument(skip(state, ctx))]
pub async fn create<R: Repository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ctx: RequestContext<R>,
    JsonBody(input): JsonBody<CreateProductInput>,
) -> Result<(StatusCode, Json<ProductView>), ApiError> {
    let product = Resolver::new(&state, &ctx).create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PATCH /products/{id} — update the provided fields (admin only).
#[tracing::instrument(skip(state, ctx))]
pub async fn update<R: Repository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    ctx: RequestContext<R>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateProductInput>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(
        Resolver::new(&state, &ctx).update_product(id, input).await?,
    ))
}
