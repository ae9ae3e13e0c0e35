//! HTTP API server for the storefront backend.
//!
//! Exposes product, order and auth endpoints backed by request-scoped
//! loaders, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod guard;
pub mod loaders;
pub mod resolvers;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use domain::JwtTokenService;
use metrics_exporter_prometheus::PrometheusHandle;
use store::Repository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// Every request except `/health` and `/metrics` gets its own
/// [`context::RequestContext`] before reaching a handler.
pub fn create_app<R: Repository + Clone + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api_router = Router::new()
        .route("/auth/login", post(routes::auth::login::<R>))
        .route("/me", get(routes::auth::me::<R>))
        .route(
            "/products",
            get(routes::products::list::<R>).post(routes::products::create::<R>),
        )
        .route(
            "/products/{id}",
            get(routes::products::get::<R>).patch(routes::products::update::<R>),
        )
        .route(
            "/orders",
            get(routes::orders::list::<R>).post(routes::orders::place::<R>),
        )
        .route("/orders/{id}", get(routes::orders::get::<R>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            context::attach::<R>,
        ))
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::check))
        .merge(api_router)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around `store` using `config`'s secret
/// and loader tuning.
pub fn create_state<R: Repository + Clone + 'static>(
    store: R,
    config: &Config,
) -> Arc<AppState<R>> {
    let tokens = Arc::new(JwtTokenService::new(config.jwt_secret.as_bytes()));
    Arc::new(AppState::new(store, tokens, config.loader_config()))
}
