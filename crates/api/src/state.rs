//! Shared application state.

use std::sync::Arc;

use domain::{CommandService, JwtTokenService, QueryService};
use loader::LoaderConfig;
use store::Repository;

/// Shared application state accessible from all handlers.
///
/// Holds no per-request data; loaders are created per request from
/// `loader_config`.
pub struct AppState<R> {
    pub query: QueryService<R>,
    pub commands: CommandService<R>,
    pub tokens: Arc<JwtTokenService>,
    pub loader_config: LoaderConfig,
}

impl<R: Repository + Clone> AppState<R> {
    pub fn new(store: R, tokens: Arc<JwtTokenService>, loader_config: LoaderConfig) -> Self {
        Self {
            query: QueryService::new(store.clone()),
            commands: CommandService::new(store, Arc::clone(&tokens)),
            tokens,
            loader_config,
        }
    }
}
