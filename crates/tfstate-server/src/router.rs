use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::handler::{self, AppState};

pub mod paths {
    pub const STATE: &str = "/";
    pub const LOCK: &str = "/lock";
    pub const UNLOCK: &str = "/unlock";
    pub const HEALTH: &str = "/health";
}

/// Build the router with all backend endpoints and the default body limit.
pub fn build_router(state: AppState) -> Router {
    build_router_with_limit(state, DEFAULT_MAX_BODY_BYTES)
}

pub fn build_router_with_limit(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(paths::STATE, any(handler::state_handler))
        .route(paths::LOCK, any(handler::lock_handler))
        .route(paths::UNLOCK, any(handler::unlock_handler))
        .route(paths::HEALTH, get(handler::health_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
