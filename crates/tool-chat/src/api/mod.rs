//! HTTP API: chat plus tool administration.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{logging_middleware, rate_limit_middleware, RateLimitState};
pub use types::*;

use crate::orchestrator::ChatOrchestrator;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tools::ToolRegistryGateway;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ToolRegistryGateway>,
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Model name reported by `/health`
    pub model: Arc<str>,
}

impl AppState {
    pub fn new(
        gateway: Arc<ToolRegistryGateway>,
        orchestrator: ChatOrchestrator,
        model: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            gateway,
            orchestrator: Arc::new(orchestrator),
            model: model.into(),
        }
    }
}

/// Create the API router with custom rate limiting.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/chat", post(handlers::chat))
        .route("/api/tools", get(handlers::list_tools))
        .route("/api/tools/:name/enable", post(handlers::enable_tool))
        .route("/api/tools/:name/disable", post(handlers::disable_tool))
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
