//! Route definitions for the relay API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check))
        // Chat-completion-compatible endpoints
        .nest("/v1", completion_routes())
        // Admin endpoints
        .nest("/admin", admin_routes())
        // Apply middleware
        .layer(TraceLayer::new_for_http())
        // Add state
        .with_state(state)
}

/// Chat-completion-compatible API routes
fn completion_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/completions", post(handlers::chat_completion))
        .route("/models", get(handlers::list_models))
}

/// Admin/management routes
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/pool", get(handlers::pool_occupancy))
        .route("/stats", get(handlers::relay_stats))
}
