//! API Route Configuration

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{auth_middleware, logging_middleware, rate_limit_middleware};

/// Default in-flight request cap
pub const DEFAULT_MAX_CONCURRENT: usize = 256;

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    create_router_with_limit(state, DEFAULT_MAX_CONCURRENT)
}

pub fn create_router_with_limit(state: Arc<AppState>, max_concurrent: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health & Status
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        // Transaction Analysis
        .route("/analyze", post(handlers::analyze_transaction))
        .route("/explain", post(handlers::explain_response))
        .route("/analyze/batch", post(handlers::batch_analyze));

    Router::new()
        .nest("/v1", api_v1)
        .route("/health", get(handlers::health_check))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state.clone())
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
        .layer(ConcurrencyLimitLayer::new(max_concurrent.max(1)))
}
