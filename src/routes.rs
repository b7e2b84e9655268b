//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /r/{slug}`    - Weighted redirect (public)
//! - `GET  /health`      - Health check: storage, click queue (public)
//! - `/api/*`            - Split management REST API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/api` (optional)
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::rate_limit::ApiRateLimitLayer;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with all routes and per-route middleware.
///
/// `rate_limit` is applied to the `/api` routes only, so redirects are
/// never throttled.
pub fn router(state: AppState, rate_limit: Option<ApiRateLimitLayer>) -> Router {
    let api_router = match rate_limit {
        Some(layer) => api::routes::api_routes().layer(layer),
        None => api::routes::api_routes(),
    };

    Router::new()
        .route("/r/{slug}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application service: [`router`] plus trailing-slash
/// normalization, which must wrap the router to run before routing.
pub fn app_router(
    state: AppState,
    rate_limit: Option<ApiRateLimitLayer>,
) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, rate_limit))
}
