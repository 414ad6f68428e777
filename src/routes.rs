//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /api`          - Shorten a URL
//! - `GET  /api/{code}`   - Resolve a code as JSON
//! - `GET  /{code}`       - Short link redirect
//! - `GET  /health`       - Health check: store, cache, rate limiter
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client fixed window, applied to every route
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::api::routes::api_routes;
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with all routes and middleware, without path normalization.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with trailing slashes trimmed before routing.
///
/// Whether the client key comes from forwarded headers is read from
/// [`AppState::behind_proxy`].
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
