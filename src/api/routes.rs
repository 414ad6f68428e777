//! API route configuration.

use crate::api::handlers::{resolve_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// JSON API routes, mounted at the root.
///
/// # Endpoints
///
/// - `POST /api`          - Shorten a URL
/// - `GET  /api/{code}`   - Resolve a code to its URL
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api", post(shorten_handler))
        .route("/api/{code}", get(resolve_handler))
}
