//! Handler for the JSON resolve endpoint.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::api::dto::shorten::ResolveResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Response header reporting whether the cache answered the lookup.
pub const CACHE_HIT_HEADER: &str = "cache-hit";

/// Returns the original URL for a short code as JSON.
///
/// # Endpoint
///
/// `GET /api/{code}`
///
/// # Response
///
/// ```json
/// {
///   "message": "URL retrieved successfully",
///   "url": "https://example.com/page"
/// }
/// ```
///
/// The `Cache-Hit` header is `true` when the URL came from the cache.
///
/// # Errors
///
/// Returns 400 Bad Request for a malformed code.
/// Returns 404 Not Found if the code doesn't exist.
pub async fn resolve_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let resolved = state.resolve_service.resolve(&code).await?;

    let cache_hit = if resolved.from_cache { "true" } else { "false" };

    Ok((
        [(CACHE_HIT_HEADER, cache_hit)],
        Json(ResolveResponse {
            message: "URL retrieved successfully".to_string(),
            url: resolved.url,
        }),
    ))
}
