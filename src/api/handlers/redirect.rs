//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use super::resolve::CACHE_HIT_HEADER;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Validate the code format
/// 2. Check cache for URL (cache key: `url:<code>`)
/// 3. On cache miss or cache error, query the store
/// 4. Write the URL back to the cache (best effort)
/// 5. Return 307 Temporary Redirect
///
/// # Errors
///
/// Returns 400 Bad Request for a malformed code.
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let resolved = state.resolve_service.resolve(&code).await?;

    let cache_hit = if resolved.from_cache { "true" } else { "false" };

    Ok((
        [(CACHE_HIT_HEADER, cache_hit)],
        Redirect::temporary(&resolved.url),
    ))
}
