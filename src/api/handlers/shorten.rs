//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the short code for a URL, creating it on first sight.
///
/// # Endpoint
///
/// `POST /api`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/page" }
/// ```
///
/// # Response
///
/// - **201 Created** when a new code was assigned
/// - **200 OK** when the URL was already shortened
///
/// ```json
/// {
///   "message": "URL shortened successfully",
///   "short_code": "aB3xYz"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for a malformed body or URL.
/// Returns 500 when no free code is found or the store fails, 504 when the
/// store times out.
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| {
        AppError::bad_request("Invalid request body", json!({ "reason": e.body_text() }))
    })?;
    payload.validate()?;

    let shortened = state.link_service.shorten(&payload.url, None).await?;

    let (status, message) = if shortened.is_new {
        (StatusCode::CREATED, "URL shortened successfully")
    } else {
        (
            StatusCode::OK,
            "URL already exists, returning existing short code",
        )
    };

    Ok((
        status,
        Json(ShortenResponse {
            message: message.to_string(),
            short_code: shortened.code,
        }),
    ))
}
