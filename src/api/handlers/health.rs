//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: The database is reachable. `status` is `degraded` when only
///   the cache is down, since requests still succeed without it.
/// - **503 Service Unavailable**: The database is unreachable
///
/// # Components Checked
///
/// 1. **Database**: Runs `SELECT 1` under the store deadline
/// 2. **Cache**: Tests Redis PING under the cache deadline (always ok when
///    caching is disabled)
/// 3. **Rate limiter**: Reports the number of tracked clients
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "cache": { "status": "ok", "message": "Cache reachable" },
///     "rate_limiter": { "status": "ok", "message": "Tracking 3 clients (100 per 60s)" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = if state.repository.health_check().await {
        CheckStatus::ok("Connected")
    } else {
        CheckStatus::error("Database unreachable")
    };

    let cache_reachable =
        tokio::time::timeout(state.cache_settings.timeout, state.cache.health_check())
            .await
            .unwrap_or(false);

    let cache = if cache_reachable {
        CheckStatus::ok("Cache reachable")
    } else {
        CheckStatus::error("Cache unreachable")
    };

    let limiter = &state.rate_limiter;
    let rate_limiter = CheckStatus::ok(format!(
        "Tracking {} clients ({} per {}s)",
        limiter.tracked_clients(),
        limiter.limit(),
        limiter.window().as_secs()
    ));

    let serving = database.is_ok();
    let status = match (serving, cache.is_ok()) {
        (true, true) => "healthy",
        (true, false) => "degraded",
        (false, _) => "unhealthy",
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            cache,
            rate_limiter,
        },
    };

    if serving {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
