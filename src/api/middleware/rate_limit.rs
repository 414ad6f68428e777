//! Per-client fixed-window rate limiting middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Admits or rejects a request before any handler logic runs.
///
/// # Limits
///
/// Configured by `RATE_LIMIT_REQUESTS` per `RATE_LIMIT_WINDOW_SECONDS`
/// (default 100 per 60s) per client.
///
/// # Key Extraction
///
/// The client key is the peer IP address. When `behind_proxy` is set, the
/// first `X-Forwarded-For` entry or `X-Real-IP` is used instead.
///
/// # Errors
///
/// Returns `429 Too Many Requests` with `X-RateLimit-Limit`,
/// `X-RateLimit-Window` and `Retry-After` headers.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/api", post(shorten_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_key = client_key(req.headers(), peer, st.behind_proxy);

    if !st.rate_limiter.admit(&client_key) {
        warn!(
            client = %client_key,
            path = %req.uri().path(),
            "Rate limit exceeded"
        );
        return Err(AppError::RateLimited {
            limit: st.rate_limiter.limit(),
            window: st.rate_limiter.window(),
        });
    }

    Ok(next.run(req).await)
}

/// Derives the rate-limit key for a request.
///
/// Falls back to `"unknown"` when no address is available, so such requests
/// share one bucket.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy && let Some(forwarded) = forwarded_ip(headers) {
        return forwarded;
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let from_forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let from_real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    from_forwarded_for.or_else(from_real_ip).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("203.0.113.7:51234".parse().unwrap())
    }

    #[test]
    fn test_client_key_uses_peer_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.1"));

        assert_eq!(client_key(&headers, peer(), false), "203.0.113.7");
    }

    #[test]
    fn test_client_key_behind_proxy_prefers_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.1, 10.0.0.2"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.9"));

        assert_eq!(client_key(&headers, peer(), true), "198.51.100.1");
    }

    #[test]
    fn test_client_key_behind_proxy_falls_back_to_real_ip_then_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.9"));
        assert_eq!(client_key(&headers, peer(), true), "198.51.100.9");

        assert_eq!(client_key(&HeaderMap::new(), peer(), true), "203.0.113.7");
    }

    #[test]
    fn test_client_key_without_address() {
        assert_eq!(client_key(&HeaderMap::new(), None, false), "unknown");
    }
}
