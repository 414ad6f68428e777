//! Error taxonomy for the store layer and the HTTP boundary.
//!
//! [`StoreError`] is what repositories return. Its [`StoreError::UniqueViolation`]
//! variant is the only one the shorten loop treats as "collision, retry";
//! every other variant aborts the request.
//!
//! [`AppError`] is what services and handlers return. It renders as a JSON body
//! of the form `{"error": {"code", "message", "details"}}`.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::error;

/// Errors surfaced by [`crate::domain::repositories::UrlRepository`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An insert hit a unique constraint: either the code is taken or a
    /// concurrent request committed the same original URL first.
    #[error("unique constraint violation{}", on_constraint(.constraint))]
    UniqueViolation { constraint: Option<String> },

    #[error("store operation exceeded its {0:?} deadline")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// Returns `true` when the failure is a code or URL collision that a fresh
    /// candidate code may resolve.
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

fn on_constraint(constraint: &Option<String>) -> String {
    constraint
        .as_deref()
        .map(|c| format!(" on {c}"))
        .unwrap_or_default()
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return Self::UniqueViolation {
                constraint: db.constraint().map(str::to_string),
            };
        }

        Self::Database(e)
    }
}

/// Error payload nested under `"error"` in every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Request-boundary error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed URL or short code. Never retried, never logged as a failure.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The code has no mapping. An expected outcome.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// No free code was found within the attempt budget.
    #[error("failed to generate a unique short code after {attempts} attempts")]
    IdGenerationExhausted { attempts: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Admission control rejected the request.
    #[error("rate limit exceeded")]
    RateLimited { limit: u32, window: Duration },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Store(StoreError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::IdGenerationExhausted { .. } | Self::Store(_) | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converts the error into its serializable payload.
    ///
    /// Store details are not exposed to clients.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            Self::Validation { message, details } => ErrorInfo {
                code: "validation_error",
                message: message.clone(),
                details: details.clone(),
            },
            Self::NotFound { message, details } => ErrorInfo {
                code: "not_found",
                message: message.clone(),
                details: details.clone(),
            },
            Self::IdGenerationExhausted { attempts } => ErrorInfo {
                code: "id_generation_failed",
                message: "Service temporarily unavailable".to_string(),
                details: json!({ "attempts": attempts }),
            },
            Self::Store(StoreError::Timeout(_)) => ErrorInfo {
                code: "store_timeout",
                message: "Database operation timed out".to_string(),
                details: json!({}),
            },
            Self::Store(_) => ErrorInfo {
                code: "store_error",
                message: "Database error".to_string(),
                details: json!({}),
            },
            Self::RateLimited { limit, window } => ErrorInfo {
                code: "rate_limit_exceeded",
                message: "Rate limit exceeded".to_string(),
                details: json!({
                    "limit": limit,
                    "window_seconds": window.as_secs(),
                    "retry_after": window.as_secs(),
                }),
            },
            Self::Internal { message, details } => ErrorInfo {
                code: "internal_error",
                message: message.clone(),
                details: details.clone(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::IdGenerationExhausted { attempts } => {
                error!(attempts, "Short code space exhausted for this request");
            }
            Self::Store(e) => error!(error = %e, "Store failure"),
            Self::Internal { message, details } => {
                error!(%message, %details, "Internal error");
            }
            Self::Validation { .. } | Self::NotFound { .. } | Self::RateLimited { .. } => {}
        }

        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };
        let mut response = (status, Json(body)).into_response();

        if let Self::RateLimited { limit, window } = self {
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
            if let Ok(value) = HeaderValue::from_str(&format!("{}s", window.as_secs())) {
                headers.insert("x-ratelimit-window", value);
            }
            headers.insert(header::RETRY_AFTER, HeaderValue::from(window.as_secs()));
        }

        response
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request("Invalid request", json!({ "fields": e.to_string() }))
    }
}
