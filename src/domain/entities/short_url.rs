//! Short URL entity: the canonical code ↔ URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted short URL record.
///
/// Records are immutable once created: the code is never reused, changed or
/// deleted, and each distinct `original_url` has at most one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ShortUrl {
    #[sqlx(rename = "id")]
    pub code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "user_id")]
    pub owner_id: Option<Uuid>,
}

impl ShortUrl {
    /// Creates a new ShortUrl instance.
    pub fn new(
        code: String,
        original_url: String,
        created_at: DateTime<Utc>,
        owner_id: Option<Uuid>,
    ) -> Self {
        Self {
            code,
            original_url,
            created_at,
            owner_id,
        }
    }

    /// Returns true if the record was created anonymously.
    pub fn is_anonymous(&self) -> bool {
        self.owner_id.is_none()
    }
}

/// Input data for a create-or-get call.
///
/// `code` is a candidate: it is discarded if the URL already has a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortUrl {
    pub code: String,
    pub original_url: String,
    pub owner_id: Option<Uuid>,
}

/// Result of a shorten request: the canonical code and whether this call created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortened {
    pub code: String,
    pub is_new: bool,
}

impl Shortened {
    pub fn created(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            is_new: true,
        }
    }

    pub fn existing(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            is_new: false,
        }
    }
}
