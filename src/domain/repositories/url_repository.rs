//! Repository trait for the canonical short URL mapping.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{NewShortUrl, ShortUrl, Shortened};
use crate::error::StoreError;

/// Store contract owning the code → URL and URL → code mappings.
///
/// Uniqueness of both `code` and `original_url` is enforced by the store
/// itself, never by a caller's check-then-insert.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - process-local implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Atomically returns the existing code for `new_url.original_url`, or
    /// inserts `new_url` and returns its code.
    ///
    /// When a record already exists the candidate code is discarded and the
    /// result has `is_new == false`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniqueViolation`] when the insert loses a race on
    /// either the code or the URL. Callers retry with a fresh candidate.
    ///
    /// Returns [`StoreError::Timeout`] or [`StoreError::Database`] on
    /// transport or transaction failures.
    async fn create_or_get(&self, new_url: NewShortUrl) -> Result<Shortened, StoreError>;

    /// Returns whether a record with this code exists.
    ///
    /// Advisory only: a concurrent writer may claim the code right after.
    async fn id_exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Finds a record by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ShortUrl))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, code: &str) -> Result<Option<ShortUrl>, StoreError>;

    /// Finds the code assigned to an original URL.
    async fn find_by_original_url(&self, original_url: &str)
    -> Result<Option<String>, StoreError>;

    /// Lists every record created by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ShortUrl>, StoreError>;

    /// Checks if the store is reachable.
    async fn health_check(&self) -> bool;
}
