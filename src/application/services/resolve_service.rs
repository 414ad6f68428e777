//! Cache-aside resolution of short codes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheError, CacheResult, CacheService};
use crate::utils::code_generator::is_valid_code;

/// Cache entry lifetime and per-operation deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            timeout: Duration::from_millis(500),
        }
    }
}

/// A resolved code and whether the cache answered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedUrl {
    pub url: String,
    pub from_cache: bool,
}

/// Resolves codes through the cache, falling back to the store.
///
/// Cache failures never fail a request: they are logged and treated as a
/// miss. Store failures propagate.
pub struct ResolveService {
    repository: Arc<dyn UrlRepository>,
    cache: Arc<dyn CacheService>,
    settings: CacheSettings,
}

impl ResolveService {
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            settings,
        }
    }

    /// Returns the original URL for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed code, before touching
    /// the cache or the store.
    ///
    /// Returns [`AppError::NotFound`] when the store has no record.
    ///
    /// Returns [`AppError::Store`] when the store lookup fails or times out.
    pub async fn resolve(&self, code: &str) -> Result<ResolvedUrl, AppError> {
        if !is_valid_code(code) {
            return Err(AppError::bad_request(
                "Invalid short code format",
                json!({ "code": code }),
            ));
        }

        match self.cache_get(code).await {
            Ok(Some(url)) => {
                debug!(code, "Cache HIT");
                return Ok(ResolvedUrl {
                    url,
                    from_cache: true,
                });
            }
            Ok(None) => debug!(code, "Cache MISS"),
            Err(e) => warn!(code, error = %e, "Cache read failed, falling back to store"),
        }

        let record = self.repository.find_by_id(code).await?.ok_or_else(|| {
            AppError::not_found("Short URL not found", json!({ "code": code }))
        })?;

        if let Err(e) = self.cache_set(code, &record.original_url).await {
            warn!(code, error = %e, "Failed to cache URL");
        }

        Ok(ResolvedUrl {
            url: record.original_url,
            from_cache: false,
        })
    }

    async fn cache_get(&self, code: &str) -> CacheResult<Option<String>> {
        tokio::time::timeout(self.settings.timeout, self.cache.get_url(code))
            .await
            .map_err(|_| CacheError::Timeout(self.settings.timeout))?
    }

    async fn cache_set(&self, code: &str, url: &str) -> CacheResult<()> {
        tokio::time::timeout(
            self.settings.timeout,
            self.cache.set_url(code, url, self.settings.ttl),
        )
        .await
        .map_err(|_| CacheError::Timeout(self.settings.timeout))?
    }
}
