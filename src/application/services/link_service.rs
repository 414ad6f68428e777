//! Short URL creation and owner listing service.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::{NewShortUrl, ShortUrl, Shortened};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::code_generator::generate_code;
use crate::utils::url_normalizer::normalize_url;

/// Number of candidate codes tried before a shorten request gives up.
pub const MAX_ID_GENERATION_ATTEMPTS: usize = 10;

/// Longest normalized URL accepted, in bytes.
///
/// Keeps every stored URL inside the row size the `original_url` unique
/// index can hold. Normalization percent-encodes non-ASCII input, so this is
/// checked after [`normalize_url`] rather than on the raw request.
pub const MAX_URL_BYTES: usize = 2048;

/// Service for creating shortened URLs.
///
/// Handles URL normalization, code generation and deduplication. The
/// `id_exists` pre-check only avoids wasted transactions; uniqueness rests on
/// the store's constraints and the retry loop in [`Self::shorten`].
pub struct LinkService {
    repository: Arc<dyn UrlRepository>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(repository: Arc<dyn UrlRepository>) -> Self {
        Self { repository }
    }

    /// Returns the canonical code for `url`, creating it if needed.
    ///
    /// # Code Generation
    ///
    /// Up to [`MAX_ID_GENERATION_ATTEMPTS`] candidates are drawn. A candidate
    /// that already exists, or whose insert hits a unique constraint, is
    /// discarded and the next one is tried.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for empty or malformed URLs, or when the
    /// normalized URL exceeds [`MAX_URL_BYTES`], before any store access.
    ///
    /// Returns [`AppError::IdGenerationExhausted`] when every attempt collided.
    ///
    /// Returns [`AppError::Store`] on any other store failure, without retrying.
    ///
    /// Returns [`AppError::Internal`] if the entropy source is unavailable.
    pub async fn shorten(&self, url: &str, owner_id: Option<Uuid>) -> Result<Shortened, AppError> {
        if url.trim().is_empty() {
            return Err(AppError::bad_request(
                "URL is required",
                json!({ "field": "url" }),
            ));
        }

        let original_url = normalize_url(url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if original_url.len() > MAX_URL_BYTES {
            return Err(AppError::bad_request(
                "URL is too long",
                json!({ "max_bytes": MAX_URL_BYTES, "bytes": original_url.len() }),
            ));
        }

        for attempt in 1..=MAX_ID_GENERATION_ATTEMPTS {
            let code = generate_code().map_err(|e| {
                AppError::internal(
                    "Entropy source unavailable",
                    json!({ "reason": e.to_string() }),
                )
            })?;

            if self.repository.id_exists(&code).await? {
                warn!(attempt, code = %code, "Generated code already taken");
                continue;
            }

            let new_url = NewShortUrl {
                code,
                original_url: original_url.clone(),
                owner_id,
            };

            match self.repository.create_or_get(new_url).await {
                Ok(shortened) => return Ok(shortened),
                Err(e) if e.is_collision() => {
                    warn!(attempt, error = %e, "Insert collided, retrying with a fresh code");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::IdGenerationExhausted {
            attempts: MAX_ID_GENERATION_ATTEMPTS,
        })
    }

    /// Lists every record created by `owner_id`, newest first.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ShortUrl>, AppError> {
        Ok(self.repository.list_by_owner(owner_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::error::StoreError;
    use crate::utils::code_generator::is_valid_code;
    use chrono::Utc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shorten_creates_new_code() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo
            .expect_id_exists()
            .times(1)
            .returning(|_| Ok(false));

        mock_repo
            .expect_create_or_get()
            .withf(|new_url| {
                new_url.original_url == "https://example.com/path"
                    && is_valid_code(&new_url.code)
                    && new_url.owner_id.is_none()
            })
            .times(1)
            .returning(|new_url| Ok(Shortened::created(new_url.code)));

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service.shorten("example.com/path", None).await.unwrap();

        assert!(result.is_new);
        assert!(is_valid_code(&result.code));
    }

    #[tokio::test]
    async fn test_shorten_returns_existing_code() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo.expect_id_exists().returning(|_| Ok(false));
        mock_repo
            .expect_create_or_get()
            .times(1)
            .returning(|_| Ok(Shortened::existing("abc123")));

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service
            .shorten("https://example.com/", None)
            .await
            .unwrap();

        assert_eq!(result, Shortened::existing("abc123"));
    }

    #[tokio::test]
    async fn test_shorten_passes_owner() {
        let owner = Uuid::new_v4();
        let mut mock_repo = MockUrlRepository::new();

        mock_repo.expect_id_exists().returning(|_| Ok(false));
        mock_repo
            .expect_create_or_get()
            .withf(move |new_url| new_url.owner_id == Some(owner))
            .times(1)
            .returning(|new_url| Ok(Shortened::created(new_url.code)));

        let service = LinkService::new(Arc::new(mock_repo));

        assert!(service.shorten("https://example.com/", Some(owner)).await.is_ok());
    }

    #[tokio::test]
    async fn test_shorten_rejects_invalid_input_without_store_access() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo.expect_id_exists().times(0);
        mock_repo.expect_create_or_get().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        for input in ["", "   ", "not a valid url", "http://"] {
            let err = service.shorten(input, None).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{input:?}");
        }
    }

    #[tokio::test]
    async fn test_shorten_rejects_oversized_url_after_encoding() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo.expect_id_exists().times(0);
        mock_repo.expect_create_or_get().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        // 1000 characters pass a character count but encode to 6000 bytes.
        let url = format!("https://example.com/{}", "ж".repeat(1000));

        let err = service.shorten(&url, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_shorten_accepts_url_at_byte_limit() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo.expect_id_exists().returning(|_| Ok(false));
        mock_repo
            .expect_create_or_get()
            .withf(|new_url| new_url.original_url.len() == MAX_URL_BYTES)
            .times(1)
            .returning(|new_url| Ok(Shortened::created(new_url.code)));

        let service = LinkService::new(Arc::new(mock_repo));

        let prefix = "https://example.com/";
        let url = format!("{prefix}{}", "a".repeat(MAX_URL_BYTES - prefix.len()));

        assert!(service.shorten(&url, None).await.unwrap().is_new);
    }

    #[tokio::test]
    async fn test_shorten_skips_taken_codes() {
        let mut mock_repo = MockUrlRepository::new();
        let mut seq = mockall::Sequence::new();

        mock_repo
            .expect_id_exists()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock_repo
            .expect_id_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        mock_repo
            .expect_create_or_get()
            .times(1)
            .returning(|new_url| Ok(Shortened::created(new_url.code)));

        let service = LinkService::new(Arc::new(mock_repo));

        assert!(service.shorten("https://example.com/", None).await.unwrap().is_new);
    }

    #[tokio::test]
    async fn test_shorten_retries_on_unique_violation() {
        let mut mock_repo = MockUrlRepository::new();
        let mut seq = mockall::Sequence::new();

        mock_repo.expect_id_exists().returning(|_| Ok(false));
        mock_repo
            .expect_create_or_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(StoreError::UniqueViolation {
                    constraint: Some("urls_original_url_key".to_string()),
                })
            });
        mock_repo
            .expect_create_or_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Shortened::existing("Win123")));

        let service = LinkService::new(Arc::new(mock_repo));

        let result = service.shorten("https://example.com/", None).await.unwrap();
        assert_eq!(result, Shortened::existing("Win123"));
    }

    #[tokio::test]
    async fn test_shorten_exhausts_attempts() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo
            .expect_id_exists()
            .times(MAX_ID_GENERATION_ATTEMPTS)
            .returning(|_| Ok(true));
        mock_repo.expect_create_or_get().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        let err = service
            .shorten("https://example.com/", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::IdGenerationExhausted {
                attempts: MAX_ID_GENERATION_ATTEMPTS
            }
        ));
    }

    #[tokio::test]
    async fn test_shorten_does_not_retry_store_failures() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo.expect_id_exists().times(1).returning(|_| Ok(false));
        mock_repo
            .expect_create_or_get()
            .times(1)
            .returning(|_| Err(StoreError::Timeout(Duration::from_secs(5))));

        let service = LinkService::new(Arc::new(mock_repo));

        let err = service
            .shorten("https://example.com/", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_shorten_propagates_pre_check_failure() {
        let mut mock_repo = MockUrlRepository::new();

        mock_repo
            .expect_id_exists()
            .times(1)
            .returning(|_| Err(StoreError::Database(sqlx::Error::PoolClosed)));
        mock_repo.expect_create_or_get().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        let err = service
            .shorten("https://example.com/", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Database(_))));
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let owner = Uuid::new_v4();
        let mut mock_repo = MockUrlRepository::new();

        mock_repo
            .expect_list_by_owner()
            .withf(move |id| *id == owner)
            .times(1)
            .returning(move |_| {
                Ok(vec![ShortUrl::new(
                    "abc123".to_string(),
                    "https://example.com/".to_string(),
                    Utc::now(),
                    Some(owner),
                )])
            });

        let service = LinkService::new(Arc::new(mock_repo));

        let records = service.list_by_owner(owner).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "abc123");
    }
}
