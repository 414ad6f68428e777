//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::{NewShortUrl, ShortUrl, Shortened};
use crate::domain::repositories::UrlRepository;
use crate::error::StoreError;

/// PostgreSQL repository for the `urls` table.
///
/// Every operation runs under a single deadline. Uniqueness of `id` and
/// `original_url` is enforced by table constraints.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool and a
    /// per-operation deadline.
    pub fn new(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn with_deadline<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn create_or_get(&self, new_url: NewShortUrl) -> Result<Shortened, StoreError> {
        self.with_deadline(async {
            let mut tx = self.pool.begin().await?;

            let existing: Option<String> =
                sqlx::query_scalar("SELECT id FROM urls WHERE original_url = $1")
                    .bind(&new_url.original_url)
                    .fetch_optional(&mut *tx)
                    .await?;

            if let Some(code) = existing {
                tx.commit().await?;
                info!(code = %code, "URL already shortened");
                return Ok(Shortened::existing(code));
            }

            let code: String = sqlx::query_scalar(
                r#"
                INSERT INTO urls (id, original_url, user_id)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(&new_url.code)
            .bind(&new_url.original_url)
            .bind(new_url.owner_id)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            info!(code = %code, "Short URL created");
            Ok(Shortened::created(code))
        })
        .await
    }

    async fn id_exists(&self, code: &str) -> Result<bool, StoreError> {
        self.with_deadline(async {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE id = $1")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;
            Ok(count > 0)
        })
        .await
    }

    async fn find_by_id(&self, code: &str) -> Result<Option<ShortUrl>, StoreError> {
        self.with_deadline(async {
            let row = sqlx::query_as::<_, ShortUrl>(
                r#"
                SELECT id, original_url, created_at, user_id
                FROM urls
                WHERE id = $1
                "#,
            )
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

            debug!(code, found = row.is_some(), "Store lookup");
            Ok(row)
        })
        .await
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<String>, StoreError> {
        self.with_deadline(async {
            let code = sqlx::query_scalar("SELECT id FROM urls WHERE original_url = $1")
                .bind(original_url)
                .fetch_optional(self.pool.as_ref())
                .await?;
            Ok(code)
        })
        .await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ShortUrl>, StoreError> {
        self.with_deadline(async {
            let rows = sqlx::query_as::<_, ShortUrl>(
                r#"
                SELECT id, original_url, created_at, user_id
                FROM urls
                WHERE user_id = $1
                ORDER BY created_at DESC, id
                "#,
            )
            .bind(owner_id)
            .fetch_all(self.pool.as_ref())
            .await?;
            Ok(rows)
        })
        .await
    }

    async fn health_check(&self) -> bool {
        self.with_deadline(async {
            sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
            Ok(())
        })
        .await
        .is_ok()
    }
}
