//! Process-local URL repository.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::entities::{NewShortUrl, ShortUrl, Shortened};
use crate::domain::repositories::UrlRepository;
use crate::error::StoreError;

#[derive(Default)]
struct Tables {
    by_code: HashMap<String, ShortUrl>,
    by_url: HashMap<String, String>,
}

/// In-memory store with the same uniqueness guarantees as the `urls` table.
///
/// Both maps are updated under one lock, so create-or-get is atomic.
#[derive(Default)]
pub struct InMemoryUrlRepository {
    tables: Mutex<Tables>,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.tables.lock().by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn create_or_get(&self, new_url: NewShortUrl) -> Result<Shortened, StoreError> {
        let mut tables = self.tables.lock();

        if let Some(code) = tables.by_url.get(&new_url.original_url) {
            return Ok(Shortened::existing(code.clone()));
        }

        if tables.by_code.contains_key(&new_url.code) {
            return Err(StoreError::UniqueViolation {
                constraint: Some("urls_pkey".to_string()),
            });
        }

        let record = ShortUrl::new(
            new_url.code.clone(),
            new_url.original_url.clone(),
            Utc::now(),
            new_url.owner_id,
        );
        tables
            .by_url
            .insert(new_url.original_url, new_url.code.clone());
        tables.by_code.insert(new_url.code.clone(), record);

        Ok(Shortened::created(new_url.code))
    }

    async fn id_exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self.tables.lock().by_code.contains_key(code))
    }

    async fn find_by_id(&self, code: &str) -> Result<Option<ShortUrl>, StoreError> {
        Ok(self.tables.lock().by_code.get(code).cloned())
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<String>, StoreError> {
        Ok(self.tables.lock().by_url.get(original_url).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ShortUrl>, StoreError> {
        let mut records: Vec<ShortUrl> = self
            .tables
            .lock()
            .by_code
            .values()
            .filter(|r| r.owner_id == Some(owner_id))
            .cloned()
            .collect();

        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });
        Ok(records)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
