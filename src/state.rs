//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{CacheSettings, LinkService, ResolveService};
use crate::domain::rate_limiter::RateLimiter;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::CacheService;

/// Services and shared components, cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub resolve_service: Arc<ResolveService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub repository: Arc<dyn UrlRepository>,
    pub cache: Arc<dyn CacheService>,
    pub cache_settings: CacheSettings,
    /// Derive the rate-limit client key from forwarded headers.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires the services on top of a store, a cache and a limiter.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
        cache_settings: CacheSettings,
        rate_limiter: Arc<RateLimiter>,
        behind_proxy: bool,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(repository.clone()));
        let resolve_service = Arc::new(ResolveService::new(
            repository.clone(),
            cache.clone(),
            cache_settings,
        ));

        Self {
            link_service,
            resolve_service,
            rate_limiter,
            repository,
            cache,
            cache_settings,
            behind_proxy,
        }
    }
}
