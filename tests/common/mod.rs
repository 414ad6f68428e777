#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, extract::ConnectInfo};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tinyurl::application::services::CacheSettings;
use tinyurl::domain::clock::{Clock, ManualClock};
use tinyurl::domain::rate_limiter::{RateLimitConfig, RateLimiter};
use tinyurl::infrastructure::cache::{CacheResult, CacheService, NullCache};
use tinyurl::infrastructure::persistence::InMemoryUrlRepository;
use tinyurl::routes::{app_router, router};
use tinyurl::state::AppState;
use tower::Layer;

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Process-local cache that counts hits, for exercising the cache-aside path
/// over HTTP.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
    pub hits: AtomicUsize,
}

impl MemoryCache {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.lock().contains_key(code)
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let value = self.entries.lock().get(short_code).cloned();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(value)
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        _ttl: Duration,
    ) -> CacheResult<()> {
        self.entries
            .lock()
            .insert(short_code.to_string(), original_url.to_string());
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub struct TestContext {
    pub state: AppState,
    pub repository: Arc<InMemoryUrlRepository>,
    pub clock: Arc<ManualClock>,
}

pub fn create_test_context(
    cache: Arc<dyn CacheService>,
    rate_limit: RateLimitConfig,
    behind_proxy: bool,
) -> TestContext {
    let repository = Arc::new(InMemoryUrlRepository::new());
    let clock = Arc::new(ManualClock::new());
    let rate_limiter = Arc::new(RateLimiter::with_clock(
        rate_limit,
        clock.clone() as Arc<dyn Clock>,
    ));

    let state = AppState::new(
        repository.clone(),
        cache,
        CacheSettings::default(),
        rate_limiter,
        behind_proxy,
    );

    TestContext {
        state,
        repository,
        clock,
    }
}

pub fn create_test_state() -> AppState {
    create_test_context(
        Arc::new(NullCache::new()),
        RateLimitConfig::new(10_000, Duration::from_secs(60)),
        false,
    )
    .state
}

pub fn test_app(state: AppState) -> Router {
    router(state).layer(MockConnectInfoLayer)
}

/// Full application stack, including trailing-slash trimming.
pub fn test_full_app(state: AppState) -> Router {
    Router::new()
        .fallback_service(app_router(state))
        .layer(MockConnectInfoLayer)
}
