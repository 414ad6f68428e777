//! Fixed-window, per-client request rate limiter.
//!
//! Each client key owns a bucket holding a request count and the instant its
//! window ends. A client's window starts at its first request (or its first
//! request after the previous window ended), so clients are not aligned to a
//! shared wall-clock boundary.
//!
//! # State per client
//!
//! ```text
//! unseen ──first request──► active (count < limit)
//!                             │
//!                             ▼ count reaches limit
//!                           saturated ──window ends──► active (count = 1)
//! ```
//!
//! The bucket table is guarded by one mutex. [`RateLimiter::admit`] and
//! [`RateLimiter::sweep`] hold it only for O(1) / O(n) CPU work and never
//! across I/O.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};

/// Per-client bookkeeping for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBucket {
    pub count: u32,
    /// Exclusive upper bound of the window.
    pub window_reset_at: Instant,
}

impl RateBucket {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.window_reset_at
    }
}

/// Limiter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests admitted per client per window.
    pub limit: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}

/// Fixed-window counter keyed by client identity.
///
/// Construct once at startup, share behind an `Arc`, and pair with
/// [`crate::domain::sweeper::spawn_sweeper`] to bound memory.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, RateBucket>>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter driven by the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a limiter with a custom [`Clock`].
    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// Records a request from `client_key` and decides whether to admit it.
    ///
    /// - No bucket, or the bucket's window has ended: start a new window with
    ///   `count = 1` and admit.
    /// - `count < limit`: increment and admit.
    /// - Otherwise deny. Denials neither increment the count nor extend the window.
    pub fn admit(&self, client_key: &str) -> bool {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock();

        match buckets.get_mut(client_key) {
            Some(bucket) if !bucket.is_expired(now) => {
                if bucket.count < self.config.limit {
                    bucket.count += 1;
                    true
                } else {
                    false
                }
            }
            Some(bucket) => {
                *bucket = self.fresh_bucket(now);
                true
            }
            None => {
                buckets.insert(client_key.to_string(), self.fresh_bucket(now));
                true
            }
        }
    }

    /// Removes every bucket whose window has already ended.
    ///
    /// Returns the number of buckets removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock();
        let before = buckets.len();
        buckets.retain(|_, bucket| !bucket.is_expired(now));
        before - buckets.len()
    }

    /// Number of clients currently holding a bucket.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().len()
    }

    /// Snapshot of one client's bucket.
    pub fn bucket(&self, client_key: &str) -> Option<RateBucket> {
        self.buckets.lock().get(client_key).copied()
    }

    pub fn limit(&self) -> u32 {
        self.config.limit
    }

    pub fn window(&self) -> Duration {
        self.config.window
    }

    fn fresh_bucket(&self, now: Instant) -> RateBucket {
        RateBucket {
            count: 1,
            window_reset_at: now + self.config.window,
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("tracked_clients", &self.tracked_clients())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;

    fn limiter(limit: u32, window: Duration) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::with_clock(RateLimitConfig::new(limit, window), clock.clone());
        (limiter, clock)
    }

    #[test]
    fn test_first_request_creates_bucket() {
        let (rl, clock) = limiter(5, Duration::from_secs(60));

        assert!(rl.admit("192.168.1.1"));

        let bucket = rl.bucket("192.168.1.1").unwrap();
        assert_eq!(bucket.count, 1);
        assert_eq!(bucket.window_reset_at, clock.now() + Duration::from_secs(60));
    }

    #[test]
    fn test_denies_after_limit_within_window() {
        let (rl, _clock) = limiter(5, Duration::from_secs(60));

        for i in 0..5 {
            assert!(rl.admit("192.168.1.1"), "request {} should be admitted", i + 1);
        }
        assert!(!rl.admit("192.168.1.1"));
    }

    #[test]
    fn test_limit_two_window_one_second() {
        let (rl, clock) = limiter(2, Duration::from_secs(1));

        assert!(rl.admit("client"));
        assert!(rl.admit("client"));

        clock.advance(Duration::from_millis(500));
        assert!(!rl.admit("client"));

        clock.advance(Duration::from_millis(500));
        assert!(rl.admit("client"));
        assert_eq!(rl.bucket("client").unwrap().count, 1);
    }

    #[test]
    fn test_denial_does_not_increment_or_extend_window() {
        let (rl, clock) = limiter(1, Duration::from_secs(10));

        assert!(rl.admit("client"));
        let before = rl.bucket("client").unwrap();

        clock.advance(Duration::from_secs(3));
        assert!(!rl.admit("client"));
        assert!(!rl.admit("client"));

        let after = rl.bucket("client").unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_window_is_relative_to_first_request() {
        let (rl, clock) = limiter(1, Duration::from_secs(10));

        assert!(rl.admit("a"));
        clock.advance(Duration::from_secs(6));
        assert!(rl.admit("b"));

        clock.advance(Duration::from_secs(4));
        assert!(rl.admit("a"));
        assert!(!rl.admit("b"));
    }

    #[test]
    fn test_clients_are_independent() {
        let (rl, _clock) = limiter(3, Duration::from_secs(60));

        for _ in 0..3 {
            assert!(rl.admit("192.168.1.1"));
            assert!(rl.admit("192.168.1.2"));
            assert!(rl.admit("192.168.1.3"));
        }

        assert!(!rl.admit("192.168.1.1"));
        assert!(!rl.admit("192.168.1.2"));
        assert!(!rl.admit("192.168.1.3"));
    }

    #[test]
    fn test_sweep_removes_only_expired_buckets() {
        let (rl, clock) = limiter(10, Duration::from_secs(1));

        rl.admit("old");
        clock.advance(Duration::from_millis(600));
        rl.admit("recent");
        assert_eq!(rl.tracked_clients(), 2);

        clock.advance(Duration::from_millis(400));
        assert_eq!(rl.sweep(), 1);
        assert_eq!(rl.tracked_clients(), 1);
        assert!(rl.bucket("old").is_none());
        assert!(rl.bucket("recent").is_some());

        clock.advance(Duration::from_secs(1));
        assert_eq!(rl.sweep(), 1);
        assert_eq!(rl.tracked_clients(), 0);
    }

    #[test]
    fn test_concurrent_admits_never_exceed_limit() {
        let rl = Arc::new(RateLimiter::new(RateLimitConfig::new(
            50,
            Duration::from_secs(3600),
        )));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let rl = rl.clone();
                std::thread::spawn(move || (0..25).filter(|_| rl.admit("shared")).count())
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
        assert_eq!(rl.bucket("shared").unwrap().count, 50);
    }
}
