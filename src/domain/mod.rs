//! Domain layer containing business entities and logic.
//!
//! Entities, repository interfaces and the admission-control primitives live
//! here, independent of infrastructure and presentation concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`clock`] - Injectable monotonic time source
//! - [`rate_limiter`] - Fixed-window per-client request limiter
//! - [`sweeper`] - Background eviction of expired limiter buckets
//!
//! # Request Flow
//!
//! 1. Every request passes [`rate_limiter::RateLimiter::admit`] first
//! 2. Shorten requests go through [`crate::application::services::LinkService`],
//!    which generates candidates and calls [`repositories::UrlRepository::create_or_get`]
//! 3. Resolve requests go through [`crate::application::services::ResolveService`],
//!    which reads the cache and falls back to the repository

pub mod clock;
pub mod entities;
pub mod rate_limiter;
pub mod repositories;
pub mod sweeper;
