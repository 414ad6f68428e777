//! Business logic services for the application layer.

pub mod link_service;
pub mod resolve_service;

pub use link_service::{LinkService, MAX_URL_BYTES};
pub use resolve_service::{CacheSettings, ResolveService, ResolvedUrl};
