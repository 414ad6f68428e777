//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic.
//!
//! # Entity Types
//!
//! - [`ShortUrl`] - A persisted code ↔ URL mapping
//! - [`NewShortUrl`] - Input for creating a mapping
//! - [`Shortened`] - Outcome of a shorten request (`code`, `is_new`)

pub mod short_url;

pub use short_url::{NewShortUrl, ShortUrl, Shortened};
