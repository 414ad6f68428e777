//! URL store implementations.
//!
//! # Repositories
//!
//! - [`PgUrlRepository`] - PostgreSQL-backed store with per-operation deadlines
//! - [`InMemoryUrlRepository`] - Process-local store for tests and local runs

pub mod memory_url_repository;
pub mod pg_url_repository;

pub use memory_url_repository::InMemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
