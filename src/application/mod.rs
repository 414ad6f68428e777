//! Application layer services implementing business logic.
//!
//! Services consume the repository and cache traits and expose the
//! operations HTTP handlers and the admin CLI call.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Shorten orchestration and owner listing
//! - [`services::resolve_service::ResolveService`] - Cache-aside code resolution

pub mod services;
