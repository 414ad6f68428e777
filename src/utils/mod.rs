//! Utility functions for code generation and URL processing.
//!
//! - [`code_generator`] - Short code generation and format validation
//! - [`url_normalizer`] - URL normalization and syntax validation

pub mod code_generator;
pub mod url_normalizer;
