//! Core error type.
//!
//! Downstream crates define their own error enums and wrap `CoreError` as one
//! variant where they need it.

use thiserror::Error;

/// Errors produced by `rank-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `rank-core`.
pub type CoreResult<T> = Result<T, CoreError>;
