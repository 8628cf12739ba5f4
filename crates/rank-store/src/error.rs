//! Error types for rank-store.

use thiserror::Error;

use crate::Collection;

/// Errors that can occur while reading or writing entity documents.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} document {id} already exists")]
    Duplicate { collection: Collection, id: u64 },

    #[error("{collection} key {key:?} is already taken")]
    DuplicateKey { collection: Collection, key: String },

    #[error("document (de)serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("seed parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("entity store lock poisoned")]
    LockPoisoned,

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;
