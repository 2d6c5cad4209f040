//! Error types for aircon-state

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening or preparing a store backend
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Database query error
    #[error("Database query failed: {0}")]
    Query(String),

    /// Local filesystem error while preparing a store
    #[error("Store path {path} unusable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<surrealdb::Error> for StateError {
    fn from(err: surrealdb::Error) -> Self {
        StateError::Query(err.to_string())
    }
}

/// Errors returned by [`crate::CaseStore`] operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific failure (query rejected, connection dropped, ...)
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Filesystem failure on a file-backed store
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A case entry could not be encoded
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store cannot be reached at all
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A store call exceeded its deadline
    #[error("store operation timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}

/// Errors produced when parsing record fields from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("timing must be 24h HH:MM, got {value:?}")]
    InvalidTiming { value: String },

    #[error("movement must be Yes or No, got {value:?}")]
    InvalidMovement { value: String },
}
