//! Error types for smartinv-store.
//!
//! These errors never reach the dashboard: [`CacheStore::read`] and
//! [`CacheStore::write`] log and absorb them. They are only visible through
//! the `try_*` methods.
//!
//! [`CacheStore::read`]: crate::CacheStore::read
//! [`CacheStore::write`]: crate::CacheStore::write

use std::path::PathBuf;

/// Result type for smartinv-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in smartinv-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stored value could not be encoded or decoded.
    #[error("Serialization error for {key}: {source}")]
    Serialization {
        key: String,
        source: serde_json::Error,
    },

    /// Stored timestamp is not RFC 3339.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
