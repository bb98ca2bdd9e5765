//! Error types for shelf persistence

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing the shelf file
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the shelf file
    #[error("Failed to read shelf file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the shelf file
    #[error("Failed to write shelf file at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid shelf document
    ///
    /// Covers malformed JSON as well as documents that break a shelf
    /// invariant, such as a cursor past the end of its list.
    #[error("Failed to parse shelf file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to serialize the shelf
    #[error("Failed to serialize shelf: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to create the directory holding the shelf file
    #[error("Failed to create shelf directory at {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to copy the previous shelf file aside
    #[error("Failed to backup shelf file to {path}: {source}")]
    Backup {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The shelf path has no parent directory to write into
    #[error("Invalid shelf path {path}: {reason}")]
    PathResolution { path: PathBuf, reason: String },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
