//! Storage error types

use thiserror::Error;

/// Preference storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings
    #[error("Storage file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The backend refused the write
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
