//! Error types for the local storage crate.

use thiserror::Error;

use dragonbane_core::{Error, LocalError};

/// Result type alias for key-value operations.
pub type Result<T> = std::result::Result<T, LocalStoreError>;

#[derive(Debug, Error)]
pub enum LocalStoreError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error on write
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Value would exceed the store's quota
    #[error("quota exceeded writing '{key}' ({size} bytes, quota {quota} bytes)")]
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },

    /// Key cannot be mapped onto the medium
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

impl From<LocalStoreError> for Error {
    fn from(err: LocalStoreError) -> Self {
        match err {
            LocalStoreError::Io(e) => Error::Local(LocalError::Io(e.to_string())),
            LocalStoreError::Json(e) => Error::Serialization(e),
            LocalStoreError::QuotaExceeded { key, size, quota } => {
                Error::Local(LocalError::QuotaExceeded { key, size, quota })
            }
            LocalStoreError::InvalidKey(key) => Error::Local(LocalError::InvalidKey(key)),
        }
    }
}
