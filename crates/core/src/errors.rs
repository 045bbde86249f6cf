//! Error types shared by every persistence backend.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error crossing crate boundaries.
#[derive(Debug, Error)]
pub enum Error {
    /// Remote document database failure (absorbed by the facade)
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    /// Local key-value storage failure (never absorbed)
    #[error("Local store error: {0}")]
    Local(#[from] LocalError),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller supplied data that no backend would accept
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// True when the failure came from the remote backend.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Failures of the remote document database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The remote handle was never constructed
    #[error("remote backend is not configured")]
    NotConfigured,

    /// Network or client-level failure before a response was read
    #[error("transport failure: {0}")]
    Transport(String),

    /// Non-success reply from the backend
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Reply could not be mapped onto a record
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the local storage medium.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("quota exceeded writing '{key}' ({size} bytes, quota {quota} bytes)")]
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}
