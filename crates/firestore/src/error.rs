//! Error types for the Firestore crate.

use thiserror::Error;

use dragonbane_core::{Error as CoreError, RemoteError};

/// Result type alias for Firestore operations.
pub type Result<T> = std::result::Result<T, FirestoreError>;

/// Errors that can occur talking to the document database.
#[derive(Debug, Error)]
pub enum FirestoreError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API error response from the backend
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid request (bad identifier, empty project, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Document is missing fields every record must carry
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Authentication error (unusable token)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The client or collection handle was never built
    #[error("Firestore is not configured")]
    NotConfigured,
}

impl FirestoreError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an invalid document error
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument(message.into())
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

impl From<FirestoreError> for CoreError {
    fn from(err: FirestoreError) -> Self {
        let remote = match err {
            FirestoreError::Http(e) => RemoteError::Transport(e.to_string()),
            FirestoreError::Json(e) => RemoteError::MalformedResponse(e.to_string()),
            FirestoreError::Api { status, message } => RemoteError::Api { status, message },
            FirestoreError::InvalidDocument(message) => RemoteError::MalformedResponse(message),
            FirestoreError::Auth(message) => RemoteError::Api {
                status: 401,
                message,
            },
            FirestoreError::NotConfigured => RemoteError::NotConfigured,
            FirestoreError::InvalidRequest(message) => return CoreError::InvalidInput(message),
        };
        CoreError::Remote(remote)
    }
}
