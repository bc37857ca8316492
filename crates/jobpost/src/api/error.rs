//! REST client error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by a [`JobsApi`](super::JobsApi) implementation.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server could not be reached or the connection broke mid-request.
    #[error("Request failed: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    ///
    /// `details` carries field-scoped messages in the order the server sent them.
    #[error("Server rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        details: Vec<(String, String)>,
    },

    /// The response body was not what the endpoint promises.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A staged file could not be read while building an upload.
    #[error("Failed to read attachment '{path}': {source}")]
    ReadAttachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// A rejection that names individual fields, i.e. a validation failure.
    pub fn is_field_rejection(&self) -> bool {
        matches!(
            self,
            ApiError::Rejected { status, details, .. }
                if (400..500).contains(status) && !details.is_empty()
        )
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
