//! Error types for the Lectern server client.

use lectern_playback::PlayerError;
use thiserror::Error;

/// Errors that can occur when talking to a Lectern server.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ClientError {
    /// Classify a transport error so stalls surface as timeouts.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Request(err)
        }
    }
}

impl From<ClientError> for PlayerError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Timeout => PlayerError::Timeout,
            ClientError::Server { status, .. } => PlayerError::HttpStatus(status),
            ClientError::Request(e) if e.is_timeout() => PlayerError::Timeout,
            other => PlayerError::Network(other.to_string()),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
