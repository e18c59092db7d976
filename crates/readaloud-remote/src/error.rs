//! Internal error types for remote collaborator calls.
//!
//! These errors are internal to `readaloud-remote` and are mapped to the
//! core narration taxonomy at the port boundary.

use readaloud_core::{DictionaryError, NarrationError};
use thiserror::Error;

/// Result type alias for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors related to the TTS, clip and dictionary endpoints.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Endpoint answered with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// Server-provided error message, or a generic one
        message: String,
    },

    /// Endpoint answered 2xx with a payload we cannot use.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Caller input rejected before dispatch.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The local synthesis command failed.
    #[error("Synthesis command failed: {0}")]
    Command(String),

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Audio payload was not valid base64.
    #[error("Audio payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Scratch file IO.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RemoteError> for NarrationError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::RequestFailed { status, message } => Self::FetchFailed {
                status: Some(status),
                message,
            },
            RemoteError::Network(e) => Self::FetchFailed {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            other => Self::fetch_failed(other.to_string()),
        }
    }
}

impl From<RemoteError> for DictionaryError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::RequestFailed { status, message } => Self::RequestFailed { status, message },
            other => Self::Unreachable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_maps_status() {
        let err: NarrationError = RemoteError::RequestFailed {
            status: 500,
            message: "Python TTS call failed".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            NarrationError::FetchFailed { status: Some(500), ref message } if message == "Python TTS call failed"
        ));
    }

    #[test]
    fn test_invalid_response_maps_to_fetch_failed() {
        let err: NarrationError = RemoteError::InvalidResponse {
            message: "missing audio".to_string(),
        }
        .into();
        assert!(matches!(err, NarrationError::FetchFailed { status: None, .. }));
        assert!(err.to_string().contains("missing audio"));
    }

    #[test]
    fn test_dictionary_mapping() {
        let err: DictionaryError = RemoteError::RequestFailed {
            status: 404,
            message: "no entry".to_string(),
        }
        .into();
        assert!(matches!(err, DictionaryError::RequestFailed { status: 404, .. }));

        let err: DictionaryError = RemoteError::Command("boom".to_string()).into();
        assert!(matches!(err, DictionaryError::Unreachable(_)));
    }
}
