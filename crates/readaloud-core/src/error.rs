//! Narration error taxonomy.

use std::time::Duration;

/// Errors surfaced by narration fetching, playback and navigation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NarrationError {
    /// The TTS collaborator did not answer within the bounded wait.
    #[error("Narration fetch timed out after {}s", after.as_secs())]
    FetchTimeout { after: Duration },

    /// Non-success response or malformed payload from the TTS collaborator.
    #[error("Narration fetch failed{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    FetchFailed {
        /// HTTP status, when the failure came from a response.
        status: Option<u16>,
        message: String,
    },

    /// The media resource failed to decode or play. The session is gone.
    #[error("Playback failed: {0}")]
    Playback(String),

    /// No caption matched the requested fragment.
    #[error("No caption matches \"{fragment}\"")]
    NoMatch { fragment: String },

    /// Operation requires a loaded narration session.
    #[error("No narration is loaded")]
    NotReady,

    /// Nothing left to narrate after sanitizing the input text.
    #[error("Narration text is empty")]
    EmptyText,

    /// The dedicated audio thread is gone.
    #[error("Audio thread terminated unexpectedly")]
    AudioThreadDied,

    /// The request was superseded or the player shut down before it finished.
    #[error("Narration request cancelled")]
    Cancelled,
}

impl NarrationError {
    /// Build a [`FetchFailed`](Self::FetchFailed) without a status code.
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Self::FetchFailed {
            status: None,
            message: message.into(),
        }
    }

    /// Whether re-invoking the fetch can reasonably succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchTimeout { .. } | Self::FetchFailed { .. })
    }
}
