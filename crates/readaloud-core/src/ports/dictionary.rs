//! Dictionary lookup port: word in, opaque definition payload out.

use async_trait::async_trait;

/// Dictionary collaborator failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DictionaryError {
    #[error("Dictionary lookup failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Dictionary unreachable: {0}")]
    Unreachable(String),
}

/// Resolves a word to its definition payload.
///
/// The payload shape belongs to the reading view, so it is passed through
/// as JSON.
#[async_trait]
pub trait DictionaryLookup: Send + Sync {
    async fn lookup(&self, word: &str) -> Result<serde_json::Value, DictionaryError>;
}
