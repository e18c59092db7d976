//! Pronunciation clip client.
//!
//! Single words or short phrases are voiced by a separate endpoint that
//! answers with raw audio bytes rather than the JSON narration envelope.

use readaloud_core::NarrationAudio;
use reqwest::header::CONTENT_TYPE;

use crate::config::TtsClientConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::narration::{failure_from, http_client};
use crate::wire::{ClipRequest, DEFAULT_CONTENT_TYPE};

/// Longest clip text the endpoint accepts, in characters.
pub const MAX_CLIP_CHARS: usize = 200;

/// Client for the pronunciation clip endpoint.
pub struct ClipClient {
    client: reqwest::Client,
    config: TtsClientConfig,
}

impl ClipClient {
    pub fn new(config: TtsClientConfig) -> RemoteResult<Self> {
        Ok(Self {
            client: http_client(&config)?,
            config,
        })
    }

    /// Fetch the pronunciation of `text` at an optional `speed`.
    ///
    /// Input is trimmed; blank or over-long text is rejected before any
    /// request is made.
    pub async fn fetch_clip(&self, text: &str, speed: Option<f32>) -> RemoteResult<NarrationAudio> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RemoteError::InvalidInput("clip text is empty".to_string()));
        }
        let chars = text.chars().count();
        if chars > MAX_CLIP_CHARS {
            return Err(RemoteError::InvalidInput(format!(
                "clip text is {chars} characters, limit is {MAX_CLIP_CHARS}"
            )));
        }

        let url = self.config.endpoint(&self.config.clip_path);
        tracing::debug!(%url, text, ?speed, "Requesting pronunciation clip");

        let response = self
            .client
            .post(&url)
            .timeout(self.config.timeout)
            .json(&ClipRequest { text, speed })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure_from(response).await);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(RemoteError::InvalidResponse {
                message: "clip response is empty".to_string(),
            });
        }

        Ok(NarrationAudio {
            bytes,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_text() {
        let client = ClipClient::new(TtsClientConfig::new()).unwrap();
        let err = tokio_test::block_on(client.fetch_clip("   ", None)).unwrap_err();
        assert!(matches!(err, RemoteError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_overlong_text() {
        let client = ClipClient::new(TtsClientConfig::new()).unwrap();
        let text = "가".repeat(MAX_CLIP_CHARS + 1);
        let err = tokio_test::block_on(client.fetch_clip(&text, Some(1.0))).unwrap_err();
        assert!(matches!(err, RemoteError::InvalidInput(ref m) if m.contains("201")));
    }
}
