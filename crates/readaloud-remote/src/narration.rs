//! HTTP narration source backed by the article TTS endpoint.

use async_trait::async_trait;
use readaloud_core::text::{sanitize_for_speech, truncate_chars};
use readaloud_core::{Narration, NarrationError, NarrationSource};

use crate::config::TtsClientConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::wire::{ErrorBody, NarrationRequest, NarrationResponse};

/// Sanitize and cap narration input.
///
/// Fails with [`NarrationError::EmptyText`] when nothing speakable is left.
pub fn prepare_text(text: &str, max_chars: usize) -> Result<String, NarrationError> {
    let sanitized = sanitize_for_speech(text);
    if sanitized.is_empty() {
        return Err(NarrationError::EmptyText);
    }
    let capped = truncate_chars(&sanitized, max_chars);
    if capped.len() < sanitized.len() {
        tracing::warn!(
            original_chars = sanitized.chars().count(),
            max_chars,
            "Narration text truncated"
        );
    }
    tracing::debug!(
        raw_len = text.len(),
        sanitized_len = capped.len(),
        "Prepared narration text"
    );
    Ok(capped.to_string())
}

/// Build the shared reqwest client.
pub(crate) fn http_client(config: &TtsClientConfig) -> RemoteResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .build()?)
}

/// Read `{ "error": "..." }` from a failed response, falling back to a
/// generic message.
pub(crate) async fn failure_from(response: reqwest::Response) -> RemoteError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .map_or_else(|_| format!("request failed ({status})"), |body| body.error);
    RemoteError::RequestFailed { status, message }
}

/// Narration source backed by the article TTS endpoint.
///
/// The bounded wait is enforced around the whole request (connect, upload,
/// response body), so a stalled stream times out just like a slow server.
pub struct NarrationClient {
    client: reqwest::Client,
    config: TtsClientConfig,
}

impl NarrationClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: TtsClientConfig) -> RemoteResult<Self> {
        Ok(Self {
            client: http_client(&config)?,
            config,
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &TtsClientConfig {
        &self.config
    }

    async fn request(&self, text: &str, voice: &str) -> RemoteResult<Narration> {
        let url = self.config.endpoint(&self.config.narration_path);
        tracing::debug!(%url, voice, chars = text.chars().count(), "Requesting narration");

        let response = self
            .client
            .post(&url)
            .json(&NarrationRequest { text, voice })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure_from(response).await);
        }

        let body: NarrationResponse = response.json().await?;
        let narration = body.into_narration()?;
        tracing::info!(
            captions = narration.captions.len(),
            audio_bytes = narration.audio.bytes.len(),
            duration = narration.duration_hint,
            "Narration received"
        );
        Ok(narration)
    }
}

#[async_trait]
impl NarrationSource for NarrationClient {
    async fn fetch(&self, text: &str, voice: &str) -> Result<Narration, NarrationError> {
        let prepared = prepare_text(text, self.config.max_text_chars)?;
        let voice = if voice.is_empty() {
            self.config.voice.as_str()
        } else {
            voice
        };

        match tokio::time::timeout(self.config.timeout, self.request(&prepared, voice)).await {
            Ok(result) => result.map_err(|e| match e {
                RemoteError::Network(ref inner) if inner.is_timeout() => {
                    NarrationError::FetchTimeout {
                        after: self.config.timeout,
                    }
                }
                other => other.into(),
            }),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.config.timeout.as_secs(),
                    "Narration fetch timed out"
                );
                Err(NarrationError::FetchTimeout {
                    after: self.config.timeout,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_text_sanitizes() {
        let prepared = prepare_text("오늘은\n\n今天 날씨가   좋네요.", 2000).unwrap();
        assert_eq!(prepared, "오늘은 날씨가 좋네요.");
    }

    #[test]
    fn test_prepare_text_rejects_gloss_only_input() {
        assert!(matches!(
            prepare_text("经济 \n 学习", 2000),
            Err(NarrationError::EmptyText)
        ));
    }

    #[test]
    fn test_prepare_text_truncates_on_char_boundary() {
        let prepared = prepare_text("가나다라마바사", 3).unwrap();
        assert_eq!(prepared, "가나다");
    }
}
