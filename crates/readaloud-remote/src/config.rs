//! Public configuration for the remote collaborators.
//!
//! One config covers the three endpoints the reading app talks to: article
//! narration, single-word pronunciation clips and dictionary lookups. They
//! share a base URL, a user agent and the bounded wait.

use std::time::Duration;

/// Default narration voice.
pub const DEFAULT_VOICE: &str = "ko-KR-SunHiNeural";

/// Configuration for the remote clients.
///
/// Use the builder pattern methods to customize the client configuration.
///
/// # Example
///
/// ```
/// use readaloud_remote::TtsClientConfig;
/// use std::time::Duration;
///
/// let config = TtsClientConfig::new()
///     .with_base_url("http://localhost:3000")
///     .with_timeout(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct TtsClientConfig {
    /// Origin every endpoint path is appended to
    pub(crate) base_url: String,
    /// Article narration endpoint (POST `{text, voice}`)
    pub(crate) narration_path: String,
    /// Pronunciation clip endpoint (POST `{text, speed}`)
    pub(crate) clip_path: String,
    /// Dictionary endpoint (GET `?word=`)
    pub(crate) dictionary_path: String,
    /// Voice used when the caller does not pick one
    pub(crate) voice: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Bounded wait for a single request, end to end
    pub(crate) timeout: Duration,
    /// Longest narration input sent upstream, in characters
    pub(crate) max_text_chars: usize,
}

impl Default for TtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            narration_path: "/api/tts-article".to_string(),
            clip_path: "/api/tts".to_string(),
            dictionary_path: "/api/naver".to_string(),
            voice: DEFAULT_VOICE.to_string(),
            user_agent: concat!("readaloud/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(35),
            max_text_chars: 2000,
        }
    }
}

impl TtsClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the origin all endpoint paths are resolved against.
    ///
    /// Defaults to `http://localhost:3000`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the narration endpoint path.
    #[must_use]
    pub fn with_narration_path(mut self, path: impl Into<String>) -> Self {
        self.narration_path = path.into();
        self
    }

    /// Set the pronunciation clip endpoint path.
    #[must_use]
    pub fn with_clip_path(mut self, path: impl Into<String>) -> Self {
        self.clip_path = path.into();
        self
    }

    /// Set the dictionary endpoint path.
    #[must_use]
    pub fn with_dictionary_path(mut self, path: impl Into<String>) -> Self {
        self.dictionary_path = path.into();
        self
    }

    /// Set the default voice.
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the bounded wait.
    ///
    /// Defaults to 35 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the narration input cap.
    ///
    /// Defaults to 2000 characters.
    #[must_use]
    pub const fn with_max_text_chars(mut self, max: usize) -> Self {
        self.max_text_chars = max;
        self
    }

    /// The default voice.
    #[must_use]
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// The bounded wait.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The narration input cap.
    #[must_use]
    pub const fn max_text_chars(&self) -> usize {
        self.max_text_chars
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TtsClientConfig::new();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.narration_path, "/api/tts-article");
        assert_eq!(config.voice, "ko-KR-SunHiNeural");
        assert!(config.user_agent.contains("readaloud"));
        assert_eq!(config.timeout, Duration::from_secs(35));
        assert_eq!(config.max_text_chars, 2000);
    }

    #[test]
    fn test_builder_pattern() {
        let config = TtsClientConfig::new()
            .with_base_url("https://reader.example/")
            .with_narration_path("/narrate")
            .with_voice("ko-KR-InJoonNeural")
            .with_user_agent("test-agent")
            .with_timeout(Duration::from_secs(5))
            .with_max_text_chars(100);

        assert_eq!(config.endpoint(&config.narration_path), "https://reader.example/narrate");
        assert_eq!(config.voice(), "ko-KR-InJoonNeural");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.max_text_chars(), 100);
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = TtsClientConfig::new().with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.endpoint("/api/tts"), "http://127.0.0.1:9000/api/tts");
    }
}
