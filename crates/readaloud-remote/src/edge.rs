//! Local narration source that shells out to the `edge-tts` command.
//!
//! Useful offline or when the article endpoint is not deployed: the command
//! writes an MP3 and a WebVTT subtitle file, which are read back into a
//! [`Narration`].

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use readaloud_core::{Narration, NarrationAudio, NarrationError, NarrationSource};
use tokio::process::Command;

use crate::config::DEFAULT_VOICE;
use crate::error::{RemoteError, RemoteResult};
use crate::narration::prepare_text;
use crate::vtt::parse_vtt;
use crate::wire::DEFAULT_CONTENT_TYPE;

/// Narration source running `edge-tts --write-media --write-subtitles`.
#[derive(Debug, Clone)]
pub struct EdgeTtsSource {
    program: PathBuf,
    voice: String,
    timeout: Duration,
    max_text_chars: usize,
}

impl Default for EdgeTtsSource {
    fn default() -> Self {
        Self {
            program: PathBuf::from("edge-tts"),
            voice: DEFAULT_VOICE.to_string(),
            timeout: Duration::from_secs(35),
            max_text_chars: 2000,
        }
    }
}

impl EdgeTtsSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific executable instead of `edge-tts` from `PATH`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the default voice.
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Set the bounded wait for one synthesis run.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the narration input cap.
    #[must_use]
    pub const fn with_max_text_chars(mut self, max: usize) -> Self {
        self.max_text_chars = max;
        self
    }

    async fn synthesize(&self, text: &str, voice: &str) -> RemoteResult<Narration> {
        let media = tempfile::Builder::new()
            .prefix("readaloud-")
            .suffix(".mp3")
            .tempfile()?;
        let subtitles = tempfile::Builder::new()
            .prefix("readaloud-")
            .suffix(".vtt")
            .tempfile()?;

        tracing::debug!(
            program = %self.program.display(),
            voice,
            chars = text.chars().count(),
            "Running edge-tts"
        );

        let output = Command::new(&self.program)
            .arg("--text")
            .arg(text)
            .arg("--voice")
            .arg(voice)
            .arg("--write-media")
            .arg(media.path())
            .arg("--write-subtitles")
            .arg(subtitles.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| RemoteError::Command(format!("Failed to spawn: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RemoteError::Command(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let bytes = tokio::fs::read(media.path()).await?;
        if bytes.is_empty() {
            return Err(RemoteError::InvalidResponse {
                message: "edge-tts produced no audio".to_string(),
            });
        }
        let vtt = tokio::fs::read_to_string(subtitles.path()).await?;
        let captions = parse_vtt(&vtt);
        if captions.is_empty() {
            tracing::warn!("edge-tts produced no subtitle cues");
        }

        Ok(Narration::new(
            NarrationAudio {
                bytes,
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
            },
            captions,
            None,
        ))
    }
}

#[async_trait]
impl NarrationSource for EdgeTtsSource {
    async fn fetch(&self, text: &str, voice: &str) -> Result<Narration, NarrationError> {
        let prepared = prepare_text(text, self.max_text_chars)?;
        let voice = if voice.is_empty() { &self.voice } else { voice };

        // Dropping the future kills the child (kill_on_drop).
        match tokio::time::timeout(self.timeout, self.synthesize(&prepared, voice)).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "edge-tts timed out");
                Err(NarrationError::FetchTimeout {
                    after: self.timeout,
                })
            }
        }
    }
}
