//! Narration source port: text in, audio plus timed captions out.

use async_trait::async_trait;

use crate::caption::Caption;
use crate::error::NarrationError;

/// Encoded audio returned by the TTS collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationAudio {
    /// Encoded bytes as returned (MP3 for the default backend).
    pub bytes: Vec<u8>,

    /// MIME type of `bytes`.
    pub content_type: String,
}

/// Everything needed to start a narration session.
#[derive(Debug, Clone)]
pub struct Narration {
    pub audio: NarrationAudio,

    /// Start-ascending captions. Empty when the backend produced none;
    /// playback still works, highlighting does not.
    pub captions: Vec<Caption>,

    /// Duration reported by the backend, or the last caption's end.
    /// Always finite and positive when present.
    pub duration_hint: Option<f64>,
}

impl Narration {
    /// Assemble a narration, deriving the duration hint from the captions
    /// when the backend did not report a usable one.
    pub fn new(audio: NarrationAudio, captions: Vec<Caption>, duration: Option<f64>) -> Self {
        let duration_hint = duration
            .filter(|d| is_usable_duration(*d))
            .or_else(|| captions.last().map(|c| c.end))
            .filter(|d| is_usable_duration(*d));
        Self {
            audio,
            captions,
            duration_hint,
        }
    }
}

/// Captions and backend metadata are unvalidated; only finite, positive
/// values can bound a seek.
fn is_usable_duration(seconds: f64) -> bool {
    seconds.is_finite() && seconds > 0.0
}

/// Backend-agnostic narration fetcher.
///
/// Implementations must be idempotent for identical `(text, voice)` and
/// must enforce their own bounded wait, failing with
/// [`NarrationError::FetchTimeout`] when it expires.
#[async_trait]
pub trait NarrationSource: Send + Sync {
    /// Synthesize `text` with `voice`.
    ///
    /// `text` is the raw source text; the source sanitizes it before
    /// dispatch.
    async fn fetch(&self, text: &str, voice: &str) -> Result<Narration, NarrationError>;
}
