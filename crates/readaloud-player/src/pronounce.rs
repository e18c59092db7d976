//! Single-clip pronunciation player.
//!
//! Word pronunciations are independent of the narration session. Whoever
//! owns a [`PronunciationPlayer`] owns the one clip that may be audible:
//! starting a clip silences the previous one.

use std::time::Duration;

use readaloud_core::{MediaBackend, MediaElement, NarrationAudio, NarrationError};

pub struct PronunciationPlayer {
    backend: Box<dyn MediaBackend>,
    current: Option<Box<dyn MediaElement>>,
}

impl PronunciationPlayer {
    #[must_use]
    pub fn new(backend: Box<dyn MediaBackend>) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    /// Play `clip` at `rate`, stopping whatever clip was playing.
    pub fn play(&mut self, clip: &NarrationAudio, rate: f32) -> Result<(), NarrationError> {
        self.stop();
        let mut media = self.backend.open(clip, None)?;
        media.set_playback_rate(rate);
        media.play()?;
        tracing::debug!(bytes = clip.bytes.len(), rate, "Pronunciation clip started");
        self.current = Some(media);
        Ok(())
    }

    /// Silence and release the current clip.
    pub fn stop(&mut self) {
        if let Some(mut media) = self.current.take() {
            media.pause();
        }
    }

    /// Whether a clip is audible right now.
    pub fn is_playing(&mut self) -> bool {
        self.current
            .as_mut()
            .is_some_and(|m| !m.is_paused() && !m.has_ended())
    }

    /// Wait for the current clip to finish, checking every `poll`.
    pub async fn finished(&mut self, poll: Duration) {
        while self.is_playing() {
            tokio::time::sleep(poll).await;
        }
        self.current = None;
    }
}

impl std::fmt::Debug for PronunciationPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PronunciationPlayer")
            .field("has_clip", &self.current.is_some())
            .finish_non_exhaustive()
    }
}
