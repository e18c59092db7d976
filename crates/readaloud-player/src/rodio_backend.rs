//! Audible media backend on the default output device.

use readaloud_core::{MediaBackend, MediaElement, NarrationAudio, NarrationError};

use crate::audio_thread::AudioThreadHandle;

/// Opens narrations on the default output device, one audio thread each.
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioBackend;

impl RodioBackend {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MediaBackend for RodioBackend {
    fn open(
        &self,
        audio: &NarrationAudio,
        duration_hint: Option<f64>,
    ) -> Result<Box<dyn MediaElement>, NarrationError> {
        if audio.bytes.is_empty() {
            return Err(NarrationError::Playback("empty audio".to_string()));
        }
        let thread = AudioThreadHandle::spawn(audio.bytes.clone(), duration_hint)?;
        tracing::info!(
            content_type = %audio.content_type,
            duration = ?thread.duration(),
            "Narration audio opened on default output device"
        );
        Ok(Box::new(RodioMedia { thread }))
    }
}

/// A narration playing through rodio.
pub struct RodioMedia {
    thread: AudioThreadHandle,
}

impl MediaElement for RodioMedia {
    fn play(&mut self) -> Result<(), NarrationError> {
        self.thread.play()
    }

    fn pause(&mut self) {
        self.thread.pause();
    }

    fn is_paused(&self) -> bool {
        self.thread.is_paused()
    }

    fn current_time(&mut self) -> f64 {
        self.thread.position()
    }

    fn duration(&self) -> Option<f64> {
        self.thread.duration()
    }

    fn seek(&mut self, seconds: f64) -> Result<(), NarrationError> {
        self.thread.seek(seconds)
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.thread.set_speed(rate);
    }

    fn set_looping(&mut self, looping: bool) {
        self.thread.set_looping(looping);
    }

    fn has_ended(&mut self) -> bool {
        self.thread.has_ended()
    }
}

impl std::fmt::Debug for RodioMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioMedia")
            .field("duration", &self.thread.duration())
            .finish_non_exhaustive()
    }
}
