//! Silent media backend driven by the tokio clock.
//!
//! Reproduces the timing behavior of a real media element (position advances
//! with wall time scaled by the rate, seeking, looping, end of track) without
//! an output device. Used by the CLI when built without audio support and by
//! tests running on a paused clock.

use readaloud_core::{MediaBackend, MediaElement, NarrationAudio, NarrationError};
use tokio::time::Instant;

/// Bitrate assumed when the duration must be estimated from the encoded
/// size (the TTS backend emits 48 kbit/s mono MP3).
pub const ASSUMED_BITRATE_BPS: f64 = 48_000.0;

/// Media element whose position is computed from elapsed time.
#[derive(Debug)]
pub struct ClockMedia {
    duration: f64,
    /// Position at `anchor`, or the resting position while paused.
    position: f64,
    /// Set while playing.
    anchor: Option<Instant>,
    rate: f32,
    looping: bool,
    ended: bool,
}

impl ClockMedia {
    /// A paused element of `duration` seconds, positioned at zero.
    #[must_use]
    pub const fn new(duration: f64) -> Self {
        Self {
            duration,
            position: 0.0,
            anchor: None,
            rate: 1.0,
            looping: false,
            ended: false,
        }
    }

    /// Fold elapsed time into `position`, handling end of track.
    fn advance(&mut self) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let now = Instant::now();
        let elapsed = now.duration_since(anchor).as_secs_f64() * f64::from(self.rate);
        let mut position = self.position + elapsed;

        if position >= self.duration {
            if self.looping && self.duration > 0.0 {
                position %= self.duration;
            } else {
                position = self.duration;
                self.ended = true;
                self.anchor = None;
                self.position = position;
                return;
            }
        }

        self.position = position;
        self.anchor = Some(now);
    }
}

impl MediaElement for ClockMedia {
    fn play(&mut self) -> Result<(), NarrationError> {
        if self.anchor.is_some() {
            return Ok(());
        }
        if self.ended || self.position >= self.duration {
            self.position = 0.0;
        }
        self.ended = false;
        self.anchor = Some(Instant::now());
        Ok(())
    }

    fn pause(&mut self) {
        self.advance();
        self.anchor = None;
    }

    fn is_paused(&self) -> bool {
        self.anchor.is_none()
    }

    fn current_time(&mut self) -> f64 {
        self.advance();
        self.position
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }

    fn seek(&mut self, seconds: f64) -> Result<(), NarrationError> {
        self.position = seconds.clamp(0.0, self.duration);
        self.ended = false;
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.advance();
        self.rate = rate;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn has_ended(&mut self) -> bool {
        self.advance();
        self.ended
    }
}

/// Backend producing [`ClockMedia`] elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockBackend;

impl ClockBackend {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MediaBackend for ClockBackend {
    fn open(
        &self,
        audio: &NarrationAudio,
        duration_hint: Option<f64>,
    ) -> Result<Box<dyn MediaElement>, NarrationError> {
        if audio.bytes.is_empty() {
            return Err(NarrationError::Playback("audio resource is empty".to_string()));
        }
        #[allow(clippy::cast_precision_loss)]
        let duration = duration_hint
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or_else(|| audio.bytes.len() as f64 * 8.0 / ASSUMED_BITRATE_BPS);
        tracing::debug!(duration, content_type = %audio.content_type, "Opened headless media");
        Ok(Box::new(ClockMedia::new(duration)))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_follows_clock_and_rate() {
        let mut media = ClockMedia::new(10.0);
        media.play().unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(approx(media.current_time(), 2.0));

        media.set_playback_rate(2.0);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(approx(media.current_time(), 4.0));

        media.pause();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(approx(media.current_time(), 4.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_keeps_playing_state() {
        let mut media = ClockMedia::new(10.0);
        media.play().unwrap();
        media.seek(6.0).unwrap();
        assert!(!media.is_paused());
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(approx(media.current_time(), 7.0));

        media.seek(99.0).unwrap();
        assert!(approx(media.current_time(), 10.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_track_and_loop() {
        let mut media = ClockMedia::new(3.0);
        media.play().unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(media.has_ended());
        assert!(media.is_paused());

        let mut media = ClockMedia::new(3.0);
        media.set_looping(true);
        media.play().unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(!media.has_ended());
        assert!(approx(media.current_time(), 1.0));
    }

    #[test]
    fn test_backend_rejects_empty_audio() {
        let audio = NarrationAudio {
            bytes: Vec::new(),
            content_type: "audio/mpeg".to_string(),
        };
        assert!(matches!(
            ClockBackend.open(&audio, Some(1.0)),
            Err(NarrationError::Playback(_))
        ));
    }

    #[test]
    fn test_backend_estimates_duration_without_hint() {
        let audio = NarrationAudio {
            bytes: vec![0; 12_000],
            content_type: "audio/mpeg".to_string(),
        };
        let media = ClockBackend.open(&audio, None).unwrap();
        assert_eq!(media.duration(), Some(2.0));
    }
}
