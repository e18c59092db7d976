//! Media element port: one playable audio resource.
//!
//! Mirrors the small surface of a browser media element that the engine
//! actually needs: transport, position, rate and loop. Positions and
//! durations are seconds.

use crate::error::NarrationError;
use crate::ports::narration::NarrationAudio;

/// A loaded, playable audio resource.
///
/// Dropping the element releases the resource and silences it.
pub trait MediaElement: Send {
    /// Start or resume playback from the current position.
    fn play(&mut self) -> Result<(), NarrationError>;

    /// Pause, keeping the current position.
    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// Current playback position.
    ///
    /// Takes `&mut self` so backends can service looping while polled.
    fn current_time(&mut self) -> f64;

    /// Total duration, when the backend can determine it.
    fn duration(&self) -> Option<f64>;

    /// Move to `seconds` without changing the paused/playing state.
    fn seek(&mut self, seconds: f64) -> Result<(), NarrationError>;

    /// Apply a playback rate live, keeping the position.
    fn set_playback_rate(&mut self, rate: f32);

    /// Repeat the track continuously when it reaches the end.
    fn set_looping(&mut self, looping: bool);

    /// Whether playback ran to the end (never true while looping).
    fn has_ended(&mut self) -> bool;
}

/// Factory for [`MediaElement`]s.
///
/// Decode failures surface as [`NarrationError::Playback`].
pub trait MediaBackend: Send {
    /// Open `audio` as a paused element positioned at zero.
    ///
    /// `duration_hint` is used by backends that cannot read the duration
    /// from the encoded stream.
    fn open(
        &self,
        audio: &NarrationAudio,
        duration_hint: Option<f64>,
    ) -> Result<Box<dyn MediaElement>, NarrationError>;
}
