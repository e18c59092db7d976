//! Events emitted by the narration player to the reading surface.

use readaloud_core::PlaybackState;
use serde::Serialize;

/// Events emitted by the player to the UI / application layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// Player state changed.
    StateChanged { state: PlaybackState },

    /// A narration fetch started or finished (spinner affordance).
    LoadingChanged { loading: bool },

    /// The active caption changed. Empty when no caption is active or the
    /// session was closed.
    CurrentTextChanged { text: String },

    /// Emitted on every frame while playing and after each seek.
    Progress {
        /// Playback position in seconds.
        position: f64,
        /// Total duration in seconds, when known.
        duration: Option<f64>,
        /// 1-based number of the last caption reached (0 before the first).
        sentence: usize,
        /// Number of captions in the session.
        total: usize,
    },

    /// Playback rate changed.
    RateChanged { rate: f32 },

    /// Loop flag changed.
    LoopChanged { looping: bool },

    /// A fetch or the media resource failed.
    Error { message: String },
}
