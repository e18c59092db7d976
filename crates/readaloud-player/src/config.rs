//! Player configuration.

use std::time::Duration;

/// Configuration for [`NarrationPlayer`](crate::NarrationPlayer).
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Voice passed to the narration source. Empty lets the source pick.
    pub voice: String,

    /// Period of the time-update tick while playing.
    pub frame_interval: Duration,

    /// Start a silent preload whenever new content is set.
    pub auto_preload: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            voice: String::new(),
            // ~60 fps, the cadence of an animation-frame loop
            frame_interval: Duration::from_millis(16),
            auto_preload: false,
        }
    }
}

impl PlayerConfig {
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    #[must_use]
    pub const fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_auto_preload(mut self, enabled: bool) -> Self {
        self.auto_preload = enabled;
        self
    }
}
