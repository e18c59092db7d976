//! Narration playback for readaloud.
//!
//! [`NarrationPlayer`] runs the playback engine on its own task: it loads
//! narrations on demand, keeps the active caption in sync with the audio,
//! navigates between sentences and reports everything as [`PlayerEvent`]s.
//! [`ReadingSurface`] and [`WordClicks`] drive the article view on top of it.
//!
//! Audio goes through a [`MediaBackend`](readaloud_core::MediaBackend):
//! [`ClockBackend`] is silent and clock-driven; with the `rodio` feature,
//! `RodioBackend` plays on the default output device.

mod clock;
mod config;
mod engine;
mod events;
mod headless;
mod navigator;
mod player;
mod pronounce;
mod session;
mod surface;

#[cfg(feature = "rodio")]
mod audio_thread;
#[cfg(feature = "rodio")]
mod rodio_backend;

pub use clock::FrameClock;
pub use config::PlayerConfig;
pub use engine::{LoadPlan, PlaybackEngine, PlayerSnapshot};
pub use events::PlayerEvent;
pub use headless::{ASSUMED_BITRATE_BPS, ClockBackend, ClockMedia};
pub use player::{NarrationControls, NarrationPlayer, PlayerHandle};
pub use pronounce::PronunciationPlayer;
pub use surface::{
    DOUBLE_CLICK_WINDOW, LookupEvent, Paragraph, ParagraphKind, READING_CHARS_PER_MINUTE,
    ReadingSurface, SentenceRef, WordClicks,
};

#[cfg(feature = "rodio")]
pub use rodio_backend::{RodioBackend, RodioMedia};
