//! Core of the readaloud narration engine.
//!
//! Pure, I/O-free building blocks: the text normalizer used for fuzzy
//! caption matching, the caption index queried on every frame, playback
//! domain types, the narration error taxonomy, and the ports the adapters
//! implement.

pub mod caption;
pub mod error;
pub mod playback;
pub mod ports;
pub mod text;

// Re-export commonly used types for convenience
pub use caption::{Caption, CaptionIndex, NAVIGATION_MARGIN_SECS};
pub use error::NarrationError;
pub use playback::{DEFAULT_RATE, PlaybackState, RATE_LADDER, SessionToken, next_rate};
pub use ports::{
    DictionaryError, DictionaryLookup, MediaBackend, MediaElement, Narration, NarrationAudio,
    NarrationSource,
};
pub use text::{normalize, normalize_word, sanitize_for_speech};
