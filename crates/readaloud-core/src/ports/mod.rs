//! Port definitions (trait abstractions) for external collaborators.
//!
//! The engine never talks to the network or an audio device directly; it
//! goes through these traits so adapters can be swapped and tests can run
//! without either.
//!
//! # Design Rules
//!
//! - No adapter types (reqwest, rodio) appear in any signature here.
//! - Every port reports failures as [`NarrationError`](crate::NarrationError),
//!   except the dictionary, which is outside the narration core.

pub mod dictionary;
pub mod media;
pub mod narration;

pub use dictionary::{DictionaryError, DictionaryLookup};
pub use media::{MediaBackend, MediaElement};
pub use narration::{Narration, NarrationAudio, NarrationSource};
