//! Remote collaborators for readaloud.
//!
//! Implements the core ports against the reading app's HTTP endpoints
//! (article narration, pronunciation clips, dictionary) and against the
//! local `edge-tts` command.
//!
//! # Example
//!
//! ```no_run
//! use readaloud_core::NarrationSource;
//! use readaloud_remote::{CachedSource, NarrationClient, TtsClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TtsClientConfig::new().with_base_url("http://localhost:3000");
//! let source = CachedSource::new(NarrationClient::new(config)?);
//! let narration = source.fetch("안녕하세요. 오늘은 날씨가 좋네요.", "").await?;
//! println!("{} captions", narration.captions.len());
//! # Ok(())
//! # }
//! ```

mod cache;
mod clip;
mod config;
mod dictionary;
mod edge;
mod error;
mod narration;
mod vtt;
mod wire;

pub use cache::CachedSource;
pub use clip::{ClipClient, MAX_CLIP_CHARS};
pub use config::{DEFAULT_VOICE, TtsClientConfig};
pub use dictionary::HttpDictionary;
pub use edge::EdgeTtsSource;
pub use error::{RemoteError, RemoteResult};
pub use narration::{NarrationClient, prepare_text};
pub use vtt::parse_vtt;
