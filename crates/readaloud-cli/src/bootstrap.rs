//! Composition root: builds the collaborators a command needs from the
//! global options.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use readaloud_core::{MediaBackend, NarrationSource};
use readaloud_remote::{CachedSource, EdgeTtsSource, NarrationClient, TtsClientConfig};

use crate::parser::Cli;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub remote: TtsClientConfig,
    pub edge_tts: Option<PathBuf>,
}

impl CliContext {
    pub fn from_cli(cli: &Cli) -> Self {
        let mut remote = TtsClientConfig::new().with_base_url(cli.base_url.clone());
        if let Some(voice) = &cli.voice {
            remote = remote.with_voice(voice.clone());
        }
        Self {
            remote,
            edge_tts: cli.edge_tts.clone(),
        }
    }

    /// The narration source selected by the options, behind a cache.
    pub fn narration_source(&self) -> Result<Arc<dyn NarrationSource>> {
        if let Some(program) = &self.edge_tts {
            tracing::debug!(program = %program.display(), "Using edge-tts command source");
            let source = EdgeTtsSource::new()
                .with_program(program.clone())
                .with_voice(self.remote.voice())
                .with_timeout(self.remote.timeout())
                .with_max_text_chars(self.remote.max_text_chars());
            return Ok(Arc::new(CachedSource::new(source)));
        }

        let client = NarrationClient::new(self.remote.clone())?;
        Ok(Arc::new(CachedSource::new(client)))
    }

    /// Media backend for this build.
    #[cfg(feature = "rodio")]
    pub fn media_backend(&self) -> Box<dyn MediaBackend> {
        Box::new(readaloud_player::RodioBackend::new())
    }

    /// Media backend for this build.
    #[cfg(not(feature = "rodio"))]
    pub fn media_backend(&self) -> Box<dyn MediaBackend> {
        tracing::warn!("Built without the `rodio` feature; playback is silent");
        Box::new(readaloud_player::ClockBackend::new())
    }
}
