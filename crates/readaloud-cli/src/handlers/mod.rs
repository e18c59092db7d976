//! Command handlers.
//!
//! Each handler is a thin wrapper: read the inputs, call into the library
//! crates, format the result for the terminal.

pub mod captions;
pub mod define;
pub mod matching;
pub mod play;
pub mod pronounce;

use std::path::Path;

use anyhow::{Context, Result};

/// Read an article or caption file as UTF-8.
pub(crate) async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}
