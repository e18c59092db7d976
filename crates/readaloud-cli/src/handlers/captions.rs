//! `captions` command: fetch a narration and print its captions.

use std::path::Path;

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::handlers::read_text;
use crate::presentation::{caption_rows, format_timestamp, print_separator};

pub async fn execute(ctx: &CliContext, file: &Path, json: bool) -> Result<()> {
    let content = read_text(file).await?;
    let source = ctx.narration_source()?;
    let narration = source.fetch(&content, "").await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&narration.captions)?);
        return Ok(());
    }

    if narration.captions.is_empty() {
        println!("The narration has no captions.");
        return Ok(());
    }

    for row in caption_rows(&narration.captions) {
        println!("{row}");
    }
    print_separator();
    println!(
        "{} caption(s), {} of audio ({})",
        narration.captions.len(),
        narration
            .duration_hint
            .map_or_else(|| "unknown length".to_string(), format_timestamp),
        narration.audio.content_type,
    );
    Ok(())
}
