//! `pronounce` command: play one word's pronunciation clip.

use std::time::Duration;

use anyhow::Result;
use readaloud_player::PronunciationPlayer;
use readaloud_remote::ClipClient;

use crate::bootstrap::CliContext;

pub async fn execute(ctx: &CliContext, word: &str, speed: Option<f32>) -> Result<()> {
    let client = ClipClient::new(ctx.remote.clone())?;
    let clip = client.fetch_clip(word, speed).await?;

    let mut player = PronunciationPlayer::new(ctx.media_backend());
    player.play(&clip, 1.0)?;
    println!("▶ {word}");
    player.finished(Duration::from_millis(50)).await;
    Ok(())
}
