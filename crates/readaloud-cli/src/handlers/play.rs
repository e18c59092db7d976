//! `play` command: narrate an article and follow along in the terminal.

use anyhow::{Result, bail};
use readaloud_core::{NarrationError, PlaybackState};
use readaloud_player::{
    NarrationControls, NarrationPlayer, PlayerConfig, PlayerEvent, PlayerHandle, ReadingSurface,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::bootstrap::CliContext;
use crate::commands::PlayArgs;
use crate::handlers::read_text;

pub async fn execute(ctx: &CliContext, args: PlayArgs) -> Result<()> {
    let content = read_text(&args.file).await?;
    let mut surface = ReadingSurface::new(&content);
    println!(
        "{} sentence(s), about {} min to read",
        surface.sentences().count(),
        surface.reading_minutes()
    );

    let (player, mut events) = NarrationPlayer::spawn(
        PlayerConfig::default(),
        ctx.narration_source()?,
        ctx.media_backend(),
    );
    let handle = player.handle();
    handle.set_content(content);
    let rate = handle.set_rate(args.rate).await?;
    handle.set_loop(args.looping);
    tracing::debug!(rate, looping = args.looping, "Starting narration");

    let result = match start(&handle, args.from.as_deref()).await {
        Ok(()) => follow(&mut surface, &mut events).await,
        Err(e) => Err(e.into()),
    };

    player.shutdown().await;
    result
}

/// Start from the caption matching `from`, or from the beginning.
///
/// A fragment with no matching caption is not fatal: the narration starts
/// from the top instead.
async fn start(handle: &PlayerHandle, from: Option<&str>) -> Result<(), NarrationError> {
    let Some(fragment) = from else {
        return handle.play().await;
    };
    match handle.seek_to_text(fragment).await {
        Ok(index) => {
            tracing::debug!(index, "Starting at matching caption");
            Ok(())
        }
        Err(NarrationError::NoMatch { fragment }) => {
            tracing::warn!(%fragment, "No caption matches; starting from the beginning");
            eprintln!("No caption matches \"{fragment}\"; starting from the beginning");
            handle.play().await
        }
        Err(e) => Err(e),
    }
}

/// Print each newly highlighted sentence until the narration ends or the
/// user interrupts.
async fn follow(
    surface: &mut ReadingSurface,
    events: &mut UnboundedReceiver<PlayerEvent>,
) -> Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut playing = false;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                return Ok(());
            }
            event = events.recv() => {
                let Some(event) = event else { return Ok(()) };
                match event {
                    PlayerEvent::CurrentTextChanged { text } => {
                        if let Some(sentence) = surface.highlight(&text).and_then(|at| surface.sentence(at)) {
                            println!("▶ {sentence}");
                        }
                    }
                    PlayerEvent::StateChanged { state: PlaybackState::Playing } => playing = true,
                    // End of track (looping never pauses on its own).
                    PlayerEvent::StateChanged { state: PlaybackState::Paused } if playing => {
                        return Ok(());
                    }
                    PlayerEvent::Error { message } => bail!(message),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use readaloud_core::{Caption, Narration, NarrationAudio, NarrationSource};
    use readaloud_player::ClockBackend;

    use super::*;

    const ARTICLE: &str = "안녕하세요. 오늘은 날씨가 좋네요!";

    struct FixedSource;

    #[async_trait]
    impl NarrationSource for FixedSource {
        async fn fetch(&self, _text: &str, _voice: &str) -> Result<Narration, NarrationError> {
            let audio = NarrationAudio {
                bytes: vec![0xFF; 1024],
                content_type: "audio/mpeg".to_string(),
            };
            let captions = vec![
                Caption::new(0.0, 2.0, "안녕하세요."),
                Caption::new(2.0, 4.5, "오늘은 날씨가 좋네요!"),
            ];
            Ok(Narration::new(audio, captions, None))
        }
    }

    fn spawn() -> (NarrationPlayer, PlayerHandle) {
        let (player, _events) = NarrationPlayer::spawn(
            PlayerConfig::default(),
            Arc::new(FixedSource),
            Box::new(ClockBackend::new()),
        );
        let handle = player.handle();
        handle.set_content(ARTICLE);
        (player, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_from_matching_caption() {
        let (player, handle) = spawn();
        start(&handle, Some("오늘은 날씨가")).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, PlaybackState::Playing);
        assert_eq!(snapshot.active_caption, Some(1));
        player.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmatched_fragment_starts_from_beginning() {
        let (player, handle) = spawn();
        start(&handle, Some("전혀 없는 문장")).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, PlaybackState::Playing);
        assert!(snapshot.position < 0.1);
        assert_eq!(snapshot.active_caption, Some(0));
        player.shutdown().await;
    }
}
