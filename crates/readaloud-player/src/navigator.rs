//! Sentence navigation: seek by text fragment and step between captions.

use readaloud_core::{CaptionIndex, NarrationError};

use crate::engine::PlaybackEngine;

impl PlaybackEngine {
    /// Seek to the first caption matching `fragment` and play from there.
    ///
    /// A miss is [`NarrationError::NoMatch`] and leaves playback untouched.
    /// Requires a loaded session; loading on demand is the player's job.
    pub fn seek_to_fragment(&mut self, fragment: &str) -> Result<usize, NarrationError> {
        let Some(session) = self.session.as_ref() else {
            return Err(NarrationError::NotReady);
        };
        let Some(index) = session.index.find_by_fragment(fragment) else {
            tracing::info!(fragment, "No caption matches fragment");
            return Err(NarrationError::NoMatch {
                fragment: fragment.to_string(),
            });
        };
        let start = session.index.get(index).map_or(0.0, |c| c.start);

        tracing::debug!(fragment, index, start, "Seeking to fragment");
        self.seek(start)?;
        if !self.is_playing() {
            self.play()?;
        }
        Ok(index)
    }

    /// Seek to the last caption starting at least half a second before the
    /// current position.
    pub fn prev_sentence(&mut self) -> Result<Option<usize>, NarrationError> {
        self.step(CaptionIndex::prev_before)
    }

    /// Seek to the first caption starting more than half a second after the
    /// current position.
    pub fn next_sentence(&mut self) -> Result<Option<usize>, NarrationError> {
        self.step(CaptionIndex::next_after)
    }

    fn step(
        &mut self,
        pick: impl FnOnce(&CaptionIndex, f64) -> Option<usize>,
    ) -> Result<Option<usize>, NarrationError> {
        let Some(session) = self.session.as_mut() else {
            return Err(NarrationError::NotReady);
        };
        let position = session.media.current_time();
        let Some(index) = pick(&session.index, position) else {
            return Ok(None);
        };
        let start = session.index.get(index).map_or(position, |c| c.start);
        self.seek(start)?;
        Ok(Some(index))
    }
}

#[cfg(test)]
mod tests {
    use readaloud_core::{Caption, Narration, NarrationAudio, PlaybackState};

    use crate::engine::LoadPlan;
    use crate::headless::ClockBackend;

    use super::*;

    fn loaded(captions: Vec<Caption>) -> PlaybackEngine {
        let duration = captions.last().map_or(1.0, |c| c.end);
        let (mut engine, _rx) = PlaybackEngine::new(Box::new(ClockBackend::new()));
        let LoadPlan::Fetch { token } = engine.begin_load("본문", false) else {
            panic!("expected a fetch");
        };
        let narration = Narration::new(
            NarrationAudio {
                bytes: vec![1; 16],
                content_type: "audio/mpeg".to_string(),
            },
            captions,
            Some(duration),
        );
        engine.complete_load(token, Ok(narration)).unwrap();
        engine
    }

    fn greeting() -> Vec<Caption> {
        vec![Caption::new(0.0, 2.0, "안녕"), Caption::new(2.0, 5.0, "하세요")]
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_to_fragment_moves_and_plays() {
        let mut engine = loaded(greeting());
        assert_eq!(engine.state(), PlaybackState::Paused);

        assert_eq!(engine.seek_to_fragment("하세요").unwrap(), 1);
        assert!((engine.position() - 2.0).abs() < 1e-9);
        assert_eq!(engine.state(), PlaybackState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_to_fragment_miss_changes_nothing() {
        let mut engine = loaded(greeting());
        engine.seek(1.0).unwrap();

        assert!(matches!(
            engine.seek_to_fragment("그"),
            Err(NarrationError::NoMatch { .. })
        ));
        assert!(matches!(
            engine.seek_to_fragment("전혀 다른 문장"),
            Err(NarrationError::NoMatch { .. })
        ));
        assert!((engine.position() - 1.0).abs() < 1e-9);
        assert_eq!(engine.state(), PlaybackState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_to_superset_fragment() {
        let mut engine = loaded(vec![
            Caption::new(0.0, 2.0, "안녕하세요."),
            Caption::new(2.0, 5.0, "오늘은 날씨가 좋네요."),
        ]);
        let index = engine
            .seek_to_fragment("안녕하세요 오늘은 날씨가 좋네요")
            .unwrap();
        // The first caption is contained in the fragment, so it wins.
        assert_eq!(index, 0);
    }

    #[test]
    fn test_prev_sentence_margin_at_2_3() {
        let mut engine = loaded(greeting());
        engine.seek(2.3).unwrap();
        // 2.0 + 0.5 > 2.3, so the current caption is skipped.
        assert_eq!(engine.prev_sentence().unwrap(), Some(0));
        assert!(engine.position().abs() < 1e-9);
    }

    #[test]
    fn test_prev_sentence_past_margin_restarts_current() {
        let mut engine = loaded(greeting());
        engine.seek(2.6).unwrap();
        assert_eq!(engine.prev_sentence().unwrap(), Some(1));
        assert!((engine.position() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_next_sentence_margin() {
        let mut engine = loaded(greeting());
        engine.seek(1.4).unwrap();
        assert_eq!(engine.next_sentence().unwrap(), Some(1));

        let mut engine = loaded(greeting());
        engine.seek(1.6).unwrap();
        // 2.0 is not beyond 1.6 + 0.5.
        assert_eq!(engine.next_sentence().unwrap(), None);
        assert!((engine.position() - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_navigation_without_session() {
        let (mut engine, _rx) = PlaybackEngine::new(Box::new(ClockBackend::new()));
        assert!(matches!(engine.prev_sentence(), Err(NarrationError::NotReady)));
        assert!(matches!(engine.next_sentence(), Err(NarrationError::NotReady)));
        assert!(matches!(
            engine.seek_to_fragment("하세요"),
            Err(NarrationError::NotReady)
        ));
    }

    #[test]
    fn test_navigation_without_captions() {
        let mut engine = loaded(Vec::new());
        assert_eq!(engine.next_sentence().unwrap(), None);
        assert!(matches!(
            engine.seek_to_fragment("안녕하세요"),
            Err(NarrationError::NoMatch { .. })
        ));
    }
}
