//! Integration tests for caption lookup as the player and reading view use it.
//!
//! # What is tested
//!
//! - Time lookup across gaps and overlaps
//! - Fragment matching through punctuation, spacing and translation glosses
//! - Navigation margins around caption starts
//! - The rate ladder is a closed cycle
//! - Caption JSON matches the TTS payload shape

use readaloud_core::{
    Caption, CaptionIndex, DEFAULT_RATE, RATE_LADDER, next_rate, normalize, sanitize_for_speech,
};

// ── Helpers ────────────────────────────────────────────────────────

fn article_index() -> CaptionIndex {
    CaptionIndex::from_captions(vec![
        Caption::new(0.0, 1.8, "안녕하세요."),
        Caption::new(2.0, 4.5, "오늘은 날씨가 좋네요!"),
        Caption::new(4.5, 6.0, "“산책하러 갈까요?”"),
        Caption::new(6.0, 6.0, ""),
        Caption::new(6.2, 9.0, "네, 좋아요."),
    ])
}

// ── Time lookup ────────────────────────────────────────────────────

#[test]
fn gaps_have_no_active_caption() {
    let index = article_index();
    assert_eq!(index.index_at(1.0), Some(0));
    assert_eq!(index.index_at(1.9), None);
    assert_eq!(index.index_at(6.1), None);
    assert_eq!(index.index_at(12.0), None);
}

#[test]
fn shared_boundary_resolves_to_earlier_caption() {
    let index = article_index();
    assert_eq!(index.index_at(4.5), Some(1));
    assert_eq!(index.caption_at(4.6).map(|c| c.text.as_str()), Some("“산책하러 갈까요?”"));
}

#[test]
fn end_time_is_last_caption_end() {
    assert_eq!(article_index().end_time(), Some(9.0));
    assert_eq!(CaptionIndex::new().end_time(), None);
}

// ── Fragment matching ──────────────────────────────────────────────

#[test]
fn fragment_matches_through_punctuation_and_quotes() {
    let index = article_index();
    assert_eq!(index.find_by_fragment("산책하러 갈까요"), Some(2));
    assert_eq!(index.find_by_fragment("\"산책하러   갈까요?\""), Some(2));
}

#[test]
fn fragment_with_gloss_matches_spoken_caption() {
    let index = article_index();
    // The reading view carries the gloss; the narration never speaks it.
    assert_eq!(index.find_by_fragment("오늘은 날씨(天氣)가 좋네요"), Some(1));
}

#[test]
fn sentence_spanning_captions_matches_first_of_them() {
    let index = article_index();
    assert_eq!(
        index.find_by_fragment("안녕하세요. 오늘은 날씨가 좋네요!"),
        Some(0)
    );
}

#[test]
fn short_or_empty_fragments_never_match() {
    let index = article_index();
    assert_eq!(index.find_by_fragment("네"), None);
    assert_eq!(index.find_by_fragment(""), None);
    assert_eq!(index.find_by_fragment("?!"), None);
}

#[test]
fn speech_text_drops_glosses_and_line_breaks() {
    assert_eq!(
        sanitize_for_speech("오늘은 날씨(天氣)가\n\n좋네요"),
        "오늘은 날씨()가 좋네요"
    );
    assert_eq!(normalize("Hello, 세계!"), "hello세계");
}

// ── Navigation ─────────────────────────────────────────────────────

#[test]
fn previous_skips_caption_just_started() {
    let index = article_index();
    // 0.3s into caption 1: going back restarts caption 0.
    assert_eq!(index.prev_before(2.3), Some(0));
    // Well into caption 1: going back restarts it.
    assert_eq!(index.prev_before(3.0), Some(1));
    assert_eq!(index.prev_before(0.2), None);
}

#[test]
fn next_skips_caption_about_to_start() {
    let index = article_index();
    assert_eq!(index.next_after(0.0), Some(1));
    // Caption 2 starts within the margin, so it is skipped.
    assert_eq!(index.next_after(4.2), Some(3));
    assert_eq!(index.next_after(8.0), None);
}

// ── Rate ladder ────────────────────────────────────────────────────

#[test]
fn rate_ladder_cycles_back_after_five_steps() {
    let mut rate = DEFAULT_RATE;
    let mut seen = Vec::new();
    for _ in 0..RATE_LADDER.len() {
        rate = next_rate(rate);
        seen.push(rate);
    }
    assert_eq!(seen, vec![1.25, 1.5, 2.0, 0.75, 1.0]);
}

// ── Wire shape ─────────────────────────────────────────────────────

#[test]
fn captions_deserialize_from_tts_payload() {
    let json = r#"[{"start":0.0,"end":1.25,"text":"안녕하세요."},{"start":1.25,"end":3.5,"text":"반갑습니다."}]"#;
    let captions: Vec<Caption> = serde_json::from_str(json).unwrap();
    let index = CaptionIndex::from_captions(captions);
    assert_eq!(index.len(), 2);
    assert_eq!(index.find_by_fragment("반갑습니다"), Some(1));
}
