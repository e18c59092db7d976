//! Timed captions and the index the player queries every frame.

use serde::{Deserialize, Serialize};

use crate::text::{keys_overlap, normalize};

/// Debounce margin (seconds) for previous/next sentence navigation.
///
/// Without it "previous" would just rewind to the start of the caption that
/// is currently being spoken.
pub const NAVIGATION_MARGIN_SECS: f64 = 0.5;

/// A timed text span: what is spoken during `[start, end]`, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Caption {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Whether `t` falls inside this caption (both bounds inclusive).
    #[must_use]
    pub fn covers(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Ordered caption list for the loaded narration.
///
/// Entries keep their input order; the upstream contract guarantees they are
/// start-ascending. Gaps between entries are allowed (silence). Overlaps are
/// tolerated and resolved first-match-by-order.
///
/// The normalized comparison key of every caption is computed once on load
/// rather than on every fragment lookup.
#[derive(Debug, Clone, Default)]
pub struct CaptionIndex {
    captions: Vec<Caption>,
    keys: Vec<String>,
}

impl CaptionIndex {
    /// Create an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            captions: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// Build an index from a caption list. See [`load`](Self::load).
    #[must_use]
    pub fn from_captions(captions: Vec<Caption>) -> Self {
        let mut index = Self::new();
        index.load(captions);
        index
    }

    /// Replace the entire index.
    ///
    /// The order is not re-validated in release builds. Debug builds log a
    /// warning when an entry starts before its predecessor or ends before it
    /// starts, so malformed upstream responses are visible without being
    /// silently repaired.
    pub fn load(&mut self, captions: Vec<Caption>) {
        if cfg!(debug_assertions) {
            warn_on_disorder(&captions);
        }
        self.keys = captions.iter().map(|c| normalize(&c.text)).collect();
        self.captions = captions;
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.captions.clear();
        self.keys.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Caption> {
        self.captions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Caption> {
        self.captions.iter()
    }

    /// End of the last caption, the best duration estimate when the media
    /// cannot report its own.
    #[must_use]
    pub fn end_time(&self) -> Option<f64> {
        self.captions.last().map(|c| c.end)
    }

    /// Index of the first caption covering `t`.
    #[must_use]
    pub fn index_at(&self, t: f64) -> Option<usize> {
        self.captions.iter().position(|c| c.covers(t))
    }

    /// First caption covering `t`, if any.
    #[must_use]
    pub fn caption_at(&self, t: f64) -> Option<&Caption> {
        self.index_at(t).map(|i| &self.captions[i])
    }

    /// Index of the first caption whose text overlaps `fragment`.
    ///
    /// Both sides are normalized; a caption matches when either normalized
    /// text contains the other. Fragments whose key is too short never match.
    #[must_use]
    pub fn find_by_fragment(&self, fragment: &str) -> Option<usize> {
        let fragment_key = normalize(fragment);
        self.keys
            .iter()
            .position(|key| keys_overlap(&fragment_key, key))
    }

    /// Index of the last caption starting at least
    /// [`NAVIGATION_MARGIN_SECS`] before `t`.
    #[must_use]
    pub fn prev_before(&self, t: f64) -> Option<usize> {
        self.captions
            .iter()
            .rposition(|c| c.start + NAVIGATION_MARGIN_SECS <= t)
    }

    /// Index of the first caption starting more than
    /// [`NAVIGATION_MARGIN_SECS`] after `t`.
    #[must_use]
    pub fn next_after(&self, t: f64) -> Option<usize> {
        self.captions
            .iter()
            .position(|c| c.start > t + NAVIGATION_MARGIN_SECS)
    }
}

fn warn_on_disorder(captions: &[Caption]) {
    for (i, caption) in captions.iter().enumerate() {
        if caption.start > caption.end {
            tracing::warn!(
                index = i,
                start = caption.start,
                end = caption.end,
                "Caption ends before it starts"
            );
        }
        if i > 0 && captions[i - 1].start > caption.start {
            tracing::warn!(
                index = i,
                previous_start = captions[i - 1].start,
                start = caption.start,
                "Captions are not start-ascending; first match by order wins"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sentences() -> CaptionIndex {
        CaptionIndex::from_captions(vec![
            Caption::new(0.0, 2.0, "안녕"),
            Caption::new(2.0, 5.0, "하세요"),
        ])
    }

    #[test]
    fn empty_index_answers_none() {
        let index = CaptionIndex::new();
        assert!(index.caption_at(0.0).is_none());
        assert!(index.find_by_fragment("안녕하세요").is_none());
        assert!(index.prev_before(10.0).is_none());
        assert!(index.next_after(0.0).is_none());
        assert!(index.end_time().is_none());
    }

    #[test]
    fn caption_at_respects_inclusive_bounds() {
        let index = two_sentences();
        assert_eq!(index.caption_at(0.0).map(|c| c.text.as_str()), Some("안녕"));
        assert_eq!(index.caption_at(1.5).map(|c| c.text.as_str()), Some("안녕"));
        // Shared boundary: first by order wins.
        assert_eq!(index.index_at(2.0), Some(0));
        assert_eq!(index.index_at(2.01), Some(1));
        assert_eq!(index.index_at(5.0), Some(1));
        assert!(index.caption_at(5.01).is_none());
        assert!(index.caption_at(-0.1).is_none());
    }

    #[test]
    fn caption_at_returns_none_in_gaps() {
        let index = CaptionIndex::from_captions(vec![
            Caption::new(0.0, 1.0, "하나"),
            Caption::new(3.0, 4.0, "둘"),
        ]);
        assert!(index.caption_at(2.0).is_none());
        assert_eq!(index.index_at(3.5), Some(1));
    }

    #[test]
    fn caption_at_is_idempotent() {
        let index = two_sentences();
        let first = index.caption_at(3.0).cloned();
        let second = index.caption_at(3.0).cloned();
        assert_eq!(first, second);
    }

    #[test]
    fn overlapping_entries_resolve_to_first_by_order() {
        let index = CaptionIndex::from_captions(vec![
            Caption::new(0.0, 4.0, "긴 문장"),
            Caption::new(1.0, 2.0, "짧은"),
        ]);
        assert_eq!(index.index_at(1.5), Some(0));
    }

    #[test]
    fn find_by_fragment_matches_subset_and_superset() {
        let index = CaptionIndex::from_captions(vec![
            Caption::new(0.0, 1.0, "처음 문장"),
            Caption::new(1.0, 3.0, "안녕하세요 오늘은"),
        ]);
        assert_eq!(index.find_by_fragment("오늘은"), Some(1));
        assert_eq!(
            index.find_by_fragment("안녕하세요 오늘은 날씨가 좋네요"),
            Some(1)
        );
    }

    #[test]
    fn find_by_fragment_ignores_formatting_differences() {
        let index = CaptionIndex::from_captions(vec![Caption::new(0.0, 2.0, "“그래요?” 정말요!")]);
        assert_eq!(index.find_by_fragment("그래요, 정말요."), Some(0));
    }

    #[test]
    fn find_by_fragment_rejects_short_fragments() {
        let index = CaptionIndex::from_captions(vec![
            Caption::new(0.0, 1.0, "그"),
            Caption::new(1.0, 2.0, "그리고 그는 갔다"),
        ]);
        assert!(index.find_by_fragment("그").is_none());
        assert!(index.find_by_fragment(" 그. ").is_none());
    }

    #[test]
    fn find_by_fragment_returns_first_match() {
        let index = CaptionIndex::from_captions(vec![
            Caption::new(0.0, 1.0, "반복되는 문장"),
            Caption::new(1.0, 2.0, "반복되는 문장"),
        ]);
        assert_eq!(index.find_by_fragment("반복되는"), Some(0));
    }

    #[test]
    fn find_by_fragment_skips_captions_that_normalize_to_nothing() {
        let index = CaptionIndex::from_captions(vec![
            Caption::new(0.0, 1.0, "..."),
            Caption::new(1.0, 2.0, "진짜 문장입니다"),
        ]);
        assert_eq!(index.find_by_fragment("진짜 문장입니다"), Some(1));
    }

    #[test]
    fn prev_before_applies_margin() {
        let index = two_sentences();
        // 2.3 - 0.5 = 1.8: caption starting at 2.0 is too recent, 0.0 qualifies.
        assert_eq!(index.prev_before(2.3), Some(0));
        // 2.5 - 0.5 = 2.0: caption starting at 2.0 qualifies exactly.
        assert_eq!(index.prev_before(2.5), Some(1));
        assert_eq!(index.prev_before(4.0), Some(1));
        // 0.3 - 0.5 < 0: nothing starts early enough.
        assert!(index.prev_before(0.3).is_none());
    }

    #[test]
    fn next_after_applies_margin() {
        let index = two_sentences();
        assert_eq!(index.next_after(0.0), Some(1));
        assert_eq!(index.next_after(1.4), Some(1));
        // 1.5 + 0.5 = 2.0 is not strictly before 2.0.
        assert!(index.next_after(1.5).is_none());
        assert!(index.next_after(3.0).is_none());
    }

    #[test]
    fn load_replaces_wholesale() {
        let mut index = two_sentences();
        index.load(vec![Caption::new(10.0, 12.0, "새로운 내용")]);
        assert_eq!(index.len(), 1);
        assert!(index.caption_at(1.0).is_none());
        assert_eq!(index.end_time(), Some(12.0));

        index.clear();
        assert!(index.is_empty());
    }

    #[test]
    fn caption_deserializes_from_wire_shape() {
        let caption: Caption =
            serde_json::from_str(r#"{"start":0.1,"end":1.25,"text":"안녕"}"#).unwrap();
        assert_eq!(caption, Caption::new(0.1, 1.25, "안녕"));
    }
}
