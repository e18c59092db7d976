//! Reading surface controller.
//!
//! Splits an article into paragraphs and sentences, tracks which sentences
//! the active caption highlights, and turns word clicks into dictionary
//! lookups (single click) or sentence seeks (double click).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use readaloud_core::text::{is_hangul, is_ideograph};
use readaloud_core::{DictionaryLookup, NarrationError, normalize, normalize_word};
use serde::Serialize;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::player::NarrationControls;

/// Reading speed used for the time estimate, in Hangul characters per minute.
pub const READING_CHARS_PER_MINUTE: usize = 220;

/// A second click within this window turns a click into a double click.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(250);

/// Caption keys of this many characters or fewer never highlight.
const MIN_HIGHLIGHT_CHARS: usize = 3;

const SENTENCE_TERMINATORS: [char; 6] = ['.', '。', '!', '?', '！', '？'];

// ── Layout ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParagraphKind {
    /// Korean text: clickable and highlightable.
    Target,
    /// Translation gloss: shown as-is, never narrated.
    Translation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub kind: ParagraphKind,
    pub text: String,
    /// Sentences with their terminators; empty for translations.
    pub sentences: Vec<String>,
}

/// Position of one sentence on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SentenceRef {
    pub paragraph: usize,
    pub sentence: usize,
}

/// Article layout plus highlight state.
#[derive(Debug, Clone)]
pub struct ReadingSurface {
    paragraphs: Vec<Paragraph>,
    /// Comparison key of every target sentence, in layout order.
    keys: Vec<(SentenceRef, String)>,
    hangul_chars: usize,
    highlighted: Vec<SentenceRef>,
}

impl ReadingSurface {
    #[must_use]
    pub fn new(content: &str) -> Self {
        let paragraphs = split_paragraphs(content);
        let keys = paragraphs
            .iter()
            .enumerate()
            .flat_map(|(p, para)| {
                para.sentences.iter().enumerate().map(move |(s, text)| {
                    (
                        SentenceRef {
                            paragraph: p,
                            sentence: s,
                        },
                        normalize(text),
                    )
                })
            })
            .collect();
        let hangul_chars = content.chars().filter(|c| is_hangul(*c)).count();

        Self {
            paragraphs,
            keys,
            hangul_chars,
            highlighted: Vec::new(),
        }
    }

    #[must_use]
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    #[must_use]
    pub fn sentence(&self, at: SentenceRef) -> Option<&str> {
        self.paragraphs
            .get(at.paragraph)?
            .sentences
            .get(at.sentence)
            .map(String::as_str)
    }

    /// Every target sentence in reading order.
    pub fn sentences(&self) -> impl Iterator<Item = (SentenceRef, &str)> {
        self.keys
            .iter()
            .filter_map(|(at, _)| self.sentence(*at).map(|s| (*at, s)))
    }

    /// Clickable words of a sentence.
    #[must_use]
    pub fn words(&self, at: SentenceRef) -> Vec<&str> {
        self.sentence(at).map(tokenize_words).unwrap_or_default()
    }

    /// Hangul syllables and jamo in the article.
    #[must_use]
    pub const fn hangul_count(&self) -> usize {
        self.hangul_chars
    }

    /// Estimated reading time, at least one minute.
    #[must_use]
    pub const fn reading_minutes(&self) -> usize {
        let minutes = self.hangul_chars.div_ceil(READING_CHARS_PER_MINUTE);
        if minutes == 0 { 1 } else { minutes }
    }

    /// Highlight the sentences matching `caption_text`.
    ///
    /// Either-direction containment like caption lookup, but the caption
    /// key must be longer than [`MIN_HIGHLIGHT_CHARS`] characters. Empty
    /// text clears the highlight. Returns the first highlighted sentence,
    /// the one to scroll into view.
    pub fn highlight(&mut self, caption_text: &str) -> Option<SentenceRef> {
        let key = normalize(caption_text);
        self.highlighted = if key.chars().count() > MIN_HIGHLIGHT_CHARS {
            self.keys
                .iter()
                .filter(|(_, sentence_key)| {
                    !sentence_key.is_empty()
                        && (sentence_key.contains(&key) || key.contains(sentence_key.as_str()))
                })
                .map(|(at, _)| *at)
                .collect()
        } else {
            Vec::new()
        };
        if let Some(first) = self.highlighted.first() {
            tracing::trace!(paragraph = first.paragraph, sentence = first.sentence, "Highlight");
        }
        self.highlighted.first().copied()
    }

    #[must_use]
    pub fn highlighted(&self) -> &[SentenceRef] {
        &self.highlighted
    }
}

/// Paragraphs are separated by blank lines. A paragraph with ideographs and
/// no Hangul syllables is a translation; one with neither is dropped.
fn split_paragraphs(content: &str) -> Vec<Paragraph> {
    let normalized = content.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|text| {
            let has_syllables = text.chars().any(|c| matches!(c, '\u{AC00}'..='\u{D7A3}'));
            let has_ideographs = text.chars().any(is_ideograph);
            if has_syllables {
                Some(Paragraph {
                    kind: ParagraphKind::Target,
                    text: text.to_string(),
                    sentences: split_sentences(text),
                })
            } else if has_ideographs {
                Some(Paragraph {
                    kind: ParagraphKind::Translation,
                    text: text.to_string(),
                    sentences: Vec::new(),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Split after each terminator, keeping it. A terminator with no text
/// before it is dropped.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if SENTENCE_TERMINATORS.contains(&c) {
            let body = current.trim();
            if !body.is_empty() {
                sentences.push(format!("{body}{c}"));
            }
            current.clear();
        } else {
            current.push(c);
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Alphanumeric runs that still normalize to a word.
fn tokenize_words(sentence: &str) -> Vec<&str> {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !normalize_word(token).is_empty())
        .collect()
}

// ── Clicks ─────────────────────────────────────────────────────────

/// Dictionary activity triggered by word clicks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LookupEvent {
    Loading { word: String },
    Ready { word: String, entry: serde_json::Value },
    Failed { word: String, message: String },
}

/// Resolves single and double word clicks.
///
/// A single click waits out [`DOUBLE_CLICK_WINDOW`] before looking the word
/// up, so a double click can cancel it and seek to the word's sentence
/// instead. Definitions are cached per normalized word.
pub struct WordClicks {
    dictionary: Arc<dyn DictionaryLookup>,
    controls: Arc<dyn NarrationControls>,
    cache: Arc<Mutex<HashMap<String, serde_json::Value>>>,
    pending: Option<CancellationToken>,
    window: Duration,
    event_tx: mpsc::UnboundedSender<LookupEvent>,
}

impl WordClicks {
    /// Returns the resolver and a receiver for [`LookupEvent`]s.
    pub fn new(
        dictionary: Arc<dyn DictionaryLookup>,
        controls: Arc<dyn NarrationControls>,
    ) -> (Self, mpsc::UnboundedReceiver<LookupEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let clicks = Self {
            dictionary,
            controls,
            cache: Arc::new(Mutex::new(HashMap::new())),
            pending: None,
            window: DOUBLE_CLICK_WINDOW,
            event_tx,
        };
        (clicks, event_rx)
    }

    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Schedule a lookup of `word` once the double-click window passes.
    pub fn click(&mut self, word: &str) {
        self.cancel_pending();
        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let word = word.to_string();
        let window = self.window;
        let dictionary = Arc::clone(&self.dictionary);
        let cache = Arc::clone(&self.cache);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => return,
                () = tokio::time::sleep(window) => {}
            }
            lookup_word(&word, dictionary.as_ref(), &cache, &event_tx).await;
        });
    }

    /// Cancel any pending single click and play from `sentence`.
    ///
    /// A sentence with no matching caption leaves playback alone.
    pub async fn double_click(&mut self, sentence: &str) -> Result<usize, NarrationError> {
        self.cancel_pending();
        let result = self.controls.seek_to_text(sentence).await;
        match &result {
            Ok(index) => tracing::debug!(index, "Double click seek"),
            Err(NarrationError::NoMatch { .. }) => {
                tracing::debug!(sentence, "Double click found no caption");
            }
            Err(e) => tracing::warn!(error = %e, "Double click seek failed"),
        }
        result
    }

    /// Cached definition for `word`, if it was looked up before.
    pub async fn cached(&self, word: &str) -> Option<serde_json::Value> {
        self.cache.lock().await.get(&normalize_word(word)).cloned()
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for WordClicks {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

async fn lookup_word(
    word: &str,
    dictionary: &dyn DictionaryLookup,
    cache: &Mutex<HashMap<String, serde_json::Value>>,
    event_tx: &mpsc::UnboundedSender<LookupEvent>,
) {
    let key = normalize_word(word);
    if key.is_empty() {
        return;
    }

    let cached = cache.lock().await.get(&key).cloned();
    if let Some(entry) = cached {
        let _ = event_tx.send(LookupEvent::Ready {
            word: word.to_string(),
            entry,
        });
        return;
    }

    let _ = event_tx.send(LookupEvent::Loading {
        word: word.to_string(),
    });
    let event = match dictionary.lookup(word).await {
        Ok(entry) => {
            cache.lock().await.insert(key, entry.clone());
            LookupEvent::Ready {
                word: word.to_string(),
                entry,
            }
        }
        Err(e) => {
            tracing::warn!(word, error = %e, "Dictionary lookup failed");
            LookupEvent::Failed {
                word: word.to_string(),
                message: e.to_string(),
            }
        }
    };
    let _ = event_tx.send(event);
}
