//! Text normalisation for fuzzy caption matching and speech preparation.
//!
//! Synthesized captions rarely reproduce the source text byte-for-byte: the
//! TTS engine inserts or drops punctuation, re-spaces clauses, and never
//! speaks the inline translation glosses that articles carry. Everything in
//! this module turns text into a form where those differences vanish.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum length (in UTF-8 bytes) a normalized fragment must exceed before
/// it is allowed to match anything.
///
/// A single Hangul syllable is three bytes, so a one-syllable fragment such
/// as `"그"` never matches while any two-syllable word does.
pub const MIN_MATCH_KEY_LEN: usize = 4;

/// Whitespace, Unicode punctuation (smart quotes included) and the CJK
/// ideograph blocks used for translation glosses.
static MATCH_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\p{P}\x{4E00}-\x{9FFF}\x{3400}-\x{4DBF}]").expect("static regex is valid")
});

static IDEOGRAPHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{4E00}-\x{9FFF}\x{3400}-\x{4DBF}]").expect("static regex is valid")
});

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex is valid"));

/// Anything that is not a Latin letter, a Hangul jamo or a Hangul syllable.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z\x{00C0}-\x{024F}\x{3130}-\x{318F}\x{AC00}-\x{D7A3}]")
        .expect("static regex is valid")
});

/// Build the comparison key for a span of text.
///
/// Removes all whitespace, punctuation and incidental CJK ideographs, then
/// lowercases what is left. Pure and total: any input yields a key, possibly
/// empty.
#[must_use]
pub fn normalize(text: &str) -> String {
    MATCH_NOISE.replace_all(text, "").to_lowercase()
}

/// Symmetric containment test between two comparison keys.
///
/// Matches when either key contains the other, provided the fragment key is
/// longer than [`MIN_MATCH_KEY_LEN`] and the candidate key is non-empty.
#[must_use]
pub fn keys_overlap(fragment_key: &str, candidate_key: &str) -> bool {
    if fragment_key.len() <= MIN_MATCH_KEY_LEN || candidate_key.is_empty() {
        return false;
    }
    candidate_key.contains(fragment_key) || fragment_key.contains(candidate_key)
}

/// Prepare article text for synthesis.
///
/// Strips ideographs (translation glosses must not be spoken), turns line
/// breaks into spaces and collapses whitespace runs.
#[must_use]
pub fn sanitize_for_speech(text: &str) -> String {
    let without_glosses = IDEOGRAPHS.replace_all(text, "");
    WHITESPACE_RUNS
        .replace_all(&without_glosses, " ")
        .trim()
        .to_string()
}

/// Truncate to at most `max_chars` characters, never splitting a character.
///
/// Returns the input unchanged when it already fits.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Normalize a clicked word into a dictionary cache key.
///
/// Keeps only Latin letters and Hangul; an empty result means the token is
/// not a word at all (punctuation, digits, glosses).
#[must_use]
pub fn normalize_word(word: &str) -> String {
    NON_WORD.replace_all(&word.to_lowercase(), "").into_owned()
}

/// Whether a character is a Hangul syllable or compatibility jamo.
#[must_use]
pub const fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7A3}' | '\u{3130}'..='\u{318F}')
}

/// Whether a character belongs to the CJK unified ideograph blocks.
#[must_use]
pub const fn is_ideograph(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}
