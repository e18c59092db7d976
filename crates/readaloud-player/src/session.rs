//! One loaded piece of narration.

use readaloud_core::{CaptionIndex, MediaElement, SessionToken};

/// Audio resource plus captions for one narration text.
///
/// Replaced wholesale when the content changes; never patched in place.
/// Dropping it releases the media element.
pub struct NarrationSession {
    pub(crate) token: SessionToken,
    pub(crate) content: String,
    pub(crate) media: Box<dyn MediaElement>,
    pub(crate) index: CaptionIndex,
    pub(crate) duration_hint: Option<f64>,
    /// Fetched but not yet started by the user.
    pub(crate) preloaded: bool,
}

impl NarrationSession {
    /// Total duration: the media's own, else the fetcher's hint.
    pub(crate) fn duration(&self) -> Option<f64> {
        let usable = |d: &f64| d.is_finite() && *d > 0.0;
        self.media
            .duration()
            .filter(usable)
            .or_else(|| self.duration_hint.filter(usable))
    }

    pub(crate) fn holds(&self, content: &str) -> bool {
        self.content == content
    }
}

impl std::fmt::Debug for NarrationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrationSession")
            .field("token", &self.token)
            .field("content_len", &self.content.len())
            .field("captions", &self.index.len())
            .field("duration_hint", &self.duration_hint)
            .field("preloaded", &self.preloaded)
            .finish_non_exhaustive()
    }
}
