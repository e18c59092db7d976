//! Playback engine: the narration state machine.
//!
//! The engine is synchronous and owns every piece of session state. All
//! asynchronous work (fetching, the frame clock) lives in the actor in
//! [`crate::player`], which feeds results back through
//! [`PlaybackEngine::complete_load`] and [`PlaybackEngine::tick`].
//!
//! ```text
//!   Idle ─load─▶ Loading ─ok─▶ Paused ⇄ Playing
//!                  │  ▲
//!             fail ▼  │ load (retry)
//!                 Error
//! ```

use readaloud_core::{
    CaptionIndex, MediaBackend, Narration, NarrationError, PlaybackState, SessionToken,
    DEFAULT_RATE, RATE_LADDER, next_rate,
};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::events::PlayerEvent;
use crate::session::NarrationSession;

// ── Load bookkeeping ───────────────────────────────────────────────

/// What the caller must do after [`PlaybackEngine::begin_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPlan {
    /// The content is already loaded; nothing to fetch.
    Ready,

    /// Fetch the content and hand the result to
    /// [`PlaybackEngine::complete_load`] with this token.
    Fetch { token: SessionToken },
}

#[derive(Debug)]
struct PendingLoad {
    token: SessionToken,
    content: String,
    silent: bool,
}

/// Point-in-time view of the engine, for status displays and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub loading: bool,
    pub position: f64,
    pub duration: Option<f64>,
    pub rate: f32,
    pub looping: bool,
    pub preloaded: bool,
    pub active_caption: Option<usize>,
    pub caption_count: usize,
}

// ── Engine ─────────────────────────────────────────────────────────

/// Owns one media element at a time and drives it through the narration
/// lifecycle, reporting to observers through [`PlayerEvent`]s.
pub struct PlaybackEngine {
    state: PlaybackState,
    backend: Box<dyn MediaBackend>,
    pub(crate) session: Option<NarrationSession>,
    pending: Option<PendingLoad>,
    last_token: SessionToken,
    rate: f32,
    looping: bool,
    /// Caption last reported through `CurrentTextChanged`.
    active_caption: Option<usize>,
    event_tx: mpsc::UnboundedSender<PlayerEvent>,
}

impl PlaybackEngine {
    /// Create an idle engine.
    ///
    /// Returns the engine and a receiver for [`PlayerEvent`]s.
    #[must_use]
    pub fn new(backend: Box<dyn MediaBackend>) -> (Self, mpsc::UnboundedReceiver<PlayerEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let engine = Self {
            state: PlaybackState::Idle,
            backend,
            session: None,
            pending: None,
            last_token: SessionToken::ZERO,
            rate: DEFAULT_RATE,
            looping: false,
            active_caption: None,
            event_tx,
        };
        (engine, event_rx)
    }

    // ── Accessors ──────────────────────────────────────────────────

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub const fn rate(&self) -> f32 {
        self.rate
    }

    #[must_use]
    pub const fn is_looping(&self) -> bool {
        self.looping
    }

    /// Token of the load currently in flight.
    #[must_use]
    pub fn pending_token(&self) -> Option<SessionToken> {
        self.pending.as_ref().map(|p| p.token)
    }

    /// Text of the loaded session, if any.
    #[must_use]
    pub fn loaded_content(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.content.as_str())
    }

    /// Token of the loaded session, if any.
    #[must_use]
    pub fn session_token(&self) -> Option<SessionToken> {
        self.session.as_ref().map(|s| s.token)
    }

    /// Captions of the loaded session, if any.
    #[must_use]
    pub fn captions(&self) -> Option<&CaptionIndex> {
        self.session.as_ref().map(|s| &s.index)
    }

    /// Current playback position (0 without a session).
    pub fn position(&mut self) -> f64 {
        self.session
            .as_mut()
            .map_or(0.0, |s| s.media.current_time())
    }

    #[must_use]
    pub fn duration(&self) -> Option<f64> {
        self.session.as_ref().and_then(NarrationSession::duration)
    }

    pub fn snapshot(&mut self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            loading: self.is_loading(),
            position: self.position(),
            duration: self.duration(),
            rate: self.rate,
            looping: self.looping,
            preloaded: self.session.as_ref().is_some_and(|s| s.preloaded),
            active_caption: self.active_caption,
            caption_count: self.session.as_ref().map_or(0, |s| s.index.len()),
        }
    }

    // ── Loading ────────────────────────────────────────────────────

    /// Request a session for `content`.
    ///
    /// Content identical to the loaded session is not fetched again. Any
    /// other request releases the current session and issues a fresh
    /// token, superseding whatever load was in flight: the newest request
    /// always wins.
    pub fn begin_load(&mut self, content: &str, silent: bool) -> LoadPlan {
        if let Some(session) = self.session.as_mut() {
            if session.holds(content) {
                if !silent {
                    session.preloaded = false;
                }
                tracing::debug!(token = %session.token, "Content already loaded");
                return LoadPlan::Ready;
            }
        }

        self.release_session();

        let token = self.last_token.next();
        self.last_token = token;
        if let Some(superseded) = self.pending.replace(PendingLoad {
            token,
            content: content.to_string(),
            silent,
        }) {
            tracing::debug!(old = %superseded.token, new = %token, "Load superseded");
        } else {
            self.emit(PlayerEvent::LoadingChanged { loading: true });
        }

        tracing::info!(%token, silent, chars = content.chars().count(), "Loading narration");
        self.set_state(PlaybackState::Loading);
        LoadPlan::Fetch { token }
    }

    /// Apply the result of the fetch issued for `token`.
    ///
    /// Results for any token other than the newest pending one are
    /// discarded with [`NarrationError::Cancelled`] and leave the engine
    /// untouched.
    pub fn complete_load(
        &mut self,
        token: SessionToken,
        result: Result<Narration, NarrationError>,
    ) -> Result<(), NarrationError> {
        let Some(pending) = self.pending.take_if(|p| p.token == token) else {
            tracing::debug!(%token, "Discarding stale narration result");
            return Err(NarrationError::Cancelled);
        };
        self.emit(PlayerEvent::LoadingChanged { loading: false });

        let narration = match result {
            Ok(narration) => narration,
            Err(e) => {
                tracing::warn!(%token, error = %e, "Narration fetch failed");
                self.enter_error(&e);
                return Err(e);
            }
        };

        let mut media = match self.backend.open(&narration.audio, narration.duration_hint) {
            Ok(media) => media,
            Err(e) => {
                tracing::error!(%token, error = %e, "Failed to open narration audio");
                self.enter_error(&e);
                return Err(e);
            }
        };
        media.set_playback_rate(self.rate);
        media.set_looping(self.looping);

        let index = CaptionIndex::from_captions(narration.captions);
        tracing::info!(
            %token,
            captions = index.len(),
            duration = narration.duration_hint,
            "Narration session ready"
        );

        self.session = Some(NarrationSession {
            token,
            content: pending.content,
            media,
            index,
            duration_hint: narration.duration_hint,
            preloaded: pending.silent,
        });
        self.active_caption = None;
        self.set_state(PlaybackState::Paused);
        self.observe(0.0);
        Ok(())
    }

    // ── Transport ──────────────────────────────────────────────────

    /// Start or resume playback. Requires a loaded session.
    pub fn play(&mut self) -> Result<(), NarrationError> {
        let Some(session) = self.session.as_mut() else {
            return Err(NarrationError::NotReady);
        };
        if self.state == PlaybackState::Playing {
            return Ok(());
        }
        session.preloaded = false;
        if let Err(e) = session.media.play() {
            self.fail_playback(&e);
            return Err(e);
        }
        self.set_state(PlaybackState::Playing);
        Ok(())
    }

    /// Pause, keeping the position. No-op unless playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.media.pause();
        }
        self.set_state(PlaybackState::Paused);
    }

    /// Play when paused, pause when playing.
    pub fn toggle(&mut self) -> Result<(), NarrationError> {
        if self.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Move to `seconds`, clamped to `[0, duration]`.
    ///
    /// Playback continues from the new position if it was running. Returns
    /// the position actually applied.
    pub fn seek(&mut self, seconds: f64) -> Result<f64, NarrationError> {
        let Some(session) = self.session.as_mut() else {
            return Err(NarrationError::NotReady);
        };
        let upper = session.duration().unwrap_or(f64::INFINITY);
        let target = if seconds.is_finite() {
            seconds.clamp(0.0, upper)
        } else {
            0.0
        };

        if let Err(e) = session.media.seek(target) {
            self.fail_playback(&e);
            return Err(e);
        }
        tracing::debug!(requested = seconds, applied = target, "Seek");
        self.observe(target);
        Ok(target)
    }

    /// Advance to the next rung of the rate ladder and apply it live.
    pub fn cycle_rate(&mut self) -> f32 {
        self.apply_rate(next_rate(self.rate))
    }

    /// Set the rate to the ladder rung closest to `rate`.
    pub fn set_rate(&mut self, rate: f32) -> f32 {
        let snapped = RATE_LADDER
            .iter()
            .copied()
            .min_by(|a, b| (a - rate).abs().total_cmp(&(b - rate).abs()))
            .unwrap_or(DEFAULT_RATE);
        self.apply_rate(snapped)
    }

    fn apply_rate(&mut self, rate: f32) -> f32 {
        self.rate = rate;
        if let Some(session) = self.session.as_mut() {
            session.media.set_playback_rate(rate);
        }
        tracing::debug!(rate, "Playback rate changed");
        self.emit(PlayerEvent::RateChanged { rate });
        rate
    }

    /// Toggle continuous single-track repeat.
    pub fn set_loop(&mut self, looping: bool) {
        if self.looping == looping {
            return;
        }
        self.looping = looping;
        if let Some(session) = self.session.as_mut() {
            session.media.set_looping(looping);
        }
        self.emit(PlayerEvent::LoopChanged { looping });
    }

    /// Release the session, forget any in-flight load and return to idle.
    ///
    /// Always tells the observer that no caption is active.
    pub fn close(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(token = %pending.token, "Abandoning in-flight load");
            self.emit(PlayerEvent::LoadingChanged { loading: false });
        }
        if let Some(session) = self.session.take() {
            tracing::info!(token = %session.token, "Closing narration session");
        }
        self.active_caption = None;
        self.set_state(PlaybackState::Idle);
        self.emit(PlayerEvent::CurrentTextChanged {
            text: String::new(),
        });
        self.emit(PlayerEvent::Progress {
            position: 0.0,
            duration: None,
            sentence: 0,
            total: 0,
        });
    }

    // ── Frame tick ─────────────────────────────────────────────────

    /// Per-frame time update. Does nothing unless playing.
    ///
    /// Emits `Progress` every call and `CurrentTextChanged` only when the
    /// active caption changes. Handles the end of the track.
    pub fn tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let position = session.media.current_time();
        if session.media.has_ended() {
            self.finish_track();
            return;
        }
        self.observe(position);
    }

    /// Natural end of the track without loop: park at zero, paused.
    fn finish_track(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.media.pause();
        if let Err(e) = session.media.seek(0.0) {
            self.fail_playback(&e);
            return;
        }
        tracing::debug!("Narration finished");
        self.set_state(PlaybackState::Paused);
        // Cleared even when the first caption starts at zero; the next
        // play re-highlights it on its first tick.
        self.active_caption = None;
        self.emit(PlayerEvent::CurrentTextChanged {
            text: String::new(),
        });
        self.emit_progress(0.0);
    }

    /// Surface a media failure: the session is gone, retry by loading.
    pub fn fail_playback(&mut self, error: &NarrationError) {
        tracing::error!(error = %error, "Narration playback failed");
        self.release_session();
        self.enter_error(error);
    }

    // ── Internal helpers ───────────────────────────────────────────

    /// Report the caption at `position` (change-only) and the progress.
    fn observe(&mut self, position: f64) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let index = session.index.index_at(position);
        if index != self.active_caption {
            self.active_caption = index;
            let text = index
                .and_then(|i| session.index.get(i))
                .map(|c| c.text.clone())
                .unwrap_or_default();
            self.emit(PlayerEvent::CurrentTextChanged { text });
        }
        self.emit_progress(position);
    }

    /// Report the position; the sentence counter is the number of captions
    /// already started.
    fn emit_progress(&self, position: f64) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let sentence = session
            .index
            .iter()
            .take_while(|c| c.start <= position)
            .count();
        self.emit(PlayerEvent::Progress {
            position,
            duration: session.duration(),
            sentence,
            total: session.index.len(),
        });
    }

    /// Drop the current session, clearing the highlight if one was shown.
    fn release_session(&mut self) {
        if self.session.take().is_some() && self.active_caption.take().is_some() {
            self.emit(PlayerEvent::CurrentTextChanged {
                text: String::new(),
            });
        }
        self.active_caption = None;
    }

    fn enter_error(&mut self, error: &NarrationError) {
        self.set_state(PlaybackState::Error);
        self.emit(PlayerEvent::Error {
            message: error.to_string(),
        });
    }

    fn set_state(&mut self, new_state: PlaybackState) {
        if self.state != new_state {
            tracing::debug!(old = ?self.state, new = ?new_state, "Player state transition");
            self.state = new_state;
            self.emit(PlayerEvent::StateChanged { state: new_state });
        }
    }

    /// Emit a player event (best-effort: a dropped receiver is not an error).
    fn emit(&self, event: PlayerEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("Player event receiver dropped");
        }
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("pending", &self.pending)
            .field("rate", &self.rate)
            .field("looping", &self.looping)
            .finish_non_exhaustive()
    }
}
