//! Narration player actor.
//!
//! One tokio task owns the [`PlaybackEngine`] for its whole lifetime and
//! serializes every operation on it: commands from [`PlayerHandle`]s, fetch
//! completions and frame ticks are handled one at a time in a `select!`
//! loop, so the engine needs no locks. Fetches run as separate tasks tagged
//! with the [`SessionToken`] of the load that issued them; the engine drops
//! any result whose token is no longer current.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt as _;
use readaloud_core::{
    Caption, MediaBackend, Narration, NarrationError, NarrationSource, SessionToken,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::clock::FrameClock;
use crate::config::PlayerConfig;
use crate::engine::{LoadPlan, PlaybackEngine, PlayerSnapshot};
use crate::events::PlayerEvent;

type Reply<T> = oneshot::Sender<Result<T, NarrationError>>;

// ── Commands ───────────────────────────────────────────────────────

/// A command sent from a handle to the player task.
enum Command {
    SetContent { content: String },
    Preload { content: String, reply: Reply<()> },
    Play { reply: Reply<()> },
    Pause,
    Toggle { reply: Reply<()> },
    Seek { seconds: f64, reply: Reply<f64> },
    CycleRate { reply: oneshot::Sender<f32> },
    SetRate { rate: f32, reply: oneshot::Sender<f32> },
    SetLoop { looping: bool },
    SeekToText { fragment: String, reply: Reply<usize> },
    PrevSentence { reply: Reply<Option<usize>> },
    NextSentence { reply: Reply<Option<usize>> },
    Close,
    Snapshot { reply: oneshot::Sender<PlayerSnapshot> },
    Captions { reply: oneshot::Sender<Vec<Caption>> },
}

/// Work deferred until the load a caller is waiting on lands.
enum AfterLoad {
    /// Background preload nobody awaits.
    Nothing,
    /// Preload: report readiness.
    Ready(Reply<()>),
    /// Implicit load from `play`/`toggle`.
    Play(Reply<()>),
    /// Implicit load from `seek_to_text`.
    SeekToText { fragment: String, reply: Reply<usize> },
}

impl AfterLoad {
    fn fail(self, error: NarrationError) {
        match self {
            Self::Nothing => {}
            Self::Ready(reply) | Self::Play(reply) => {
                let _ = reply.send(Err(error));
            }
            Self::SeekToText { reply, .. } => {
                let _ = reply.send(Err(error));
            }
        }
    }
}

struct Waiter {
    token: SessionToken,
    content: String,
    then: AfterLoad,
}

// ── Controls exposed to the reading surface ────────────────────────

/// The control surface handed to the reading view once the player exists.
#[async_trait]
pub trait NarrationControls: Send + Sync {
    /// Play from the caption matching `fragment`, loading first if needed.
    async fn seek_to_text(&self, fragment: &str) -> Result<usize, NarrationError>;
}

// ── Handle ─────────────────────────────────────────────────────────

/// Cloneable handle to a running [`NarrationPlayer`].
///
/// Methods that report a result wait for the player task to process the
/// command; the rest are fire-and-forget. Once the player has shut down,
/// every call fails with [`NarrationError::Cancelled`].
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
}

impl PlayerHandle {
    /// Replace the text the player narrates.
    ///
    /// The loaded session is kept until the next load; with
    /// `auto_preload` a silent preload starts right away.
    pub fn set_content(&self, content: impl Into<String>) {
        self.send(Command::SetContent {
            content: content.into(),
        });
    }

    /// Set the content and fetch it without starting playback.
    pub async fn preload(&self, content: impl Into<String>) -> Result<(), NarrationError> {
        let content = content.into();
        self.send_and_recv(|reply| Command::Preload { content, reply })
            .await
    }

    /// Start playback, loading the current content first when needed.
    pub async fn play(&self) -> Result<(), NarrationError> {
        self.send_and_recv(|reply| Command::Play { reply }).await
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    pub async fn toggle(&self) -> Result<(), NarrationError> {
        self.send_and_recv(|reply| Command::Toggle { reply }).await
    }

    /// Seek within the loaded session. Returns the clamped position.
    pub async fn seek(&self, seconds: f64) -> Result<f64, NarrationError> {
        self.send_and_recv(|reply| Command::Seek { seconds, reply })
            .await
    }

    /// Advance the playback rate ladder. Returns the new rate.
    pub async fn cycle_rate(&self) -> Result<f32, NarrationError> {
        self.query(|reply| Command::CycleRate { reply }).await
    }

    /// Snap to the ladder rung closest to `rate`. Returns the applied rate.
    pub async fn set_rate(&self, rate: f32) -> Result<f32, NarrationError> {
        self.query(|reply| Command::SetRate { rate, reply }).await
    }

    pub fn set_loop(&self, looping: bool) {
        self.send(Command::SetLoop { looping });
    }

    pub async fn prev_sentence(&self) -> Result<Option<usize>, NarrationError> {
        self.send_and_recv(|reply| Command::PrevSentence { reply })
            .await
    }

    pub async fn next_sentence(&self) -> Result<Option<usize>, NarrationError> {
        self.send_and_recv(|reply| Command::NextSentence { reply })
            .await
    }

    /// Release the session and abandon any in-flight load.
    pub fn close(&self) {
        self.send(Command::Close);
    }

    pub async fn snapshot(&self) -> Result<PlayerSnapshot, NarrationError> {
        self.query(|reply| Command::Snapshot { reply }).await
    }

    /// Captions of the loaded session (empty without one).
    pub async fn captions(&self) -> Result<Vec<Caption>, NarrationError> {
        self.query(|reply| Command::Captions { reply }).await
    }

    /// Stop the player task. Outstanding requests fail with `Cancelled`.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("Narration player is gone; command dropped");
        }
    }

    /// Send a command that expects a `Result<T, NarrationError>` reply.
    async fn send_and_recv<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, NarrationError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .map_err(|_| NarrationError::Cancelled)?;
        rx.await.map_err(|_| NarrationError::Cancelled)?
    }

    /// Like `send_and_recv` but for replies without a `Result` wrapper.
    async fn query<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, NarrationError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .map_err(|_| NarrationError::Cancelled)?;
        rx.await.map_err(|_| NarrationError::Cancelled)
    }
}

#[async_trait]
impl NarrationControls for PlayerHandle {
    async fn seek_to_text(&self, fragment: &str) -> Result<usize, NarrationError> {
        let fragment = fragment.to_string();
        self.send_and_recv(|reply| Command::SeekToText { fragment, reply })
            .await
    }
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("closed", &self.commands.is_closed())
            .finish_non_exhaustive()
    }
}

// ── Player ─────────────────────────────────────────────────────────

/// A running narration player.
pub struct NarrationPlayer {
    handle: PlayerHandle,
    task: JoinHandle<()>,
}

impl NarrationPlayer {
    /// Spawn the player task on the current tokio runtime.
    ///
    /// Returns the player and a receiver for [`PlayerEvent`]s.
    pub fn spawn(
        config: PlayerConfig,
        source: Arc<dyn NarrationSource>,
        backend: Box<dyn MediaBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<PlayerEvent>) {
        let (engine, events) = PlaybackEngine::new(backend);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let actor = PlayerActor {
            engine,
            source,
            clock: FrameClock::new(config.frame_interval),
            config,
            content: String::new(),
            commands: commands_rx,
            fetches: JoinSet::new(),
            waiters: Vec::new(),
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(actor.run());

        let handle = PlayerHandle {
            commands: commands_tx,
            cancel,
        };
        (Self { handle, task }, events)
    }

    /// A new handle to this player.
    #[must_use]
    pub fn handle(&self) -> PlayerHandle {
        self.handle.clone()
    }

    /// Stop the player task and wait for it to release its session.
    pub async fn shutdown(self) {
        self.handle.shutdown();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Narration player task ended abnormally");
        }
    }
}

// ── Actor ──────────────────────────────────────────────────────────

struct PlayerActor {
    engine: PlaybackEngine,
    source: Arc<dyn NarrationSource>,
    config: PlayerConfig,
    /// Text the next load will fetch.
    content: String,
    commands: mpsc::UnboundedReceiver<Command>,
    fetches: JoinSet<(SessionToken, Result<Narration, NarrationError>)>,
    waiters: Vec<Waiter>,
    clock: FrameClock,
    cancel: CancellationToken,
}

impl PlayerActor {
    async fn run(mut self) {
        tracing::debug!("Narration player started");

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,

                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle(command);
                }

                Some(joined) = self.fetches.join_next(), if !self.fetches.is_empty() => {
                    self.on_fetch_done(joined);
                }

                () = self.clock.tick() => self.engine.tick(),
            }

            // Ticks run only while audible.
            self.clock.follow(self.engine.is_playing());
        }

        self.close();
        tracing::debug!("Narration player stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetContent { content } => {
                self.content = content;
                if self.config.auto_preload && !self.content.trim().is_empty() {
                    self.load_then(true, AfterLoad::Nothing);
                }
            }

            Command::Preload { content, reply } => {
                self.content = content;
                self.load_then(true, AfterLoad::Ready(reply));
            }

            Command::Play { reply } => self.load_then(false, AfterLoad::Play(reply)),

            Command::Pause => self.engine.pause(),

            Command::Toggle { reply } => {
                if self.engine.is_playing() {
                    self.engine.pause();
                    let _ = reply.send(Ok(()));
                } else {
                    self.load_then(false, AfterLoad::Play(reply));
                }
            }

            Command::Seek { seconds, reply } => {
                let _ = reply.send(self.engine.seek(seconds));
            }

            Command::CycleRate { reply } => {
                let _ = reply.send(self.engine.cycle_rate());
            }

            Command::SetRate { rate, reply } => {
                let _ = reply.send(self.engine.set_rate(rate));
            }

            Command::SetLoop { looping } => self.engine.set_loop(looping),

            Command::SeekToText { fragment, reply } => {
                self.load_then(false, AfterLoad::SeekToText { fragment, reply });
            }

            Command::PrevSentence { reply } => {
                let _ = reply.send(self.engine.prev_sentence());
            }

            Command::NextSentence { reply } => {
                let _ = reply.send(self.engine.next_sentence());
            }

            Command::Close => self.close(),

            Command::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }

            Command::Captions { reply } => {
                let captions = self
                    .engine
                    .captions()
                    .map(|index| index.iter().cloned().collect())
                    .unwrap_or_default();
                let _ = reply.send(captions);
            }
        }
    }

    /// Make sure the current content is loaded, then run `then`.
    fn load_then(&mut self, silent: bool, then: AfterLoad) {
        let content = self.content.clone();
        match self.engine.begin_load(&content, silent) {
            LoadPlan::Ready => self.run_after(then),
            LoadPlan::Fetch { token } => {
                self.retarget_waiters(token, &content);
                self.spawn_fetch(token, content.clone());
                self.waiters.push(Waiter {
                    token,
                    content,
                    then,
                });
            }
        }
    }

    /// Callers waiting on the same content follow the newest load; the
    /// rest were superseded.
    fn retarget_waiters(&mut self, token: SessionToken, content: &str) {
        for waiter in std::mem::take(&mut self.waiters) {
            if waiter.content == content {
                self.waiters.push(Waiter { token, ..waiter });
            } else {
                waiter.then.fail(NarrationError::Cancelled);
            }
        }
    }

    fn spawn_fetch(&mut self, token: SessionToken, content: String) {
        let source = Arc::clone(&self.source);
        let voice = self.config.voice.clone();
        self.fetches.spawn(async move {
            let fetch = async { source.fetch(&content, &voice).await };
            let result = AssertUnwindSafe(fetch)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(NarrationError::fetch_failed("narration source panicked")));
            (token, result)
        });
    }

    fn on_fetch_done(
        &mut self,
        joined: Result<(SessionToken, Result<Narration, NarrationError>), JoinError>,
    ) {
        let (token, result) = match joined {
            Ok(done) => done,
            Err(e) if e.is_cancelled() => return,
            Err(e) => {
                tracing::error!(error = %e, "Narration fetch task failed");
                return;
            }
        };

        let outcome = self.engine.complete_load(token, result);
        let (ready, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.waiters)
            .into_iter()
            .partition(|w| w.token == token);
        self.waiters = rest;

        for waiter in ready {
            match &outcome {
                Ok(()) => self.run_after(waiter.then),
                Err(e) => waiter.then.fail(e.clone()),
            }
        }
    }

    fn run_after(&mut self, then: AfterLoad) {
        match then {
            AfterLoad::Nothing => {}
            AfterLoad::Ready(reply) => {
                let _ = reply.send(Ok(()));
            }
            AfterLoad::Play(reply) => {
                let _ = reply.send(self.engine.play());
            }
            AfterLoad::SeekToText { fragment, reply } => {
                let _ = reply.send(self.engine.seek_to_fragment(&fragment));
            }
        }
    }

    fn close(&mut self) {
        self.fetches.abort_all();
        for waiter in std::mem::take(&mut self.waiters) {
            waiter.then.fail(NarrationError::Cancelled);
        }
        self.engine.close();
        self.clock.disarm();
    }
}
