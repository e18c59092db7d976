//! Dedicated audio thread: keeps `!Send` rodio resources off the runtime.
//!
//! `rodio::OutputStream` is `!Send` on some platforms. Each opened narration
//! gets one OS thread that owns the output stream, the sink and the encoded
//! bytes; the [`AudioThreadHandle`] proxies every media operation to it
//! through a channel.

use std::io::Cursor;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use readaloud_core::NarrationError;
use rodio::{Decoder, OutputStream, Sink, Source};

// ── Commands ───────────────────────────────────────────────────────

enum AudioCommand {
    Play {
        reply: mpsc::Sender<Result<(), NarrationError>>,
    },
    Pause,
    IsPaused { reply: mpsc::Sender<bool> },
    /// Current position in seconds; restarts the track when looping.
    Position { reply: mpsc::Sender<f64> },
    Seek {
        seconds: f64,
        reply: mpsc::Sender<Result<(), NarrationError>>,
    },
    SetSpeed { speed: f32 },
    SetLooping { looping: bool },
    HasEnded { reply: mpsc::Sender<bool> },
    Shutdown,
}

// ── Handle ─────────────────────────────────────────────────────────

/// `Send` handle to one narration's audio thread.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    duration: Option<f64>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread, open the default output device and decode
    /// the header of `bytes`.
    ///
    /// Device and decode errors are propagated back through an init channel.
    pub fn spawn(bytes: Vec<u8>, duration_hint: Option<f64>) -> Result<Self, NarrationError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<Option<f64>, NarrationError>>();

        let thread = thread::Builder::new()
            .name("readaloud-audio".into())
            .spawn(move || Self::run(bytes, &cmd_rx, &init_tx))
            .map_err(|e| NarrationError::Playback(format!("failed to spawn audio thread: {e}")))?;

        let decoded = init_rx.recv().map_err(|_| NarrationError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            duration: decoded.or(duration_hint),
            thread: Some(thread),
        })
    }

    pub const fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn play(&self) -> Result<(), NarrationError> {
        self.send_and_recv(|reply| AudioCommand::Play { reply })
    }

    pub fn pause(&self) {
        let _ = self.cmd_tx.send(AudioCommand::Pause);
    }

    pub fn is_paused(&self) -> bool {
        self.query(|reply| AudioCommand::IsPaused { reply })
            .unwrap_or(true)
    }

    pub fn position(&self) -> f64 {
        self.query(|reply| AudioCommand::Position { reply })
            .unwrap_or(0.0)
    }

    pub fn seek(&self, seconds: f64) -> Result<(), NarrationError> {
        self.send_and_recv(|reply| AudioCommand::Seek { seconds, reply })
    }

    pub fn set_speed(&self, speed: f32) {
        let _ = self.cmd_tx.send(AudioCommand::SetSpeed { speed });
    }

    pub fn set_looping(&self, looping: bool) {
        let _ = self.cmd_tx.send(AudioCommand::SetLooping { looping });
    }

    pub fn has_ended(&self) -> bool {
        self.query(|reply| AudioCommand::HasEnded { reply })
            .unwrap_or(true)
    }

    // ── Internal helpers ───────────────────────────────────────────

    /// Channel failures map to [`NarrationError::AudioThreadDied`].
    fn send_and_recv<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<Result<T, NarrationError>>) -> AudioCommand,
    ) -> Result<T, NarrationError> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx
            .send(build(tx))
            .map_err(|_| NarrationError::AudioThreadDied)?;
        rx.recv().map_err(|_| NarrationError::AudioThreadDied)?
    }

    /// Returns `None` if the thread is dead.
    fn query<T>(&self, build: impl FnOnce(mpsc::Sender<T>) -> AudioCommand) -> Option<T> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx.send(build(tx)).ok()?;
        rx.recv().ok()
    }

    // ── Audio thread event loop ────────────────────────────────────

    fn run(
        bytes: Vec<u8>,
        cmd_rx: &mpsc::Receiver<AudioCommand>,
        init_tx: &mpsc::Sender<Result<Option<f64>, NarrationError>>,
    ) {
        let mut track = match Track::open(bytes) {
            Ok(track) => track,
            Err(e) => {
                let _ = init_tx.send(Err(e));
                return;
            }
        };

        if init_tx.send(Ok(track.duration)).is_err() {
            return;
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::Play { reply } => {
                    let _ = reply.send(track.play());
                }
                AudioCommand::Pause => track.sink.pause(),
                AudioCommand::IsPaused { reply } => {
                    let _ = reply.send(track.sink.is_paused());
                }
                AudioCommand::Position { reply } => {
                    let _ = reply.send(track.position());
                }
                AudioCommand::Seek { seconds, reply } => {
                    let _ = reply.send(track.seek(seconds));
                }
                AudioCommand::SetSpeed { speed } => track.sink.set_speed(speed.max(0.1)),
                AudioCommand::SetLooping { looping } => track.looping = looping,
                AudioCommand::HasEnded { reply } => {
                    let _ = reply.send(track.has_ended());
                }
                AudioCommand::Shutdown => break,
            }
        }

        track.sink.stop();
        tracing::debug!("Audio thread shutting down");
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

// ── Track (audio-thread side) ──────────────────────────────────────

/// Output stream, sink and source bytes of one narration.
struct Track {
    _stream: OutputStream,
    sink: Sink,
    bytes: Vec<u8>,
    duration: Option<f64>,
    looping: bool,
}

impl Track {
    fn open(bytes: Vec<u8>) -> Result<Self, NarrationError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| NarrationError::Playback(e.to_string()))?;
        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| NarrationError::Playback(e.to_string()))?;
        sink.pause();

        let mut track = Self {
            _stream: stream,
            sink,
            bytes,
            duration: None,
            looping: false,
        };
        track.duration = track.enqueue()?;
        tracing::debug!(duration = ?track.duration, "Narration audio decoded");
        Ok(track)
    }

    /// Append a fresh decoder over the bytes. Returns the decoded duration.
    fn enqueue(&self) -> Result<Option<f64>, NarrationError> {
        let decoder = Decoder::new(Cursor::new(self.bytes.clone()))
            .map_err(|e| NarrationError::Playback(format!("undecodable audio: {e}")))?;
        let duration = decoder.total_duration().map(|d| d.as_secs_f64());
        self.sink.append(decoder);
        Ok(duration)
    }

    fn play(&mut self) -> Result<(), NarrationError> {
        if self.sink.empty() {
            self.enqueue()?;
        }
        self.sink.play();
        Ok(())
    }

    fn position(&mut self) -> f64 {
        if self.sink.empty() {
            if self.looping && !self.sink.is_paused() && self.enqueue().is_ok() {
                return 0.0;
            }
            return self.duration.unwrap_or(0.0);
        }
        self.sink.get_pos().as_secs_f64()
    }

    fn seek(&mut self, seconds: f64) -> Result<(), NarrationError> {
        if self.sink.empty() {
            self.enqueue()?;
        }
        let upper = self.duration.unwrap_or(f64::MAX);
        let target = Duration::try_from_secs_f64(seconds.clamp(0.0, upper))
            .map_err(|e| NarrationError::Playback(format!("invalid seek target {seconds}: {e}")))?;
        self.sink
            .try_seek(target)
            .map_err(|e| NarrationError::Playback(format!("seek failed: {e}")))
    }

    fn has_ended(&mut self) -> bool {
        if self.looping {
            // Let `position` restart the track.
            let _ = self.position();
            return false;
        }
        self.sink.empty()
    }
}
