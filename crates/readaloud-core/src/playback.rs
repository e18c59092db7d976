//! Playback domain types shared by the engine and its observers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed playback rate ladder, cycled in order.
pub const RATE_LADDER: [f32; 5] = [0.75, 1.0, 1.25, 1.5, 2.0];

/// Rate a fresh session starts at.
pub const DEFAULT_RATE: f32 = 1.0;

/// Next rung on [`RATE_LADDER`] after `current`, wrapping around.
///
/// A rate that is not on the ladder restarts it from the bottom.
#[must_use]
pub fn next_rate(current: f32) -> f32 {
    #[allow(clippy::float_cmp)]
    let position = RATE_LADDER.iter().position(|&r| r == current);
    match position {
        Some(i) => RATE_LADDER[(i + 1) % RATE_LADDER.len()],
        None => RATE_LADDER[0],
    }
}

/// Lifecycle of the narration player.
///
/// ```text
///   Idle → Loading → Paused ⇄ Playing
///            │  ▲
///            ▼  │ (retry)
///           Error
/// ```
///
/// Any state returns to `Idle` on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackState {
    /// No session.
    Idle,

    /// A narration fetch is in flight.
    Loading,

    /// Session ready, not playing.
    Paused,

    /// Session ready and audible.
    Playing,

    /// The last fetch or the media resource failed; retry by loading again.
    Error,
}

impl PlaybackState {
    /// Whether a session is loaded (`Paused` or `Playing`).
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Paused | Self::Playing)
    }
}

/// Identity of one load request / narration session.
///
/// Tokens increase monotonically per player. A fetch result is applied only
/// when its token is still the newest one issued, so a slow preload can never
/// clobber a session started after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    /// The token preceding every issued token.
    pub const ZERO: Self = Self(0);

    /// The token after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn rate_ladder_is_a_closed_loop() {
        let mut rate = DEFAULT_RATE;
        let mut seen = Vec::new();
        for _ in 0..5 {
            rate = next_rate(rate);
            seen.push(rate);
        }
        assert_eq!(seen, vec![1.25, 1.5, 2.0, 0.75, 1.0]);
        assert_eq!(rate, DEFAULT_RATE);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn off_ladder_rate_restarts_at_bottom() {
        assert_eq!(next_rate(1.1), 0.75);
    }

    #[test]
    fn ready_states() {
        assert!(PlaybackState::Paused.is_ready());
        assert!(PlaybackState::Playing.is_ready());
        assert!(!PlaybackState::Loading.is_ready());
        assert!(!PlaybackState::Idle.is_ready());
        assert!(!PlaybackState::Error.is_ready());
    }

    #[test]
    fn tokens_are_monotonic() {
        let first = SessionToken::ZERO.next();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.to_string(), "#2");
    }
}
