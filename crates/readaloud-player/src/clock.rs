//! Frame clock for the time-update loop.
//!
//! The clock only runs while armed. A disarmed clock's [`FrameClock::tick`]
//! never completes, so a `select!` branch on it costs nothing while paused
//! and no tick can outlive the session that armed it.

use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};

#[derive(Debug)]
pub struct FrameClock {
    period: Duration,
    interval: Option<Interval>,
}

impl FrameClock {
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Start ticking. The first tick fires one period from now.
    pub fn arm(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let start = tokio::time::Instant::now() + self.period;
        let mut interval = tokio::time::interval_at(start, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
    }

    pub fn disarm(&mut self) {
        self.interval = None;
    }

    /// Arm or disarm to match `running`.
    pub fn follow(&mut self, running: bool) {
        if running {
            self.arm();
        } else {
            self.disarm();
        }
    }

    /// Wait for the next frame; pends forever while disarmed.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_armed_clock_ticks_each_period() {
        let mut clock = FrameClock::new(Duration::from_millis(16));
        clock.arm();
        let start = tokio::time::Instant::now();
        clock.tick().await;
        clock.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(32));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_clock_never_ticks() {
        let mut clock = FrameClock::new(Duration::from_millis(16));
        clock.follow(false);
        assert!(!clock.is_armed());
        let result = tokio::time::timeout(Duration::from_secs(1), clock.tick()).await;
        assert!(result.is_err());
    }
}
