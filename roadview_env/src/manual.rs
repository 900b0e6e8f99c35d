//! Virtual-clock implementation of TickScheduler.

use crate::TickScheduler;
use std::time::Duration;

/// Ticker driven by a virtual clock.
///
/// Time only moves when the host calls [`ManualTicker::advance`]. Elapsed
/// time is accumulated and converted into whole ticks, carrying the
/// remainder, so the playback rate does not depend on how often or how
/// unevenly the host advances the clock.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    /// Active period (None while stopped)
    period: Option<Duration>,

    /// Time accumulated since the last emitted tick
    accumulated: Duration,

    /// Total virtual time since creation
    now: Duration,

    /// Number of `start` calls, restarts included
    starts: u32,

    /// Number of ticks handed out by `pop_tick`
    ticks_emitted: u64,
}

impl ManualTicker {
    /// Creates a stopped ticker at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances virtual time.
    ///
    /// # Returns
    /// Number of ticks now pending for the running timer.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.now += dt;
        if self.period.is_some() {
            self.accumulated += dt;
        }
        self.pending()
    }

    /// Number of whole periods accumulated and not yet popped.
    pub fn pending(&self) -> u32 {
        match self.period {
            Some(period) if !period.is_zero() => {
                (self.accumulated.as_nanos() / period.as_nanos()) as u32
            }
            _ => 0,
        }
    }

    /// Consumes one pending tick.
    ///
    /// Returns false when the timer is stopped or no full period has
    /// elapsed. Stopping the timer between pops discards the rest.
    pub fn pop_tick(&mut self) -> bool {
        let Some(period) = self.period else {
            return false;
        };
        if period.is_zero() || self.accumulated < period {
            return false;
        }
        self.accumulated -= period;
        self.ticks_emitted += 1;
        true
    }

    /// Returns the current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Returns how many times the timer was (re)started.
    pub fn starts(&self) -> u32 {
        self.starts
    }

    /// Returns the total number of ticks popped.
    pub fn ticks_emitted(&self) -> u64 {
        self.ticks_emitted
    }
}

impl TickScheduler for ManualTicker {
    fn start(&mut self, period: Duration) {
        self.period = Some(period);
        self.accumulated = Duration::ZERO;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.period = None;
        self.accumulated = Duration::ZERO;
    }

    fn is_running(&self) -> bool {
        self.period.is_some()
    }

    fn period(&self) -> Option<Duration> {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_ticker_time() {
        let mut ticker = ManualTicker::new();
        assert_eq!(ticker.now(), Duration::ZERO);

        ticker.advance(Duration::from_secs(1));
        assert_eq!(ticker.now(), Duration::from_secs(1));

        ticker.advance(Duration::from_millis(500));
        assert_eq!(ticker.now(), Duration::from_millis(1500));
    }

    #[test]
    fn test_manual_ticker_stopped_emits_nothing() {
        let mut ticker = ManualTicker::new();
        assert_eq!(ticker.advance(Duration::from_secs(10)), 0);
        assert!(!ticker.pop_tick());
    }

    #[test]
    fn test_manual_ticker_carries_remainder() {
        let mut ticker = ManualTicker::new();
        ticker.start(Duration::from_millis(100));

        // 16ms frames: 7 frames = 112ms -> 1 tick with 12ms carried over
        for _ in 0..7 {
            ticker.advance(Duration::from_millis(16));
        }
        assert!(ticker.pop_tick());
        assert!(!ticker.pop_tick());

        // 6 more frames = 96ms + 12ms = 108ms -> 1 more tick
        for _ in 0..6 {
            ticker.advance(Duration::from_millis(16));
        }
        assert!(ticker.pop_tick());
        assert!(!ticker.pop_tick());
        assert_eq!(ticker.ticks_emitted(), 2);
    }

    #[test]
    fn test_manual_ticker_frame_rate_independent() {
        let mut fast = ManualTicker::new();
        let mut slow = ManualTicker::new();
        fast.start(Duration::from_millis(50));
        slow.start(Duration::from_millis(50));

        let mut fast_ticks = 0;
        for _ in 0..120 {
            fast.advance(Duration::from_micros(8_333));
            while fast.pop_tick() {
                fast_ticks += 1;
            }
        }

        let mut slow_ticks = 0;
        for _ in 0..30 {
            slow.advance(Duration::from_micros(33_333));
            while slow.pop_tick() {
                slow_ticks += 1;
            }
        }

        assert_eq!(fast_ticks, 19);
        assert_eq!(slow_ticks, 19);
    }

    #[test]
    fn test_manual_ticker_stop_discards_pending() {
        let mut ticker = ManualTicker::new();
        ticker.start(Duration::from_millis(100));
        assert_eq!(ticker.advance(Duration::from_millis(350)), 3);

        assert!(ticker.pop_tick());
        ticker.stop();
        assert!(!ticker.pop_tick());
        assert_eq!(ticker.pending(), 0);
    }

    #[test]
    fn test_manual_ticker_restart_counts() {
        let mut ticker = ManualTicker::new();
        ticker.start(Duration::from_millis(100));
        ticker.start(Duration::from_millis(50));
        assert_eq!(ticker.starts(), 2);
        assert_eq!(ticker.period(), Some(Duration::from_millis(50)));
    }
}
