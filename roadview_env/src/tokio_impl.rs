//! Production implementation of TickScheduler using Tokio.

use crate::TickScheduler;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A tick emitted by `TokioTicker`.
///
/// Ticks carry the generation of the timer that produced them. Ticks of an
/// older generation are dropped by the ticker and never reach the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Ticker backed by a Tokio interval task.
///
/// The ticker owns both ends of its tick channel; hosts take ticks with
/// [`TokioTicker::recv`] or [`TokioTicker::try_recv`]. `start` must be
/// called from within a Tokio runtime.
pub struct TokioTicker {
    /// Outgoing tick channel, cloned into every interval task
    tx: mpsc::UnboundedSender<Tick>,

    rx: mpsc::UnboundedReceiver<Tick>,

    /// Interval task of the current generation
    handle: Option<JoinHandle<()>>,

    /// Period of the current generation
    period: Option<Duration>,

    /// Incremented on every start
    generation: u64,
}

impl TokioTicker {
    /// Creates a stopped ticker.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            handle: None,
            period: None,
            generation: 0,
        }
    }

    /// Returns true if `tick` was produced by the currently running timer.
    pub fn is_current(&self, tick: Tick) -> bool {
        self.handle.is_some() && tick.generation == self.generation
    }

    /// Waits for the next tick of the running timer.
    ///
    /// Returns `None` immediately when the ticker is stopped. Ticks queued
    /// by a cancelled or restarted timer are skipped.
    pub async fn recv(&mut self) -> Option<Tick> {
        while self.handle.is_some() {
            let tick = self.rx.recv().await?;
            if self.is_current(tick) {
                return Some(tick);
            }
        }
        None
    }

    /// Takes an already queued tick of the running timer without waiting.
    pub fn try_recv(&mut self) -> Option<Tick> {
        if self.handle.is_none() {
            return None;
        }
        while let Ok(tick) = self.rx.try_recv() {
            if self.is_current(tick) {
                return Some(tick);
            }
        }
        None
    }

    /// Drops every queued tick.
    fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

impl Default for TokioTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl TickScheduler for TokioTicker {
    fn start(&mut self, period: Duration) {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let tx = self.tx.clone();
        let period = period.max(Duration::from_millis(1));

        self.period = Some(period);
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.period = None;
        // An aborted task may still send once more; the generation check in
        // recv filters that tick out.
        self.drain();
    }

    fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    fn period(&self) -> Option<Duration> {
        self.period
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tokio_ticker_delivers_ticks() {
        let mut ticker = TokioTicker::new();
        ticker.start(Duration::from_millis(5));

        let tick = ticker.recv().await.unwrap();
        assert!(ticker.is_current(tick));
        assert_eq!(ticker.period(), Some(Duration::from_millis(5)));
    }

    #[tokio::test]
    async fn test_tokio_ticker_restart_skips_old_ticks() {
        let mut ticker = TokioTicker::new();
        ticker.start(Duration::from_millis(2));
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Ticks of the first generation are still queued here
        ticker.start(Duration::from_millis(2));
        let tick = ticker.recv().await.unwrap();
        assert_eq!(tick.generation, 2);
    }

    #[tokio::test]
    async fn test_tokio_ticker_stop() {
        let mut ticker = TokioTicker::new();
        ticker.start(Duration::from_millis(5));
        assert!(ticker.is_running());

        ticker.stop();
        assert!(!ticker.is_running());
        assert_eq!(ticker.period(), None);
        assert_eq!(ticker.recv().await, None);
    }

    #[tokio::test]
    async fn test_no_ticks_after_stop() {
        let mut ticker = TokioTicker::new();
        ticker.start(Duration::from_millis(2));
        tokio::time::sleep(Duration::from_millis(30)).await;

        ticker.stop();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ticker.try_recv(), None);
        assert_eq!(ticker.recv().await, None);

        // A restart does not resurrect ticks of the stopped timer
        ticker.start(Duration::from_millis(50));
        assert_eq!(ticker.try_recv(), None);
    }
}
