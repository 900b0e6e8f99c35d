//! Playback timer abstraction.

use std::time::Duration;

/// A repeating timer that drives playback.
///
/// The scheduler only decides *when* ticks happen. Delivering a tick to
/// the engine is the host's job: it polls or receives ticks from the
/// concrete implementation and calls `ViewerApp::tick` for each one.
///
/// # Implementations
///
/// - **Production**: `TokioTicker` - a `tokio::time::interval` task
/// - **Tests / headless**: `ManualTicker` - a virtual clock advanced by hand
pub trait TickScheduler: Send {
    /// Starts periodic ticks with the given period.
    ///
    /// Calling `start` on a running scheduler restarts it: pending ticks of
    /// the previous period are discarded.
    fn start(&mut self, period: Duration);

    /// Cancels the timer. No tick of the cancelled timer may be delivered
    /// afterwards.
    fn stop(&mut self);

    /// Returns whether the timer is currently armed.
    fn is_running(&self) -> bool;

    /// Returns the active period, if running.
    fn period(&self) -> Option<Duration>;
}
