//! Playback state machine.
//!
//! ```text
//!            play / toggle
//!   Stopped ---------------> Playing
//!      ^                        |
//!      +------------------------+
//!       pause / toggle / step / end of scenario (once, continuous)
//! ```
//!
//! While playing, every scheduler tick advances the current step by one.
//! What happens at the last step depends on the [`PlaybackMode`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use roadview_env::TickScheduler;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Tick period at speed 1.0, in milliseconds.
pub const BASE_TICK_MS: u64 = 100;

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 16.0;

/// What happens when playback reaches the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Stop at the end
    #[default]
    Once,

    /// Wrap around to step 0 and keep playing
    Loop,

    /// Stop, then continue with the next scenario of the record
    Continuous,
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackMode::Once => "once",
            PlaybackMode::Loop => "loop",
            PlaybackMode::Continuous => "continuous",
        };
        f.write_str(name)
    }
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "once" => Ok(PlaybackMode::Once),
            "loop" => Ok(PlaybackMode::Loop),
            "continuous" => Ok(PlaybackMode::Continuous),
            other => Err(format!("unknown playback mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Result of delivering one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Playback is stopped; the tick had no effect
    Ignored,

    /// Moved to the given step
    Advanced(usize),

    /// Wrapped around to step 0 (loop mode)
    Looped,

    /// Stopped at the last step (once mode)
    Finished,

    /// Stopped at the last step; the host should load the next scenario
    /// and resume (continuous mode)
    ScenarioEnded,
}

/// Playback controller over a tick scheduler.
#[derive(Debug)]
pub struct PlaybackController<S: TickScheduler> {
    scheduler: S,
    state: PlaybackState,
    mode: PlaybackMode,

    /// Speed multiplier within [MIN_SPEED, MAX_SPEED]
    speed: f64,

    step: usize,
    max_step: usize,

    /// Tick period at speed 1.0
    base_period: Duration,
}

impl<S: TickScheduler> PlaybackController<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_base_period(scheduler, Duration::from_millis(BASE_TICK_MS))
    }

    pub fn with_base_period(mut scheduler: S, base_period: Duration) -> Self {
        scheduler.stop();
        Self {
            scheduler,
            state: PlaybackState::Stopped,
            mode: PlaybackMode::default(),
            speed: 1.0,
            step: 0,
            max_step: 0,
            base_period,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn max_step(&self) -> usize {
        self.max_step
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access for hosts that pump the scheduler themselves.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Tick period at the current speed.
    pub fn period(&self) -> Duration {
        let nanos = self.base_period.as_nanos() as f64 / self.speed;
        Duration::from_nanos(nanos.round().max(1.0) as u64)
    }

    /// Starts playback. Playing from the last step restarts at step 0.
    ///
    /// Returns false if already playing.
    pub fn play(&mut self) -> bool {
        if self.is_playing() {
            return false;
        }
        if self.step >= self.max_step {
            self.step = 0;
        }
        self.state = PlaybackState::Playing;
        self.scheduler.start(self.period());
        info!(
            "Playback started at step {} ({}x, {})",
            self.step, self.speed, self.mode
        );
        true
    }

    /// Stops playback. Returns false if already stopped.
    pub fn pause(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.state = PlaybackState::Stopped;
        self.scheduler.stop();
        info!("Playback stopped at step {}", self.step);
        true
    }

    /// Flips between playing and stopped.
    pub fn toggle(&mut self) -> PlaybackState {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.state
    }

    /// Sets the speed multiplier (clamped). Non-finite values are ignored.
    ///
    /// While playing, the scheduler is restarted with the new period.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        if !speed.is_finite() {
            return self.speed;
        }
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        if self.is_playing() {
            self.scheduler.start(self.period());
            debug!("Playback speed changed to {}x while playing", self.speed);
        }
        self.speed
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
    }

    /// Jumps to `step`, clamped into [0, max_step].
    pub fn set_step(&mut self, step: i64) -> usize {
        self.step = step.clamp(0, self.max_step as i64) as usize;
        self.step
    }

    /// Stops playback and moves one step forward.
    pub fn step_forward(&mut self) -> usize {
        self.pause();
        self.step = (self.step + 1).min(self.max_step);
        self.step
    }

    /// Stops playback and moves one step back.
    pub fn step_backward(&mut self) -> usize {
        self.pause();
        self.step = self.step.saturating_sub(1);
        self.step
    }

    /// Adopts a newly loaded scenario: step 0, new bound. The playing state
    /// is left as is.
    pub fn reset(&mut self, max_step: usize) {
        self.max_step = max_step;
        self.step = 0;
    }

    /// Delivers one scheduler tick.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome::Ignored;
        }
        if self.step < self.max_step {
            self.step += 1;
            return TickOutcome::Advanced(self.step);
        }
        match self.mode {
            PlaybackMode::Once => {
                self.pause();
                TickOutcome::Finished
            }
            PlaybackMode::Loop => {
                self.step = 0;
                debug!("Playback looped");
                TickOutcome::Looped
            }
            PlaybackMode::Continuous => {
                self.pause();
                TickOutcome::ScenarioEnded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadview_env::ManualTicker;

    fn controller(max_step: usize) -> PlaybackController<ManualTicker> {
        let mut pc = PlaybackController::new(ManualTicker::new());
        pc.reset(max_step);
        pc
    }

    #[test]
    fn test_play_starts_scheduler() {
        let mut pc = controller(90);
        assert!(pc.play());
        assert!(!pc.play());
        assert_eq!(pc.scheduler().period(), Some(Duration::from_millis(100)));
        assert!(pc.pause());
        assert!(!pc.scheduler().is_running());
    }

    #[test]
    fn test_tick_while_stopped_ignored() {
        let mut pc = controller(90);
        assert_eq!(pc.tick(), TickOutcome::Ignored);
        assert_eq!(pc.step(), 0);
    }

    #[test]
    fn test_once_stops_at_end() {
        let mut pc = controller(90);
        pc.play();
        for expected in 1..=90 {
            assert_eq!(pc.tick(), TickOutcome::Advanced(expected));
        }
        assert_eq!(pc.tick(), TickOutcome::Finished);
        assert_eq!(pc.state(), PlaybackState::Stopped);
        assert_eq!(pc.step(), 90);
    }

    #[test]
    fn test_loop_wraps() {
        let mut pc = controller(90);
        pc.set_mode(PlaybackMode::Loop);
        pc.play();
        for _ in 0..90 {
            pc.tick();
        }
        assert_eq!(pc.tick(), TickOutcome::Looped);
        assert_eq!(pc.step(), 0);
        assert!(pc.is_playing());
        assert_eq!(pc.tick(), TickOutcome::Advanced(1));
    }

    #[test]
    fn test_continuous_reports_scenario_end() {
        let mut pc = controller(90);
        pc.set_mode(PlaybackMode::Continuous);
        pc.play();
        pc.set_step(90);
        assert_eq!(pc.tick(), TickOutcome::ScenarioEnded);
        assert!(!pc.is_playing());
        assert!(!pc.scheduler().is_running());
    }

    #[test]
    fn test_play_at_end_restarts() {
        let mut pc = controller(90);
        pc.set_step(90);
        pc.play();
        assert_eq!(pc.step(), 0);
    }

    #[test]
    fn test_step_clamp() {
        let mut pc = controller(90);
        assert_eq!(pc.set_step(-5), 0);
        assert_eq!(pc.set_step(190), 90);
        assert_eq!(pc.set_step(42), 42);
    }

    #[test]
    fn test_speed_change_restarts_scheduler() {
        let mut pc = controller(90);
        pc.play();
        assert_eq!(pc.scheduler().starts(), 1);

        assert_eq!(pc.set_speed(2.0), 2.0);
        assert_eq!(pc.scheduler().starts(), 2);
        assert_eq!(pc.scheduler().period(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_speed_change_while_stopped_does_not_start() {
        let mut pc = controller(90);
        pc.set_speed(4.0);
        assert!(!pc.scheduler().is_running());
        assert_eq!(pc.period(), Duration::from_millis(25));
    }

    #[test]
    fn test_speed_clamped() {
        let mut pc = controller(90);
        assert_eq!(pc.set_speed(100.0), MAX_SPEED);
        assert_eq!(pc.set_speed(0.0), MIN_SPEED);
        assert_eq!(pc.set_speed(f64::NAN), MIN_SPEED);
    }

    #[test]
    fn test_step_buttons_stop_playback() {
        let mut pc = controller(90);
        pc.play();
        assert_eq!(pc.step_forward(), 1);
        assert!(!pc.is_playing());
        assert_eq!(pc.step_backward(), 0);
        assert_eq!(pc.step_backward(), 0);

        pc.set_step(90);
        assert_eq!(pc.step_forward(), 90);
    }

    #[test]
    fn test_toggle() {
        let mut pc = controller(90);
        assert_eq!(pc.toggle(), PlaybackState::Playing);
        assert_eq!(pc.toggle(), PlaybackState::Stopped);
    }

    #[test]
    fn test_reset_keeps_state() {
        let mut pc = controller(90);
        pc.play();
        pc.tick();
        pc.reset(40);
        assert_eq!(pc.step(), 0);
        assert_eq!(pc.max_step(), 40);
        assert!(pc.is_playing());
    }

    #[test]
    fn test_frame_rate_independent_playback() {
        let mut pc = controller(90);
        pc.play();
        // 60 frames at ~16.7ms = 1s = 10 ticks at 100ms
        for _ in 0..60 {
            pc.scheduler_mut().advance(Duration::from_micros(16_667));
            while pc.scheduler_mut().pop_tick() {
                pc.tick();
            }
        }
        assert_eq!(pc.step(), 10);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Loop".parse::<PlaybackMode>(), Ok(PlaybackMode::Loop));
        assert_eq!(PlaybackMode::Continuous.to_string(), "continuous");
        assert!("forever".parse::<PlaybackMode>().is_err());
    }
}
