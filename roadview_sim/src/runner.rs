//! Headless playback runners.
//!
//! [`HeadlessRunner`] drives a [`ViewerApp`] with a virtual clock at a fixed
//! frame rate. No wall-clock time passes, so a 30-second run finishes as
//! fast as the frames can be rendered. [`RealtimeRunner`] plays on the
//! Tokio timer instead and renders one frame per delivered tick.

use std::time::Duration;

use roadview_core::{Frame, Layer, Notice, PlaybackMode, TickOutcome, ViewerApp, ViewerError};
use roadview_env::{DataProvider, ManualTicker, TickScheduler, TokioTicker};
use serde::Serialize;
use tracing::{debug, info};

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Host frame rate (frames per second of virtual time)
    pub fps: u32,

    /// Maximum virtual duration in seconds
    pub duration_sec: f64,

    pub mode: PlaybackMode,
    pub speed: f64,

    /// Layers to hide before playback starts
    pub hidden_layers: Vec<Layer>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            duration_sec: 10.0,
            mode: PlaybackMode::Once,
            speed: 1.0,
            hidden_layers: Vec::new(),
        }
    }
}

/// Results of one headless run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Frames handed to the sink
    pub frames: usize,

    /// Playback ticks delivered
    pub ticks: u64,

    /// Scenario ids in the order they were played
    pub scenarios: Vec<String>,

    pub final_step: usize,

    /// Virtual time elapsed in seconds
    pub elapsed_sec: f64,

    /// True if playback stopped on its own before the time limit
    pub finished: bool,

    pub notices: Vec<Notice>,
}

/// Hides the configured layers, renders the opening frame and starts
/// playback. Returns `None` when no scenario is loaded.
fn start_playback<P, S>(app: &mut ViewerApp<P, S>, config: &RunConfig) -> Option<Frame>
where
    P: DataProvider,
    S: TickScheduler,
{
    for layer in &config.hidden_layers {
        app.set_layer_visible(*layer, false);
    }
    let first = app.render()?;
    app.set_mode(config.mode);
    app.set_speed(config.speed);
    app.play();
    Some(first)
}

/// Records the scenario now on screen if playback moved to a new one.
fn note_scenario<P, S>(app: &ViewerApp<P, S>, outcome: TickOutcome, summary: &mut RunSummary)
where
    P: DataProvider,
    S: TickScheduler,
{
    if outcome != TickOutcome::ScenarioEnded {
        return;
    }
    if let Some(scene) = app.scene() {
        if summary.scenarios.last() != Some(&scene.scenario_id) {
            summary.scenarios.push(scene.scenario_id.clone());
        }
    }
}

/// Plays the loaded scenario of a [`ViewerApp`] headlessly.
pub struct HeadlessRunner<P: DataProvider> {
    app: ViewerApp<P, ManualTicker>,
    config: RunConfig,
}

impl<P: DataProvider> HeadlessRunner<P> {
    pub fn new(app: ViewerApp<P, ManualTicker>, config: RunConfig) -> Self {
        Self { app, config }
    }

    pub fn app(&self) -> &ViewerApp<P, ManualTicker> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut ViewerApp<P, ManualTicker> {
        &mut self.app
    }

    pub fn into_app(self) -> ViewerApp<P, ManualTicker> {
        self.app
    }

    /// Runs playback until it stops or the duration is exhausted.
    ///
    /// The sink receives the frame at the start, one per host frame, and
    /// the final frame. Nothing happens when no scenario is loaded.
    pub async fn run<F>(&mut self, mut sink: F) -> Result<RunSummary, ViewerError>
    where
        F: FnMut(&Frame),
    {
        let mut summary = RunSummary::default();
        let Some(first) = start_playback(&mut self.app, &self.config) else {
            return Ok(summary);
        };
        summary.scenarios.push(first.scenario_id.clone());
        sink(&first);
        summary.frames += 1;

        let fps = self.config.fps.max(1);
        let frame_dt = Duration::from_secs_f64(1.0 / fps as f64);
        let total_frames = (self.config.duration_sec.max(0.0) * fps as f64).round() as u64;
        info!(
            "Headless run: {} frames at {} fps ({}, {}x)",
            total_frames,
            fps,
            self.config.mode,
            self.app.playback().speed()
        );

        for frame_index in 0..total_frames {
            self.app.scheduler_mut().advance(frame_dt);
            while self.app.scheduler_mut().pop_tick() {
                summary.ticks += 1;
                let outcome = self.app.tick().await?;
                note_scenario(&self.app, outcome, &mut summary);
            }
            if let Some(frame) = self.app.render() {
                sink(&frame);
                summary.frames += 1;
            }
            if !self.app.playback().is_playing() {
                debug!("Playback stopped after {} frames", frame_index + 1);
                summary.finished = true;
                break;
            }
        }

        summary.final_step = self.app.step();
        summary.elapsed_sec = self.app.scheduler_mut().now().as_secs_f64();
        summary.notices = self.app.take_notices();
        info!(
            "Run complete: {} frames, {} ticks, final step {}",
            summary.frames, summary.ticks, summary.final_step
        );
        Ok(summary)
    }
}

/// Plays the loaded scenario of a [`ViewerApp`] in real time.
///
/// Ticks come from a [`TokioTicker`], so playback takes as long as the
/// scenario at the configured speed. `RunConfig::fps` is not used: a frame
/// is rendered for every tick.
pub struct RealtimeRunner<P: DataProvider> {
    app: ViewerApp<P, TokioTicker>,
    config: RunConfig,
}

impl<P: DataProvider> RealtimeRunner<P> {
    pub fn new(app: ViewerApp<P, TokioTicker>, config: RunConfig) -> Self {
        Self { app, config }
    }

    pub fn app(&self) -> &ViewerApp<P, TokioTicker> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut ViewerApp<P, TokioTicker> {
        &mut self.app
    }

    /// Runs playback until it stops or the wall-clock duration is used up.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn run<F>(&mut self, mut sink: F) -> Result<RunSummary, ViewerError>
    where
        F: FnMut(&Frame),
    {
        let mut summary = RunSummary::default();
        let Some(first) = start_playback(&mut self.app, &self.config) else {
            return Ok(summary);
        };
        summary.scenarios.push(first.scenario_id.clone());
        sink(&first);
        summary.frames += 1;

        let started = tokio::time::Instant::now();
        let deadline = started + Duration::from_secs_f64(self.config.duration_sec.max(0.0));
        info!(
            "Realtime run: up to {:.1}s ({}, {}x)",
            self.config.duration_sec,
            self.config.mode,
            self.app.playback().speed()
        );

        loop {
            let next = tokio::time::timeout_at(deadline, self.app.next_tick()).await;
            match next {
                Ok(Some(outcome)) => {
                    summary.ticks += 1;
                    note_scenario(&self.app, outcome?, &mut summary);
                    if let Some(frame) = self.app.render() {
                        sink(&frame);
                        summary.frames += 1;
                    }
                }
                Ok(None) => {
                    debug!("Playback stopped after {} ticks", summary.ticks);
                    summary.finished = true;
                    break;
                }
                Err(_) => break,
            }
        }

        // Cancel the timer before handing the app back
        self.app.pause();
        summary.final_step = self.app.step();
        summary.elapsed_sec = started.elapsed().as_secs_f64();
        summary.notices = self.app.take_notices();
        info!(
            "Run complete: {} frames, {} ticks, final step {}",
            summary.frames, summary.ticks, summary.final_step
        );
        Ok(summary)
    }
}
