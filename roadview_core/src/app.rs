//! The viewer application state.
//!
//! [`ViewerApp`] owns every engine component and is the only thing a UI
//! shell talks to. All mutation goes through `&mut ViewerApp`; the only
//! suspension points are awaited provider calls. Ticks are delivered by the
//! host through [`ViewerApp::tick`].
//!
//! # Loading
//!
//! Every provider request is split in two halves so hosts that issue
//! requests concurrently can still apply responses in order:
//!
//! ```text
//! let ticket = app.begin_scenario_request();
//! let result = provider.fetch_scenario(index).await;   // anywhere
//! app.apply_scenario(ticket, index, result)?;           // stale => discarded
//! ```
//!
//! The `async` helpers (`open_record`, `open_scenario`, ...) do both halves
//! in one call.

use std::sync::Arc;

use tracing::{debug, info, warn};

use roadview_env::{
    DataProvider, DatasetFolder, EnvError, FilePage, ScenarioPayload, ScenarioSummary, SearchHit,
    SearchPage, TickScheduler, TokioTicker,
};

use crate::config::ViewerConfig;
use crate::error::{NavigationError, ViewerError};
use crate::geometry::Point;
use crate::inspect::{inspect, Attribute};
use crate::layers::{Layer, LayerVisibility};
use crate::navigator::ScenarioNavigator;
use crate::notice::Notice;
use crate::pick::{HitTester, Picked};
use crate::playback::{PlaybackController, PlaybackMode, PlaybackState, TickOutcome};
use crate::render::{render, Frame};
use crate::request::{RequestGate, RequestKind, RequestTicket};
use crate::scene::Scenario;
use crate::selection::Selection;
use crate::viewport::Viewport;

/// Application state of the scenario viewer.
pub struct ViewerApp<P: DataProvider, S: TickScheduler> {
    provider: P,
    config: ViewerConfig,

    viewport: Viewport,

    /// Current scene. Replaced wholesale, never mutated
    scene: Option<Arc<Scenario>>,

    /// Survives scene replacement
    visibility: LayerVisibility,

    selection: Selection,
    playback: PlaybackController<S>,
    navigator: ScenarioNavigator,
    gate: RequestGate,
    hit_tester: HitTester,

    /// Pending user notices, oldest first
    notices: Vec<Notice>,
}

impl<P: DataProvider, S: TickScheduler> ViewerApp<P, S> {
    pub fn new(provider: P, scheduler: S) -> Self {
        Self::with_config(provider, scheduler, ViewerConfig::default())
    }

    pub fn with_config(provider: P, scheduler: S, config: ViewerConfig) -> Self {
        let mut playback = PlaybackController::with_base_period(
            scheduler,
            std::time::Duration::from_millis(config.base_tick_ms.max(1)),
        );
        playback.set_mode(config.default_mode);
        playback.set_speed(config.default_speed);

        Self {
            provider,
            viewport: Viewport::from_config(&config),
            hit_tester: HitTester::from_config(&config),
            config,
            scene: None,
            visibility: LayerVisibility::default(),
            selection: Selection::default(),
            playback,
            navigator: ScenarioNavigator::new(),
            gate: RequestGate::new(),
            notices: Vec::new(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn scene(&self) -> Option<&Arc<Scenario>> {
        self.scene.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn visibility(&self) -> &LayerVisibility {
        &self.visibility
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn playback(&self) -> &PlaybackController<S> {
        &self.playback
    }

    pub fn navigator(&self) -> &ScenarioNavigator {
        &self.navigator
    }

    /// The playback scheduler, for hosts that pump ticks themselves.
    pub fn scheduler_mut(&mut self) -> &mut S {
        self.playback.scheduler_mut()
    }

    pub fn step(&self) -> usize {
        self.playback.step()
    }

    /// Drains pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, notice: Notice) {
        debug!("Notice: {}", notice);
        self.notices.push(notice);
    }

    /// Records a failure as a notice and hands the error back.
    fn report(&mut self, context: &str, err: ViewerError) -> ViewerError {
        match &err {
            ViewerError::Navigation(nav) => {
                info!("{}: {}", context, nav);
                self.notify(Notice::info(nav.to_string()));
            }
            ViewerError::Stale => {}
            other => {
                warn!("{}: {}", context, other);
                self.notify(Notice::error(format!("{}: {}", context, other)));
            }
        }
        err
    }

    // ========================================================================
    // DATASET BROWSING
    // ========================================================================

    pub async fn list_datasets(&mut self) -> Result<Vec<DatasetFolder>, ViewerError> {
        let result = self.provider.list_datasets().await;
        result.map_err(|e| self.report("Failed to list datasets", e.into()))
    }

    pub async fn list_files(
        &mut self,
        folder: &str,
        offset: usize,
    ) -> Result<FilePage, ViewerError> {
        let result = self.provider.list_files(folder, offset).await;
        result.map_err(|e| self.report("Failed to list files", e.into()))
    }

    pub async fn search(&mut self, query: &str, offset: usize) -> Result<SearchPage, ViewerError> {
        if query.trim().is_empty() {
            return Ok(SearchPage::empty());
        }
        let result = self.provider.search(query.trim(), offset).await;
        result.map_err(|e| self.report("Search failed", e.into()))
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Issues a record request, superseding any pending one.
    pub fn begin_record_request(&mut self) -> RequestTicket {
        self.gate.issue(RequestKind::Record)
    }

    /// Applies the response of a record request.
    ///
    /// On success the navigator switches to the new record; no scenario is
    /// loaded yet.
    pub fn apply_record(
        &mut self,
        ticket: RequestTicket,
        path: &str,
        result: Result<Vec<ScenarioSummary>, EnvError>,
    ) -> Result<usize, ViewerError> {
        if !self.gate.is_current(ticket) {
            debug!("Discarding stale record response for {}", path);
            return Err(ViewerError::Stale);
        }
        let summaries = result.map_err(|e| self.report("Failed to load record", e.into()))?;
        let count = summaries.len();
        info!("Loaded record {} with {} scenarios", path, count);
        self.navigator.set_record(path, summaries);
        Ok(count)
    }

    /// Issues a scenario request, superseding any pending one.
    pub fn begin_scenario_request(&mut self) -> RequestTicket {
        self.gate.issue(RequestKind::Scenario)
    }

    /// Applies the response of a scenario request.
    ///
    /// Stale responses, backend errors and malformed payloads leave the
    /// current scene untouched.
    pub fn apply_scenario(
        &mut self,
        ticket: RequestTicket,
        index: usize,
        result: Result<ScenarioPayload, EnvError>,
    ) -> Result<(), ViewerError> {
        if !self.gate.is_current(ticket) {
            debug!("Discarding stale response for scenario {}", index);
            return Err(ViewerError::Stale);
        }
        let payload = result.map_err(|e| self.report("Failed to load scenario", e.into()))?;
        if self.navigator.record_path() != Some(payload.record_path.as_str()) {
            debug!(
                "Discarding scenario {} of {}: record is no longer open",
                index, payload.record_path
            );
            return Err(ViewerError::Stale);
        }
        let scene = Scenario::from_json(&payload.payload)
            .map_err(|e| self.report("Failed to load scenario", e.into()))?;
        self.install_scene(index, scene);
        Ok(())
    }

    fn install_scene(&mut self, index: usize, scene: Scenario) {
        let center = scene.sdc_start_position().unwrap_or_else(Point::origin);
        self.viewport
            .recenter_on(center.x, center.y, self.config.initial_scale);
        self.selection.clear();
        self.playback.reset(scene.max_step());
        self.navigator.commit(index);
        info!(
            "Scenario {} ({}) loaded: {} steps, {} tracks, {} map features",
            index,
            scene.scenario_id,
            scene.timestamps.len(),
            scene.tracks.len(),
            scene.map_features.len()
        );
        self.scene = Some(Arc::new(scene));
    }

    /// Loads a record file and opens its first scenario.
    pub async fn open_record(&mut self, path: &str) -> Result<(), ViewerError> {
        let ticket = self.begin_record_request();
        let result = self.provider.load_record(path).await;
        let count = self.apply_record(ticket, path, result)?;
        if count == 0 {
            self.notify(Notice::warning(format!("{} contains no scenarios", path)));
            return Ok(());
        }
        self.open_scenario(0).await
    }

    /// Opens the record a search hit points to.
    pub async fn open_search_hit(&mut self, hit: &SearchHit) -> Result<(), ViewerError> {
        self.open_record(&hit.path).await
    }

    /// Loads scenario `index` of the current record.
    pub async fn open_scenario(&mut self, index: usize) -> Result<(), ViewerError> {
        self.navigator
            .check(index)
            .map_err(|e| self.report("Cannot open scenario", e.into()))?;
        let ticket = self.begin_scenario_request();
        let result = self.provider.fetch_scenario(index).await;
        self.apply_scenario(ticket, index, result)
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub async fn next_scenario(&mut self) -> Result<(), ViewerError> {
        let index = self
            .navigator
            .next_index()
            .map_err(|e| self.report("Next scenario", e.into()))?;
        self.open_scenario(index).await
    }

    pub async fn previous_scenario(&mut self) -> Result<(), ViewerError> {
        let index = self
            .navigator
            .previous_index()
            .map_err(|e| self.report("Previous scenario", e.into()))?;
        self.open_scenario(index).await
    }

    pub async fn jump_to_scenario(&mut self, index: usize) -> Result<(), ViewerError> {
        self.open_scenario(index).await
    }

    // ========================================================================
    // PLAYBACK
    // ========================================================================

    /// Starts playback. Does nothing without a scene.
    pub fn play(&mut self) -> bool {
        if self.scene.is_none() {
            return false;
        }
        self.playback.play()
    }

    pub fn pause(&mut self) -> bool {
        self.playback.pause()
    }

    pub fn toggle_playback(&mut self) -> PlaybackState {
        if self.scene.is_none() {
            return self.playback.state();
        }
        self.playback.toggle()
    }

    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.playback.set_speed(speed)
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.playback.set_mode(mode);
    }

    pub fn set_step(&mut self, step: i64) -> usize {
        self.playback.set_step(step)
    }

    pub fn step_forward(&mut self) -> usize {
        self.playback.step_forward()
    }

    pub fn step_backward(&mut self) -> usize {
        self.playback.step_backward()
    }

    /// Jumps to step 0. Already stopped at step 0, goes to the previous
    /// scenario instead.
    pub async fn first(&mut self) -> Result<(), ViewerError> {
        if !self.playback.is_playing() && self.playback.step() == 0 && self.scene.is_some() {
            return self.previous_scenario().await;
        }
        self.playback.set_step(0);
        Ok(())
    }

    /// Jumps to the last step. Already stopped there in `once` mode, goes
    /// to the next scenario instead.
    pub async fn last(&mut self) -> Result<(), ViewerError> {
        let at_end = self.playback.step() == self.playback.max_step();
        if !self.playback.is_playing()
            && at_end
            && self.playback.mode() == PlaybackMode::Once
            && self.scene.is_some()
        {
            return self.next_scenario().await;
        }
        let max = self.playback.max_step();
        self.playback.set_step(max as i64);
        Ok(())
    }

    /// Delivers one scheduler tick.
    ///
    /// In continuous mode the end of a scenario loads the next one and
    /// resumes playback; after the last scenario playback stays stopped.
    pub async fn tick(&mut self) -> Result<TickOutcome, ViewerError> {
        let outcome = self.playback.tick();
        match outcome {
            TickOutcome::ScenarioEnded => match self.navigator.next_index() {
                Ok(index) => {
                    self.open_scenario(index).await?;
                    self.playback.play();
                }
                Err(NavigationError::AtLastScenario) | Err(NavigationError::NoRecord) => {
                    info!("Continuous playback reached the last scenario");
                    self.notify(Notice::info("Reached the last scenario"));
                }
                Err(other) => return Err(self.report("Continuous playback", other.into())),
            },
            TickOutcome::Finished => debug!("Playback finished"),
            _ => {}
        }
        Ok(outcome)
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    pub fn pointer_down(&mut self, sx: f64, sy: f64) {
        self.viewport.begin_drag(sx, sy);
    }

    /// Pans while dragging, otherwise updates the hovered object.
    ///
    /// Returns true if the frame needs to be redrawn.
    pub fn pointer_move(&mut self, sx: f64, sy: f64) -> bool {
        if self.viewport.is_dragging() {
            return self.viewport.drag_to(sx, sy);
        }
        let hovered = self.pick_screen(sx, sy);
        self.selection.set_hovered(hovered)
    }

    /// Ends a press. A press that did not move is a click and selects the
    /// object under the pointer (or clears the selection).
    pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Option<Picked> {
        if self.viewport.end_drag() {
            return None;
        }
        let picked = self.pick_screen(sx, sy);
        self.selection.select(picked.clone());
        picked
    }

    pub fn pointer_leave(&mut self) {
        self.viewport.end_drag();
        self.selection.set_hovered(None);
    }

    pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
        self.viewport.zoom_wheel(sx, sy, delta_y);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
    }

    pub fn set_layer_visible(&mut self, layer: Layer, visible: bool) {
        self.visibility.set(layer, visible);
    }

    pub fn toggle_layer(&mut self, layer: Layer) -> bool {
        self.visibility.toggle(layer)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Topmost object at a world point. Never picks while dragging.
    pub fn pick(&self, world: &Point) -> Option<Picked> {
        if self.viewport.is_dragging() {
            return None;
        }
        let scene = self.scene.as_ref()?;
        self.hit_tester.pick(
            scene,
            self.playback.step(),
            world,
            self.viewport.scale(),
            &self.visibility,
        )
    }

    pub fn pick_screen(&self, sx: f64, sy: f64) -> Option<Picked> {
        self.pick(&self.viewport.screen_to_world(sx, sy))
    }

    /// Renders the current frame, or None when no scene is loaded.
    pub fn render(&self) -> Option<Frame> {
        let scene = self.scene.as_ref()?;
        Some(render(
            scene,
            self.playback.step(),
            &self.viewport,
            &self.visibility,
            self.selection.highlight(),
        ))
    }

    /// Attributes of the selected object.
    pub fn inspect_selection(&self) -> Vec<Attribute> {
        self.selection.selected().map(inspect).unwrap_or_default()
    }
}

impl<P: DataProvider> ViewerApp<P, TokioTicker> {
    /// Waits for the next tick of the playback timer and delivers it.
    ///
    /// Returns `None` while playback is stopped. Ticks queued before a
    /// pause or speed change never get here.
    pub async fn next_tick(&mut self) -> Option<Result<TickOutcome, ViewerError>> {
        self.playback.scheduler_mut().recv().await?;
        Some(self.tick().await)
    }
}
