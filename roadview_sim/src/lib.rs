//! RoadView Headless Harness
//!
//! Runs the viewer engine without a UI: scenarios are read from a directory
//! of JSON record files, playback is driven by a virtual clock (or the
//! Tokio timer for real-time runs), and every rendered frame can be
//! exported to JSON or streamed to Rerun.
//!
//! # Usage
//!
//! ```ignore
//! use roadview_core::ViewerApp;
//! use roadview_env::ManualTicker;
//! use roadview_sim::{HeadlessRunner, JsonDirProvider, RunConfig};
//!
//! let mut app = ViewerApp::new(JsonDirProvider::new("data"), ManualTicker::new());
//! app.open_record("training/training_0000.json").await?;
//!
//! let mut runner = HeadlessRunner::new(app, RunConfig::default());
//! let summary = runner.run(|frame| println!("step {}", frame.step)).await?;
//! ```

mod error;
mod exporter;
mod provider;
mod runner;
mod visualizer;

#[cfg(test)]
mod fixtures;

pub use error::SimError;
pub use exporter::PlaybackExport;
pub use provider::{JsonDirProvider, RECORD_EXTENSION};
pub use runner::{HeadlessRunner, RealtimeRunner, RunConfig, RunSummary};
pub use visualizer::RerunLogger;
