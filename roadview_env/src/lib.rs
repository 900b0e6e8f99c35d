//! RoadView Environment Abstraction Layer
//!
//! This crate provides the seams that let the RoadView engine run against
//! a real backend and a real clock in production, and against in-memory
//! fixtures and a virtual clock in tests.
//!
//! # Core Concept
//!
//! The viewer engine never talks to the outside world directly. Everything
//! that can suspend or fail goes through one of two traits:
//! - Data (`DataProvider`): dataset enumeration, record loading, scenario fetch
//! - Time (`TickScheduler`): the periodic playback timer
//!
//! # Example
//!
//! ```ignore
//! use roadview_env::{ManualTicker, TickScheduler};
//! use std::time::Duration;
//!
//! let mut ticker = ManualTicker::new();
//! ticker.start(Duration::from_millis(100));
//! ticker.advance(Duration::from_millis(250));
//! assert!(ticker.pop_tick());
//! assert!(ticker.pop_tick());
//! assert!(!ticker.pop_tick());
//! ```

mod error;
mod manual;
mod provider;
mod scheduler;
mod tokio_impl;
mod types;

pub use error::EnvError;
pub use manual::ManualTicker;
pub use provider::DataProvider;
pub use scheduler::TickScheduler;
pub use tokio_impl::{Tick, TokioTicker};
pub use types::{
    DatasetFolder, FileEntry, FilePage, ScenarioPayload, ScenarioSummary, SearchHit, SearchPage,
    paginate, PAGE_SIZE,
};
