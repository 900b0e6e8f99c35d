//! RoadView Core - Engine of an interactive traffic-scenario viewer
//!
//! This library turns recorded driving scenarios into a pannable, zoomable,
//! time-scrubbable top-down view:
//! 1. **Viewport**: affine world/screen mapping with anchored zoom and drag panning
//! 2. **Render**: ordered, per-layer draw commands for one playback step
//! 3. **Pick**: priority hit-testing of agents and map features
//! 4. **Playback**: frame-rate independent stepping in once/loop/continuous modes
//! 5. **Navigator**: moving between scenarios of a record file
//!
//! [`ViewerApp`] ties the pieces together behind one `&mut` owner; the
//! outside world is reached only through the `roadview_env` traits.

pub mod app;
pub mod config;
pub mod error;
pub mod geometry;
pub mod inspect;
pub mod layers;
pub mod navigator;
pub mod notice;
pub mod pick;
pub mod playback;
pub mod render;
pub mod request;
pub mod scene;
pub mod selection;
pub mod style;
pub mod viewport;

#[cfg(test)]
mod testing;

// Re-export key types for convenience
pub use app::ViewerApp;
pub use config::ViewerConfig;
pub use error::{ConfigError, NavigationError, SceneError, ViewerError};
pub use geometry::Point;
pub use inspect::{inspect, Attribute};
pub use layers::{Layer, LayerVisibility};
pub use notice::{Notice, NoticeLevel};
pub use pick::{HitTester, Picked};
pub use playback::{PlaybackController, PlaybackMode, PlaybackState, TickOutcome};
pub use render::{render, DrawCommand, Frame, Primitive, Stroke};
pub use scene::{AgentCategory, MapFeature, Scenario};
pub use viewport::{ScaleBar, Viewport};
