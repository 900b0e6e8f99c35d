//! Viewer configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::playback::{PlaybackMode, BASE_TICK_MS};
use crate::viewport::{INITIAL_SCALE, MAX_SCALE, MIN_SCALE, ZOOM_STEP};

/// Tunables of the viewer engine.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Scale applied when a scenario is loaded (pixels per meter)
    pub initial_scale: f64,

    pub min_scale: f64,
    pub max_scale: f64,

    /// Zoom factor of one wheel event
    pub zoom_step: f64,

    /// Playback tick period at speed 1.0 (ms)
    pub base_tick_ms: u64,

    /// Polyline pick tolerance in screen pixels
    pub pick_tolerance_px: f64,

    /// Stop sign pick radius in world units
    pub stop_sign_radius: f64,

    /// Relative margin applied to agent boxes when picking
    pub agent_margin: f64,

    pub surface_width: f64,
    pub surface_height: f64,

    pub default_mode: PlaybackMode,
    pub default_speed: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_scale: INITIAL_SCALE,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_step: ZOOM_STEP,
            base_tick_ms: BASE_TICK_MS,
            pick_tolerance_px: 2.0,
            stop_sign_radius: 2.0,
            agent_margin: 1.1,
            surface_width: 1280.0,
            surface_height: 720.0,
            default_mode: PlaybackMode::Once,
            default_speed: 1.0,
        }
    }
}

impl ViewerConfig {
    /// Parses a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
