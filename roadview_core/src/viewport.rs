//! Pan/zoom state and the world<->screen mapping.
//!
//! World space is meters with +y pointing north. Screen space is pixels
//! with +y pointing down and the origin in the top-left corner of the
//! drawing surface:
//!
//! ```text
//! sx = w/2 + offset_x + x * scale
//! sy = h/2 + offset_y - y * scale
//! ```

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::geometry::Point;

/// Smallest allowed zoom scale (pixels per meter).
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed zoom scale (pixels per meter).
pub const MAX_SCALE: f64 = 10.0;

/// Zoom factor of one discrete wheel event.
pub const ZOOM_STEP: f64 = 1.1;

/// Scale applied when a scenario is loaded.
pub const INITIAL_SCALE: f64 = 3.0;

/// Reference length of the scale bar in pixels.
pub const SCALE_BAR_PIXELS: f64 = 50.0;

/// A pointer press that moves less than this is a click.
pub const CLICK_THRESHOLD_PX: f64 = 3.0;

/// Scale bar candidates in meters.
pub const NICE_DISTANCES: [f64; 10] = [
    1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0,
];

/// Size of the drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

/// Scale bar legend for the current zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleBar {
    /// Distance represented by the bar
    pub meters: f64,

    /// On-screen length of the bar
    pub pixels: f64,

    /// Human-readable distance, e.g. "20 m" or "1 km"
    pub label: String,
}

/// Snapshot of the transform, attached to every rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    /// Pointer position at the previous drag event
    last: Vector2<f64>,

    /// Pointer position where the press started
    origin: Vector2<f64>,

    /// Whether the pointer has left the click threshold
    moved: bool,
}

/// Viewport state: pan offset, zoom scale, surface size and drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Pan offset in screen pixels
    offset: Vector2<f64>,

    /// Pixels per meter, always within [min_scale, max_scale]
    scale: f64,

    surface: Surface,

    min_scale: f64,
    max_scale: f64,
    zoom_step: f64,

    drag: Option<DragState>,
}

impl Viewport {
    /// Creates a viewport with the default limits, centered on the origin.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            offset: Vector2::zeros(),
            scale: INITIAL_SCALE,
            surface: Surface { width, height },
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_step: ZOOM_STEP,
            drag: None,
        }
    }

    /// Creates a viewport using the limits and surface size of `config`.
    ///
    /// Configured scale limits are confined to [MIN_SCALE, MAX_SCALE];
    /// non-finite values fall back to the defaults.
    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut viewport = Self::new(config.surface_width, config.surface_height);
        let min = finite_or(config.min_scale, MIN_SCALE).clamp(MIN_SCALE, MAX_SCALE);
        let max = finite_or(config.max_scale, MAX_SCALE).clamp(MIN_SCALE, MAX_SCALE);
        viewport.min_scale = min.min(max);
        viewport.max_scale = max.max(min);
        if config.zoom_step.is_finite() && config.zoom_step > 0.0 {
            viewport.zoom_step = config.zoom_step;
        }
        viewport.scale = viewport.clamp_scale(finite_or(config.initial_scale, INITIAL_SCALE));
        viewport
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Vector2<f64> {
        self.offset
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Returns the transform snapshot for a frame.
    pub fn transform(&self) -> ViewTransform {
        ViewTransform {
            offset_x: self.offset.x,
            offset_y: self.offset.y,
            scale: self.scale,
            width: self.surface.width,
            height: self.surface.height,
        }
    }

    /// Maps a world point to screen pixels.
    pub fn world_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let sx = self.surface.width / 2.0 + self.offset.x + x * self.scale;
        let sy = self.surface.height / 2.0 + self.offset.y - y * self.scale;
        (sx, sy)
    }

    /// Maps screen pixels to a world point. Exact inverse of `world_to_screen`.
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
        let x = (sx - self.surface.width / 2.0 - self.offset.x) / self.scale;
        let y = (self.surface.height / 2.0 + self.offset.y - sy) / self.scale;
        Point::new(x, y)
    }

    /// Adds a screen-space delta to the pan offset.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset += Vector2::new(dx, dy);
    }

    /// Multiplies the scale by `factor`, keeping the world point under
    /// (`sx`, `sy`) fixed on screen.
    ///
    /// The result is clamped; a factor that would leave the clamp range
    /// still anchors correctly at the clamped scale.
    pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchor = self.screen_to_world(sx, sy);
        self.scale = self.clamp_scale(self.scale * factor);
        self.offset.x = sx - self.surface.width / 2.0 - anchor.x * self.scale;
        self.offset.y = sy - self.surface.height / 2.0 + anchor.y * self.scale;
    }

    /// Applies one discrete wheel event at (`sx`, `sy`).
    ///
    /// Negative delta (wheel up) zooms in, positive zooms out, zero does
    /// nothing.
    pub fn zoom_wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
        if delta_y < 0.0 {
            self.zoom_at(sx, sy, self.zoom_step);
        } else if delta_y > 0.0 {
            self.zoom_at(sx, sy, 1.0 / self.zoom_step);
        }
    }

    /// Centers the view on a world point at the given scale.
    pub fn recenter_on(&mut self, wx: f64, wy: f64, scale: f64) {
        self.set_scale(scale);
        self.offset = Vector2::new(-wx * self.scale, wy * self.scale);
    }

    /// Sets the scale (clamped). Non-finite values are ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = self.clamp_scale(scale);
        }
    }

    /// Converts a pixel width into world units at the current scale.
    pub fn stroke_width(&self, px: f64) -> f64 {
        px / self.scale
    }

    /// Picks the scale bar distance for the current zoom.
    pub fn scale_bar(&self) -> ScaleBar {
        let bound = 1.5 * SCALE_BAR_PIXELS / self.scale;
        let meters = NICE_DISTANCES
            .iter()
            .copied()
            .filter(|d| *d <= bound)
            .last()
            .unwrap_or(NICE_DISTANCES[0]);
        ScaleBar {
            meters,
            pixels: meters * self.scale,
            label: format_distance(meters),
        }
    }

    /// Updates the surface size. The offset is kept, so the world point
    /// at the surface center stays centered.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.surface = Surface { width, height };
    }

    /// Starts a drag gesture at the pointer position.
    pub fn begin_drag(&mut self, sx: f64, sy: f64) {
        let at = Vector2::new(sx, sy);
        self.drag = Some(DragState {
            last: at,
            origin: at,
            moved: false,
        });
    }

    /// Pans by the pointer delta since the previous drag event.
    ///
    /// Returns false if no drag is in progress.
    pub fn drag_to(&mut self, sx: f64, sy: f64) -> bool {
        let Some(mut drag) = self.drag else {
            return false;
        };
        let at = Vector2::new(sx, sy);
        let delta = at - drag.last;
        self.offset += delta;
        drag.last = at;
        if (at - drag.origin).norm() > CLICK_THRESHOLD_PX {
            drag.moved = true;
        }
        self.drag = Some(drag);
        true
    }

    /// Ends the drag gesture.
    ///
    /// # Returns
    /// Whether the pointer moved past the click threshold. False when no
    /// gesture was in progress.
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().map(|d| d.moved).unwrap_or(false)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Formats a scale bar distance: meters below 1 km, kilometers above.
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{} km", meters / 1000.0)
    } else {
        format!("{} m", meters)
    }
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}
