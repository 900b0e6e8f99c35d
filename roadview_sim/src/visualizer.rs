//! Rerun visualization for headless runs.
//!
//! Optional, only available with the `visualization` feature. Without it
//! every method is a no-op.
//!
//! # What Gets Logged
//!
//! - Every render layer as its own entity (`view/<layer>`): polylines and
//!   polygons as line strips, circles as points
//! - Scenario time on the `playback` timeline
//! - Scenario switches and notices as text logs

use roadview_core::{Frame, Notice};
#[cfg(feature = "visualization")]
use roadview_core::{Layer, Primitive};
#[cfg(feature = "visualization")]
use rerun::{Color, LineStrips2D, Points2D, Radius, RecordingStream};

/// Rerun logger for headless playback.
pub struct RerunLogger {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Whether visualization is enabled
    enabled: bool,
}

impl RerunLogger {
    /// Creates a new logger with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }

    /// Creates a new logger with visualization enabled.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to follow playback");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self::disabled()
            }
        }
    }

    /// Creates a logger - returns disabled if visualization feature not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs one rendered frame.
    #[cfg(feature = "visualization")]
    pub fn log_frame(&self, frame: &Frame) {
        let Some(ref rec) = self.rec else {
            return;
        };
        if let Some(t) = frame.time_sec {
            rec.set_time_seconds("playback", t);
        }
        rec.set_time_sequence("step", frame.step as i64);

        for layer in Layer::DRAW_ORDER {
            let mut strips: Vec<Vec<[f32; 2]>> = Vec::new();
            let mut strip_colors = Vec::new();
            let mut points: Vec<[f32; 2]> = Vec::new();
            let mut point_colors = Vec::new();
            let mut point_radii = Vec::new();

            for cmd in frame.commands_in(layer) {
                let c = cmd.stroke.map(|s| s.color).or(cmd.fill);
                let color = c
                    .map(|c| Color::from_unmultiplied_rgba(c.r, c.g, c.b, c.a))
                    .unwrap_or(Color::from_rgb(255, 255, 255));
                match &cmd.primitive {
                    Primitive::Polyline { points: pts, closed } => {
                        let mut strip: Vec<[f32; 2]> =
                            pts.iter().map(|p| [p.x as f32, -p.y as f32]).collect();
                        if *closed {
                            if let Some(first) = strip.first().copied() {
                                strip.push(first);
                            }
                        }
                        strips.push(strip);
                        strip_colors.push(color);
                    }
                    Primitive::Polygon { points: pts } => {
                        let mut strip: Vec<[f32; 2]> =
                            pts.iter().map(|p| [p.x as f32, -p.y as f32]).collect();
                        if let Some(first) = strip.first().copied() {
                            strip.push(first);
                        }
                        strips.push(strip);
                        strip_colors.push(color);
                    }
                    Primitive::Circle { center, radius } => {
                        points.push([center.x as f32, -center.y as f32]);
                        point_colors.push(color);
                        point_radii.push(Radius::new_scene_units(*radius as f32));
                    }
                }
            }

            // Flipped y: screen space grows downwards
            let _ = rec.log(
                format!("view/{}/lines", layer),
                &LineStrips2D::new(strips).with_colors(strip_colors),
            );
            let _ = rec.log(
                format!("view/{}/points", layer),
                &Points2D::new(points)
                    .with_colors(point_colors)
                    .with_radii(point_radii),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_frame(&self, _frame: &Frame) {}

    /// Logs a text annotation (e.g., scenario switch).
    #[cfg(feature = "visualization")]
    pub fn log_event(&self, path: &str, message: &str) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log(path, &rerun::TextLog::new(message));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_event(&self, _path: &str, _message: &str) {}

    /// Logs a user notice.
    pub fn log_notice(&self, notice: &Notice) {
        self.log_event("events/notices", &notice.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_logger() {
        let logger = RerunLogger::disabled();
        assert!(!logger.is_enabled());

        // These should be no-ops
        logger.log_event("events", "nothing");
        logger.log_notice(&Notice::info("nothing"));
    }
}
