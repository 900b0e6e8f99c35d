//! Colors and stroke styles of every layer.

use serde::{Deserialize, Serialize};

use crate::scene::{AgentCategory, RoadEdgeType, RoadLineType, SignalState};

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Multiplies each RGB channel by `factor`, saturating at 255.
    pub fn brighten(self, factor: f64) -> Self {
        let channel = |c: u8| (c as f64 * factor).round().clamp(0.0, 255.0) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: self.a,
        }
    }
}

pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const OVERLAY: Color = Color::rgb(255, 0, 0);

pub const LANE: Color = Color::rgba(100, 149, 237, 110);
pub const CROSSWALK: Color = Color::rgba(255, 255, 255, 70);
pub const SPEED_BUMP: Color = Color::rgba(255, 165, 0, 90);
pub const DRIVEWAY: Color = Color::rgba(139, 119, 101, 90);
pub const STOP_SIGN: Color = Color::rgb(220, 20, 60);
pub const OBJECT_OF_INTEREST: Color = Color::rgb(255, 215, 0);

/// Trajectory color relative to the agent color.
pub const TRAJECTORY_BRIGHTEN: f64 = 1.3;

// Pixel widths, converted to world units at draw time
pub const LANE_WIDTH_PX: f64 = 1.0;
pub const ROAD_EDGE_WIDTH_PX: f64 = 2.0;
pub const POLYGON_OUTLINE_PX: f64 = 1.0;
pub const AGENT_OUTLINE_PX: f64 = 1.0;
pub const SDC_OUTLINE_PX: f64 = 2.0;
pub const TRAJECTORY_WIDTH_PX: f64 = 1.5;
pub const MARKER_WIDTH_PX: f64 = 2.0;
pub const OVERLAY_WIDTH_PX: f64 = 4.0;

/// Dash pattern (on, off) in pixels.
pub const DASH_PX: [f64; 2] = [6.0, 4.0];

// World-unit radii
pub const STOP_SIGN_RADIUS: f64 = 1.5;
pub const TRAFFIC_LIGHT_RADIUS: f64 = 1.2;

pub const AGENT_ALPHA: u8 = 160;
pub const SDC_ALPHA: u8 = 230;

/// Stroke style of a road line subtype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadLineStyle {
    pub color: Color,
    pub width_px: f64,

    /// Dash pattern in pixels, None for solid lines
    pub dash_px: Option<[f64; 2]>,

    /// Drawn as two parallel lines
    pub double: bool,
}

const ROAD_WHITE: Color = Color::rgb(230, 230, 230);
const ROAD_YELLOW: Color = Color::rgb(255, 204, 0);

pub fn road_line_style(line_type: RoadLineType) -> RoadLineStyle {
    let (color, dashed, double) = match line_type {
        RoadLineType::Unknown => {
            return RoadLineStyle {
                color: Color::rgba(128, 128, 128, 180),
                width_px: 1.0,
                dash_px: None,
                double: false,
            }
        }
        RoadLineType::BrokenSingleWhite => (ROAD_WHITE, true, false),
        RoadLineType::SolidSingleWhite => (ROAD_WHITE, false, false),
        RoadLineType::SolidDoubleWhite => (ROAD_WHITE, false, true),
        RoadLineType::BrokenSingleYellow => (ROAD_YELLOW, true, false),
        RoadLineType::BrokenDoubleYellow => (ROAD_YELLOW, true, true),
        RoadLineType::SolidSingleYellow => (ROAD_YELLOW, false, false),
        RoadLineType::SolidDoubleYellow => (ROAD_YELLOW, false, true),
        RoadLineType::PassingDoubleYellow => (ROAD_YELLOW, true, true),
    };
    RoadLineStyle {
        color,
        width_px: if double { 1.0 } else { 1.5 },
        dash_px: dashed.then_some(DASH_PX),
        double,
    }
}

pub fn road_edge_color(edge_type: RoadEdgeType) -> Color {
    match edge_type {
        RoadEdgeType::Unknown => Color::rgb(150, 150, 150),
        RoadEdgeType::Boundary => Color::rgb(190, 190, 190),
        RoadEdgeType::Median => Color::rgb(200, 120, 60),
    }
}

pub fn agent_color(category: AgentCategory) -> Color {
    match category {
        AgentCategory::Sdc => Color::rgb(0, 200, 255),
        AgentCategory::Vehicle => Color::rgb(66, 135, 245),
        AgentCategory::Pedestrian => Color::rgb(255, 140, 0),
        AgentCategory::Cyclist => Color::rgb(50, 205, 50),
    }
}

pub fn signal_color(state: SignalState) -> Color {
    match state {
        SignalState::Stop | SignalState::ArrowStop | SignalState::FlashingStop => {
            Color::rgb(255, 40, 40)
        }
        SignalState::Caution | SignalState::ArrowCaution | SignalState::FlashingCaution => {
            Color::rgb(255, 220, 0)
        }
        SignalState::Go | SignalState::ArrowGo => Color::rgb(40, 220, 40),
        SignalState::Unknown => Color::rgb(140, 140, 140),
    }
}

/// Prediction target marker color. Difficulty above 2 uses the level 2 color.
pub fn difficulty_color(difficulty: u8) -> Color {
    match difficulty {
        0 => Color::rgb(255, 128, 255),
        1 => Color::rgb(255, 0, 255),
        _ => Color::rgb(255, 0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brighten_saturates() {
        let c = Color::rgb(100, 200, 250).brighten(1.3);
        assert_eq!((c.r, c.g, c.b), (130, 255, 255));
    }

    #[test]
    fn test_brighten_keeps_alpha() {
        let c = Color::rgba(10, 10, 10, 77).brighten(2.0);
        assert_eq!(c.a, 77);
        assert_eq!(c.r, 20);
    }

    #[test]
    fn test_road_line_styles() {
        let passing = road_line_style(RoadLineType::PassingDoubleYellow);
        assert!(passing.double);
        assert!(passing.dash_px.is_some());

        let solid = road_line_style(RoadLineType::SolidSingleWhite);
        assert!(!solid.double);
        assert!(solid.dash_px.is_none());
    }

    #[test]
    fn test_difficulty_colors() {
        assert_eq!(difficulty_color(0), Color::rgb(255, 128, 255));
        assert_eq!(difficulty_color(1), Color::rgb(255, 0, 255));
        assert_eq!(difficulty_color(2), Color::rgb(255, 0, 0));
        assert_eq!(difficulty_color(7), Color::rgb(255, 0, 0));
    }
}
