//! Layer renderer.
//!
//! [`render`] produces a complete [`Frame`] for one step: an ordered list of
//! draw commands in world coordinates, back to front, plus the view
//! transform the host applies to them. The host clears its surface and
//! replays the commands; nothing is drawn incrementally.

use serde::Serialize;

use crate::geometry::{box_corners, offset_polyline, to_world_frame, Planar, Point};
use crate::layers::{Layer, LayerVisibility};
use crate::pick::Picked;
use crate::scene::{AgentCategory, MapPoint, PolygonFeature, Pose, Scenario, Shape, Track};
use crate::style::{self, Color};
use crate::viewport::{ScaleBar, ViewTransform, Viewport};
use nalgebra::Vector2;

/// Growth of the overlay box over the agent box, per axis (meters).
pub const OVERLAY_INFLATE: f64 = 0.6;

/// Diamond radius beyond half the agent's larger dimension (meters).
pub const DIAMOND_PADDING: f64 = 1.0;

/// Circle radius beyond half the agent's larger dimension (meters).
pub const INTEREST_PADDING: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Polyline { points: Vec<Point>, closed: bool },
    Polygon { points: Vec<Point> },
    Circle { center: Point, radius: f64 },
}

/// Complete stroke style of one command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,

    /// World units
    pub width: f64,

    /// (on, off) dash lengths in world units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCommand {
    pub layer: Layer,
    pub primitive: Primitive,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
}

/// One rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub scenario_id: String,
    pub step: usize,
    pub max_step: usize,

    /// Timestamp of `step` in seconds, if recorded
    pub time_sec: Option<f64>,

    pub view: ViewTransform,
    pub scale_bar: ScaleBar,

    /// Back to front
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn commands_in(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.commands.iter().filter(move |c| c.layer == layer)
    }
}

/// Renders `scene` at `step`.
///
/// `step` is clamped to the scene. Hidden layers are skipped entirely.
/// `highlight` is drawn last, on the overlay layer.
pub fn render(
    scene: &Scenario,
    step: usize,
    viewport: &Viewport,
    visibility: &LayerVisibility,
    highlight: Option<&Picked>,
) -> Frame {
    let step = step.min(scene.max_step());
    let mut painter = Painter {
        scene,
        step,
        viewport,
        visibility,
        commands: Vec::new(),
    };

    for layer in Layer::DRAW_ORDER {
        if !visibility.is_visible(layer) {
            continue;
        }
        match layer {
            Layer::Lanes => painter.lanes(),
            Layer::RoadLines => painter.road_lines(),
            Layer::RoadEdges => painter.road_edges(),
            Layer::Crosswalks => {
                painter.polygons(layer, &scene.map_features.crosswalks, style::CROSSWALK)
            }
            Layer::SpeedBumps => {
                painter.polygons(layer, &scene.map_features.speed_bumps, style::SPEED_BUMP)
            }
            Layer::Driveways => {
                painter.polygons(layer, &scene.map_features.driveways, style::DRIVEWAY)
            }
            Layer::StopSigns => painter.stop_signs(),
            Layer::TrafficLights => painter.traffic_lights(),
            Layer::Trajectories => painter.trajectories(),
            Layer::Vehicles => painter.agents(AgentCategory::Vehicle),
            Layer::Pedestrians => painter.agents(AgentCategory::Pedestrian),
            Layer::Cyclists => painter.agents(AgentCategory::Cyclist),
            Layer::Sdc => painter.agents(AgentCategory::Sdc),
            Layer::PredictionTargets => painter.prediction_targets(),
            Layer::ObjectsOfInterest => painter.objects_of_interest(),
            Layer::Overlay => {
                if let Some(picked) = highlight {
                    painter.overlay(picked);
                }
            }
        }
    }

    Frame {
        scenario_id: scene.scenario_id.clone(),
        step,
        max_step: scene.max_step(),
        time_sec: scene.timestamps.get(step).copied(),
        view: viewport.transform(),
        scale_bar: viewport.scale_bar(),
        commands: painter.commands,
    }
}

/// Splits the future of a track (from `step` to the end) into runs of
/// contiguous valid states. Runs shorter than two points are dropped.
pub fn trajectory_runs(track: &Track, step: usize) -> Vec<Vec<Point>> {
    let mut runs = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for state in track.states.get(step..).unwrap_or(&[]) {
        match state.pose() {
            Some(pose) => current.push(pose.center()),
            None => {
                if current.len() >= 2 {
                    runs.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() >= 2 {
        runs.push(current);
    }
    runs
}

struct Painter<'a> {
    scene: &'a Scenario,
    step: usize,
    viewport: &'a Viewport,
    visibility: &'a LayerVisibility,
    commands: Vec<DrawCommand>,
}

fn points(line: &[MapPoint]) -> Vec<Point> {
    line.iter().map(Planar::xy).collect()
}

impl Painter<'_> {
    fn stroke(&self, color: Color, width_px: f64) -> Stroke {
        Stroke {
            color,
            width: self.viewport.stroke_width(width_px),
            dash: None,
        }
    }

    fn dashed(&self, color: Color, width_px: f64, dash_px: [f64; 2]) -> Stroke {
        Stroke {
            dash: Some(dash_px.map(|d| self.viewport.stroke_width(d))),
            ..self.stroke(color, width_px)
        }
    }

    fn push(
        &mut self,
        layer: Layer,
        primitive: Primitive,
        stroke: Option<Stroke>,
        fill: Option<Color>,
    ) {
        self.commands.push(DrawCommand {
            layer,
            primitive,
            stroke,
            fill,
        });
    }

    fn polyline(&mut self, layer: Layer, points: Vec<Point>, stroke: Stroke) {
        if points.len() < 2 {
            return;
        }
        self.push(
            layer,
            Primitive::Polyline {
                points,
                closed: false,
            },
            Some(stroke),
            None,
        );
    }

    fn lanes(&mut self) {
        let scene = self.scene;
        let stroke = self.stroke(style::LANE, style::LANE_WIDTH_PX);
        for lane in &scene.map_features.lanes {
            self.polyline(Layer::Lanes, points(&lane.polyline), stroke);
        }
    }

    fn road_lines(&mut self) {
        let scene = self.scene;
        for line in &scene.map_features.road_lines {
            let ls = style::road_line_style(line.line_type);
            let stroke = match ls.dash_px {
                Some(dash) => self.dashed(ls.color, ls.width_px, dash),
                None => self.stroke(ls.color, ls.width_px),
            };
            if ls.double {
                let gap = self.viewport.stroke_width(ls.width_px * 1.5);
                self.polyline(Layer::RoadLines, offset_polyline(&line.polyline, gap), stroke);
                self.polyline(Layer::RoadLines, offset_polyline(&line.polyline, -gap), stroke);
            } else {
                self.polyline(Layer::RoadLines, points(&line.polyline), stroke);
            }
        }
    }

    fn road_edges(&mut self) {
        let scene = self.scene;
        for edge in &scene.map_features.road_edges {
            let color = style::road_edge_color(edge.edge_type);
            let stroke = self.stroke(color, style::ROAD_EDGE_WIDTH_PX);
            self.polyline(Layer::RoadEdges, points(&edge.polyline), stroke);
        }
    }

    fn polygons(&mut self, layer: Layer, features: &[PolygonFeature], color: Color) {
        let outline = self.stroke(color.with_alpha(200), style::POLYGON_OUTLINE_PX);
        for feature in features {
            if feature.polygon.len() < 3 {
                continue;
            }
            self.push(
                layer,
                Primitive::Polygon {
                    points: points(&feature.polygon),
                },
                Some(outline),
                Some(color),
            );
        }
    }

    fn stop_signs(&mut self) {
        let scene = self.scene;
        for sign in &scene.map_features.stop_signs {
            self.push(
                Layer::StopSigns,
                Primitive::Circle {
                    center: sign.position.xy(),
                    radius: style::STOP_SIGN_RADIUS,
                },
                None,
                Some(style::STOP_SIGN),
            );
        }
    }

    fn traffic_lights(&mut self) {
        let scene = self.scene;
        for light in scene.lights_at(self.step) {
            let Some(stop_point) = light.stop_point else {
                continue;
            };
            self.push(
                Layer::TrafficLights,
                Primitive::Circle {
                    center: stop_point.xy(),
                    radius: style::TRAFFIC_LIGHT_RADIUS,
                },
                None,
                Some(style::signal_color(light.signal())),
            );
        }
    }

    fn trajectories(&mut self) {
        let scene = self.scene;
        for (category, track) in scene.agents() {
            if !self.visibility.is_visible(Layer::for_agent(category)) {
                continue;
            }
            let color = style::agent_color(category).brighten(style::TRAJECTORY_BRIGHTEN);
            let stroke = self.dashed(color, style::TRAJECTORY_WIDTH_PX, style::DASH_PX);
            for run in trajectory_runs(track, self.step) {
                self.polyline(Layer::Trajectories, run, stroke);
            }
        }
    }

    fn agents(&mut self, category: AgentCategory) {
        let layer = Layer::for_agent(category);
        let base = style::agent_color(category);
        let is_sdc = category == AgentCategory::Sdc;
        let (alpha, outline) = if is_sdc {
            (style::SDC_ALPHA, self.stroke(style::WHITE, style::SDC_OUTLINE_PX))
        } else {
            (style::AGENT_ALPHA, self.stroke(base, style::AGENT_OUTLINE_PX))
        };

        let scene = self.scene;
        for track in scene.tracks.tracks(category) {
            let Some(pose) = track.state_at(self.step) else {
                continue;
            };
            let corners = box_corners(&pose.center(), pose.heading, pose.length, pose.width);
            self.push(
                layer,
                Primitive::Polygon {
                    points: corners.to_vec(),
                },
                Some(outline),
                Some(base.with_alpha(alpha)),
            );
            if is_sdc {
                self.push(
                    layer,
                    Primitive::Polygon {
                        points: heading_triangle(pose),
                    },
                    None,
                    Some(style::WHITE),
                );
            }
        }
    }

    fn prediction_targets(&mut self) {
        let scene = self.scene;
        for (category, track) in scene.agents() {
            if !self.visibility.is_visible(Layer::for_agent(category)) {
                continue;
            }
            let Some(difficulty) = scene.prediction_difficulty(track) else {
                continue;
            };
            let Some(pose) = track.state_at(self.step) else {
                continue;
            };
            let r = pose.length.max(pose.width) / 2.0 + DIAMOND_PADDING;
            let c = pose.center();
            let diamond = vec![
                Point::new(c.x + r, c.y),
                Point::new(c.x, c.y + r),
                Point::new(c.x - r, c.y),
                Point::new(c.x, c.y - r),
            ];
            let stroke = self.stroke(style::difficulty_color(difficulty), style::MARKER_WIDTH_PX);
            self.push(
                Layer::PredictionTargets,
                Primitive::Polyline {
                    points: diamond,
                    closed: true,
                },
                Some(stroke),
                None,
            );
        }
    }

    fn objects_of_interest(&mut self) {
        let scene = self.scene;
        let stroke = self.dashed(
            style::OBJECT_OF_INTEREST,
            style::MARKER_WIDTH_PX,
            style::DASH_PX,
        );
        for (category, track) in scene.agents() {
            if !self.visibility.is_visible(Layer::for_agent(category))
                || !scene.is_object_of_interest(track)
            {
                continue;
            }
            let Some(pose) = track.state_at(self.step) else {
                continue;
            };
            self.push(
                Layer::ObjectsOfInterest,
                Primitive::Circle {
                    center: pose.center(),
                    radius: pose.length.max(pose.width) / 2.0 + INTEREST_PADDING,
                },
                Some(stroke),
                None,
            );
        }
    }

    fn overlay(&mut self, picked: &Picked) {
        let stroke = self.stroke(style::OVERLAY, style::OVERLAY_WIDTH_PX);
        match picked {
            Picked::Agent {
                category,
                track_index,
                ..
            } => {
                // Re-resolve at the current step: the pick may be stale
                let scene = self.scene;
                let Some(pose) = scene
                    .track(*category, *track_index)
                    .and_then(|t| t.state_at(self.step))
                else {
                    return;
                };
                let corners = box_corners(
                    &pose.center(),
                    pose.heading,
                    pose.length + OVERLAY_INFLATE,
                    pose.width + OVERLAY_INFLATE,
                );
                self.push(
                    Layer::Overlay,
                    Primitive::Polyline {
                        points: corners.to_vec(),
                        closed: true,
                    },
                    Some(stroke),
                    None,
                );
            }
            Picked::MapFeature { feature } => match feature.shape() {
                Shape::Polyline(line) => self.polyline(Layer::Overlay, points(line), stroke),
                Shape::Polygon(polygon) => {
                    if polygon.len() >= 3 {
                        self.push(
                            Layer::Overlay,
                            Primitive::Polyline {
                                points: points(polygon),
                                closed: true,
                            },
                            Some(stroke),
                            None,
                        );
                    }
                }
                Shape::Point(p) => self.push(
                    Layer::Overlay,
                    Primitive::Circle {
                        center: p.xy(),
                        radius: style::STOP_SIGN_RADIUS + 0.5,
                    },
                    Some(stroke),
                    None,
                ),
            },
        }
    }
}

/// Forward-pointing triangle at the front of a box.
fn heading_triangle(pose: &Pose) -> Vec<Point> {
    let hl = pose.length / 2.0;
    let hw = pose.width / 2.0;
    let center = pose.center();
    vec![
        to_world_frame(Vector2::new(hl + 1.0, 0.0), &center, pose.heading),
        to_world_frame(Vector2::new(hl - 0.5, hw * 0.6), &center, pose.heading),
        to_world_frame(Vector2::new(hl - 0.5, -hw * 0.6), &center, pose.heading),
    ]
}
