//! Hit-testing: which object lies under a world point.
//!
//! Objects are tested in a fixed priority order and the first match wins:
//!
//! ```text
//! SDC -> vehicles -> pedestrians -> cyclists
//!     -> road lines -> lanes -> road edges -> crosswalks
//!     -> stop signs -> speed bumps -> driveways
//! ```
//!
//! Hidden layers and invalid states are never tested.

use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::geometry::{distance_to_polyline, point_in_oriented_box, point_in_polygon, Planar, Point};
use crate::layers::{Layer, LayerVisibility};
use crate::scene::{
    AgentCategory, FeatureKind, MapFeature, MapFeatures, MapPoint, Pose, Scenario,
};

/// Map feature pick priority.
pub const FEATURE_PRIORITY: [FeatureKind; 7] = [
    FeatureKind::RoadLine,
    FeatureKind::Lane,
    FeatureKind::RoadEdge,
    FeatureKind::Crosswalk,
    FeatureKind::StopSign,
    FeatureKind::SpeedBump,
    FeatureKind::Driveway,
];

/// The object under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Picked {
    #[serde(rename_all = "camelCase")]
    Agent {
        category: AgentCategory,

        /// Position of the track within its category
        track_index: usize,

        id: i64,

        /// State at the step the pick happened
        state: Pose,
    },
    MapFeature { feature: MapFeature },
}

impl Picked {
    /// True if both picks refer to the same object, regardless of the step
    /// they were taken at.
    pub fn same_object(&self, other: &Picked) -> bool {
        match (self, other) {
            (
                Picked::Agent {
                    category: c1,
                    track_index: i1,
                    id: id1,
                    ..
                },
                Picked::Agent {
                    category: c2,
                    track_index: i2,
                    id: id2,
                    ..
                },
            ) => c1 == c2 && i1 == i2 && id1 == id2,
            (Picked::MapFeature { feature: f1 }, Picked::MapFeature { feature: f2 }) => {
                f1.kind() == f2.kind() && f1.id() == f2.id()
            }
            _ => false,
        }
    }

    /// The layer the picked object is drawn on.
    pub fn layer(&self) -> Layer {
        match self {
            Picked::Agent { category, .. } => Layer::for_agent(*category),
            Picked::MapFeature { feature } => Layer::for_feature(feature.kind()),
        }
    }
}

/// Hit-test tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTester {
    /// Polyline tolerance in screen pixels
    pub pick_tolerance_px: f64,

    /// Stop sign radius in world units
    pub stop_sign_radius: f64,

    /// Relative margin on agent boxes
    pub agent_margin: f64,
}

impl Default for HitTester {
    fn default() -> Self {
        Self {
            pick_tolerance_px: 2.0,
            stop_sign_radius: 2.0,
            agent_margin: 1.1,
        }
    }
}

impl HitTester {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            pick_tolerance_px: config.pick_tolerance_px,
            stop_sign_radius: config.stop_sign_radius,
            agent_margin: config.agent_margin,
        }
    }

    /// Returns the topmost pickable object at `world`.
    ///
    /// `scale` is the current zoom (pixels per meter); polyline tolerance
    /// is constant on screen.
    pub fn pick(
        &self,
        scene: &Scenario,
        step: usize,
        world: &Point,
        scale: f64,
        visibility: &LayerVisibility,
    ) -> Option<Picked> {
        for category in AgentCategory::PRIORITY {
            if !visibility.is_visible(Layer::for_agent(category)) {
                continue;
            }
            for (track_index, track) in scene.tracks.tracks(category).iter().enumerate() {
                let Some(pose) = track.state_at(step) else {
                    continue;
                };
                if self.hits_agent(world, pose) {
                    return Some(Picked::Agent {
                        category,
                        track_index,
                        id: track.id,
                        state: *pose,
                    });
                }
            }
        }

        let tolerance = self.pick_tolerance_px / scale;
        FEATURE_PRIORITY
            .into_iter()
            .filter(|kind| visibility.is_visible(Layer::for_feature(*kind)))
            .find_map(|kind| self.pick_feature(&scene.map_features, kind, world, tolerance))
            .map(|feature| Picked::MapFeature { feature })
    }

    fn hits_agent(&self, world: &Point, pose: &Pose) -> bool {
        point_in_oriented_box(
            world,
            &pose.center(),
            pose.heading,
            pose.length,
            pose.width,
            self.agent_margin,
        )
    }

    fn pick_feature(
        &self,
        features: &MapFeatures,
        kind: FeatureKind,
        world: &Point,
        tolerance: f64,
    ) -> Option<MapFeature> {
        let near = |line: &[MapPoint]| {
            distance_to_polyline(world, line).is_some_and(|d| d < tolerance)
        };
        let inside = |polygon: &[MapPoint]| point_in_polygon(world, polygon);

        match kind {
            FeatureKind::Lane => features
                .lanes
                .iter()
                .find(|f| near(&f.polyline))
                .cloned()
                .map(MapFeature::Lane),
            FeatureKind::RoadLine => features
                .road_lines
                .iter()
                .find(|f| near(&f.polyline))
                .cloned()
                .map(MapFeature::RoadLine),
            FeatureKind::RoadEdge => features
                .road_edges
                .iter()
                .find(|f| near(&f.polyline))
                .cloned()
                .map(MapFeature::RoadEdge),
            FeatureKind::Crosswalk => features
                .crosswalks
                .iter()
                .find(|f| inside(&f.polygon))
                .cloned()
                .map(MapFeature::Crosswalk),
            FeatureKind::StopSign => features
                .stop_signs
                .iter()
                .find(|f| (f.position.xy() - world).norm() <= self.stop_sign_radius)
                .cloned()
                .map(MapFeature::StopSign),
            FeatureKind::SpeedBump => features
                .speed_bumps
                .iter()
                .find(|f| inside(&f.polygon))
                .cloned()
                .map(MapFeature::SpeedBump),
            FeatureKind::Driveway => features
                .driveways
                .iter()
                .find(|f| inside(&f.polygon))
                .cloned()
                .map(MapFeature::Driveway),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{invalid_state, scene, scene_from, scenario_json, PEDESTRIAN_ID, SDC_ID};

    fn pick_at(scene: &Scenario, step: usize, x: f64, y: f64) -> Option<Picked> {
        HitTester::default().pick(
            scene,
            step,
            &Point::new(x, y),
            3.0,
            &LayerVisibility::default(),
        )
    }

    fn feature_kind(picked: Option<Picked>) -> Option<FeatureKind> {
        match picked {
            Some(Picked::MapFeature { feature }) => Some(feature.kind()),
            _ => None,
        }
    }

    #[test]
    fn test_agent_beats_lane() {
        // The SDC sits on the lane at step 0
        let s = scene(10);
        match pick_at(&s, 0, 0.0, 0.0) {
            Some(Picked::Agent { category, id, .. }) => {
                assert_eq!(category, AgentCategory::Sdc);
                assert_eq!(id, SDC_ID);
            }
            other => panic!("expected SDC, got {:?}", other),
        }
    }

    #[test]
    fn test_hidden_agent_layer_reveals_lane() {
        let s = scene(10);
        let mut vis = LayerVisibility::default();
        vis.set(Layer::Sdc, false);
        let picked = HitTester::default().pick(&s, 0, &Point::new(0.0, 0.0), 3.0, &vis);
        assert_eq!(feature_kind(picked), Some(FeatureKind::Lane));
    }

    #[test]
    fn test_agent_pick_follows_step() {
        let s = scene(10);
        // At step 5 the SDC has moved to x = 5
        assert!(matches!(
            pick_at(&s, 5, 5.0, 0.5),
            Some(Picked::Agent { category: AgentCategory::Sdc, .. })
        ));
        assert_eq!(feature_kind(pick_at(&s, 5, -5.0, 0.0)), Some(FeatureKind::Lane));
    }

    #[test]
    fn test_invalid_state_never_picked() {
        let mut doc = scenario_json(3);
        doc["tracks"]["pedestrians"][0]["states"][1] = invalid_state();
        let s = scene_from(&doc);

        assert!(matches!(
            pick_at(&s, 0, -10.0, -10.0),
            Some(Picked::Agent { id: PEDESTRIAN_ID, .. })
        ));
        assert!(pick_at(&s, 1, -10.0, -10.0).is_none());
    }

    #[test]
    fn test_agent_margin() {
        let s = scene(1);
        // Vehicle at (20, 10), half length 2.4; 2.6 is inside the 1.1 margin
        assert!(pick_at(&s, 0, 22.6, 10.0).is_some());
        assert!(pick_at(&s, 0, 22.8, 10.0).is_none());
    }

    #[test]
    fn test_polyline_tolerance_scales_with_zoom() {
        let s = scene(1);
        let vis = LayerVisibility::default();
        let tester = HitTester::default();
        // Road line along y = -5; 0.5 m away
        let p = Point::new(-30.0, -5.5);
        let zoomed_in = tester.pick(&s, 0, &p, 10.0, &vis);
        let zoomed_out = tester.pick(&s, 0, &p, 1.0, &vis);
        assert!(zoomed_in.is_none());
        assert_eq!(feature_kind(zoomed_out), Some(FeatureKind::RoadLine));
    }

    #[test]
    fn test_polygon_and_point_features() {
        let s = scene(1);
        assert_eq!(feature_kind(pick_at(&s, 0, 35.0, 35.0)), Some(FeatureKind::Crosswalk));
        assert_eq!(feature_kind(pick_at(&s, 0, -35.0, 35.0)), Some(FeatureKind::SpeedBump));
        assert_eq!(feature_kind(pick_at(&s, 0, -35.0, -35.0)), Some(FeatureKind::Driveway));
        assert_eq!(feature_kind(pick_at(&s, 0, 1.5, 21.0)), Some(FeatureKind::StopSign));
        assert!(pick_at(&s, 0, 3.0, 23.0).is_none());
    }

    #[test]
    fn test_road_line_beats_lane() {
        let mut doc = scenario_json(1);
        doc["map_features"]["road_lines"][0]["polyline"] = serde_json::json!([[-50.0, 0.0], [50.0, 0.0]]);
        let s = scene_from(&doc);
        assert_eq!(feature_kind(pick_at(&s, 0, -30.0, 0.0)), Some(FeatureKind::RoadLine));
    }

    #[test]
    fn test_empty_space_picks_nothing() {
        let s = scene(1);
        assert!(pick_at(&s, 0, 500.0, 500.0).is_none());
    }

    #[test]
    fn test_same_object_ignores_state() {
        let s = scene(10);
        let a = pick_at(&s, 0, 0.0, 0.0).unwrap();
        let b = pick_at(&s, 5, 5.0, 0.0).unwrap();
        assert_ne!(a, b);
        assert!(a.same_object(&b));
    }

    #[test]
    fn test_picked_wire_format() {
        let s = scene(1);
        let agent = serde_json::to_value(pick_at(&s, 0, 0.0, 0.0).unwrap()).unwrap();
        assert_eq!(agent["kind"], "agent");
        assert_eq!(agent["category"], "sdc");
        assert_eq!(agent["trackIndex"], 0);

        let feature = serde_json::to_value(pick_at(&s, 0, 35.0, 35.0).unwrap()).unwrap();
        assert_eq!(feature["kind"], "mapFeature");
        assert_eq!(feature["feature"]["category"], "crosswalk");
        assert_eq!(feature["feature"]["id"], 4);
    }
}
