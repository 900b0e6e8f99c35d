//! Render layers and their visibility.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scene::{AgentCategory, FeatureKind};

/// A render layer, ordered back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Lanes,
    RoadLines,
    RoadEdges,
    Crosswalks,
    SpeedBumps,
    Driveways,
    StopSigns,
    TrafficLights,
    Trajectories,
    Vehicles,
    Pedestrians,
    Cyclists,
    Sdc,
    PredictionTargets,
    ObjectsOfInterest,
    Overlay,
}

impl Layer {
    /// Back-to-front draw order.
    pub const DRAW_ORDER: [Layer; 16] = [
        Layer::Lanes,
        Layer::RoadLines,
        Layer::RoadEdges,
        Layer::Crosswalks,
        Layer::SpeedBumps,
        Layer::Driveways,
        Layer::StopSigns,
        Layer::TrafficLights,
        Layer::Trajectories,
        Layer::Vehicles,
        Layer::Pedestrians,
        Layer::Cyclists,
        Layer::Sdc,
        Layer::PredictionTargets,
        Layer::ObjectsOfInterest,
        Layer::Overlay,
    ];

    pub fn for_feature(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Lane => Layer::Lanes,
            FeatureKind::RoadLine => Layer::RoadLines,
            FeatureKind::RoadEdge => Layer::RoadEdges,
            FeatureKind::Crosswalk => Layer::Crosswalks,
            FeatureKind::StopSign => Layer::StopSigns,
            FeatureKind::SpeedBump => Layer::SpeedBumps,
            FeatureKind::Driveway => Layer::Driveways,
        }
    }

    pub fn for_agent(category: AgentCategory) -> Self {
        match category {
            AgentCategory::Sdc => Layer::Sdc,
            AgentCategory::Vehicle => Layer::Vehicles,
            AgentCategory::Pedestrian => Layer::Pedestrians,
            AgentCategory::Cyclist => Layer::Cyclists,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Layer::Lanes => "lanes",
            Layer::RoadLines => "road_lines",
            Layer::RoadEdges => "road_edges",
            Layer::Crosswalks => "crosswalks",
            Layer::SpeedBumps => "speed_bumps",
            Layer::Driveways => "driveways",
            Layer::StopSigns => "stop_signs",
            Layer::TrafficLights => "traffic_lights",
            Layer::Trajectories => "trajectories",
            Layer::Vehicles => "vehicles",
            Layer::Pedestrians => "pedestrians",
            Layer::Cyclists => "cyclists",
            Layer::Sdc => "sdc",
            Layer::PredictionTargets => "prediction_targets",
            Layer::ObjectsOfInterest => "objects_of_interest",
            Layer::Overlay => "overlay",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Layer::DRAW_ORDER
            .into_iter()
            .find(|l| l.name() == wanted)
            .ok_or_else(|| format!("unknown layer: {}", s))
    }
}

/// Per-layer visibility flags. Every layer starts visible.
///
/// Owned by the app and never reset when a scenario is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerVisibility {
    flags: BTreeMap<Layer, bool>,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            flags: Layer::DRAW_ORDER.into_iter().map(|l| (l, true)).collect(),
        }
    }
}

impl LayerVisibility {
    pub fn is_visible(&self, layer: Layer) -> bool {
        self.flags.get(&layer).copied().unwrap_or(true)
    }

    pub fn set(&mut self, layer: Layer, visible: bool) {
        self.flags.insert(layer, visible);
    }

    /// Flips a layer and returns its new visibility.
    pub fn toggle(&mut self, layer: Layer) -> bool {
        let visible = !self.is_visible(layer);
        self.set(layer, visible);
        visible
    }

    /// Layers currently hidden, in draw order.
    pub fn hidden(&self) -> Vec<Layer> {
        Layer::DRAW_ORDER
            .into_iter()
            .filter(|l| !self.is_visible(*l))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_layers_visible_by_default() {
        let vis = LayerVisibility::default();
        assert!(Layer::DRAW_ORDER.iter().all(|l| vis.is_visible(*l)));
        assert!(vis.hidden().is_empty());
    }

    #[test]
    fn test_toggle_layer() {
        let mut vis = LayerVisibility::default();
        assert!(!vis.toggle(Layer::Lanes));
        assert!(!vis.is_visible(Layer::Lanes));
        assert_eq!(vis.hidden(), vec![Layer::Lanes]);
        assert!(vis.toggle(Layer::Lanes));
    }

    #[test]
    fn test_draw_order_matches_enum_order() {
        let mut sorted = Layer::DRAW_ORDER;
        sorted.sort();
        assert_eq!(sorted, Layer::DRAW_ORDER);
        assert_eq!(Layer::DRAW_ORDER.last(), Some(&Layer::Overlay));
    }

    #[test]
    fn test_parse_layer_names() {
        assert_eq!("road-lines".parse::<Layer>(), Ok(Layer::RoadLines));
        assert_eq!("SDC".parse::<Layer>(), Ok(Layer::Sdc));
        assert!("clouds".parse::<Layer>().is_err());
    }
}
