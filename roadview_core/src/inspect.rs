//! Human-readable attributes of a picked object.

use serde::Serialize;

use crate::pick::Picked;
use crate::scene::{AgentCategory, Lane, MapFeature, MapPoint, Pose};

/// One row of the inspector panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    pub value: String,
}

impl Attribute {
    fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Lists the attributes of `picked`, most important first.
pub fn inspect(picked: &Picked) -> Vec<Attribute> {
    match picked {
        Picked::Agent {
            category, id, state, ..
        } => agent_attributes(*category, *id, state),
        Picked::MapFeature { feature } => feature_attributes(feature),
    }
}

fn agent_attributes(category: AgentCategory, id: i64, pose: &Pose) -> Vec<Attribute> {
    let size = match pose.height {
        Some(h) => format!("{:.2} x {:.2} x {:.2} m", pose.length, pose.width, h),
        None => format!("{:.2} x {:.2} m", pose.length, pose.width),
    };
    vec![
        Attribute::new("Category", category.name()),
        Attribute::new("ID", id.to_string()),
        Attribute::new("Position", format!("({:.2}, {:.2})", pose.x, pose.y)),
        Attribute::new("Heading", format!("{:.1}°", pose.heading.to_degrees())),
        Attribute::new(
            "Speed",
            pose.speed()
                .map(|v| format!("{:.2} m/s", v))
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        Attribute::new("Size", size),
        Attribute::new("Valid", "yes"),
    ]
}

fn feature_attributes(feature: &MapFeature) -> Vec<Attribute> {
    let mut attrs = vec![
        Attribute::new("Kind", feature.kind().name()),
        Attribute::new("ID", feature.id().to_string()),
    ];
    match feature {
        MapFeature::Lane(lane) => attrs.extend(lane_attributes(lane)),
        MapFeature::RoadLine(line) => {
            attrs.push(Attribute::new("Type", line.line_type.name()));
            attrs.push(Attribute::new("Points", line.polyline.len().to_string()));
        }
        MapFeature::RoadEdge(edge) => {
            attrs.push(Attribute::new("Type", edge.edge_type.name()));
            attrs.push(Attribute::new("Points", edge.polyline.len().to_string()));
        }
        MapFeature::Crosswalk(p) | MapFeature::SpeedBump(p) | MapFeature::Driveway(p) => {
            attrs.push(Attribute::new("Vertices", p.polygon.len().to_string()));
        }
        MapFeature::StopSign(sign) => {
            attrs.push(Attribute::new("Position", format_point(&sign.position)));
            attrs.push(Attribute::new("Controlled lanes", id_list(&sign.lane_ids)));
        }
    }
    attrs
}

fn lane_attributes(lane: &Lane) -> Vec<Attribute> {
    let neighbors = |list: &[crate::scene::LaneNeighbor]| {
        id_list(&list.iter().map(|n| n.feature_id).collect::<Vec<_>>())
    };
    vec![
        Attribute::new("Type", lane.lane_type.name()),
        Attribute::new(
            "Speed limit",
            lane.speed_limit_mph
                .map(|v| format!("{:.0} mph", v))
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        Attribute::new("Interpolating", if lane.interpolating { "yes" } else { "no" }),
        Attribute::new("Entry lanes", id_list(&lane.entry_lanes)),
        Attribute::new("Exit lanes", id_list(&lane.exit_lanes)),
        Attribute::new("Left neighbors", neighbors(&lane.left_neighbors)),
        Attribute::new("Right neighbors", neighbors(&lane.right_neighbors)),
        Attribute::new("Left boundaries", lane.left_boundaries.len().to_string()),
        Attribute::new("Right boundaries", lane.right_boundaries.len().to_string()),
        Attribute::new("Points", lane.polyline.len().to_string()),
    ]
}

fn format_point(p: &MapPoint) -> String {
    format!("({:.2}, {:.2})", p.x, p.y)
}

fn id_list(ids: &[i64]) -> String {
    if ids.is_empty() {
        return "None".to_string();
    }
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::layers::LayerVisibility;
    use crate::pick::HitTester;
    use crate::testing::scene;

    fn value<'a>(attrs: &'a [Attribute], name: &str) -> &'a str {
        attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
            .unwrap()
    }

    fn pick(x: f64, y: f64) -> Picked {
        HitTester::default()
            .pick(&scene(1), 0, &Point::new(x, y), 3.0, &LayerVisibility::default())
            .unwrap()
    }

    #[test]
    fn test_agent_attributes() {
        let attrs = inspect(&pick(20.0, 10.0));
        assert_eq!(value(&attrs, "Category"), "Vehicle");
        assert_eq!(value(&attrs, "ID"), "200");
        assert_eq!(value(&attrs, "Position"), "(20.00, 10.00)");
        assert_eq!(value(&attrs, "Heading"), "0.0°");
        assert_eq!(value(&attrs, "Speed"), "5.00 m/s");
        assert_eq!(value(&attrs, "Size"), "4.80 x 2.00 x 1.60 m");
    }

    #[test]
    fn test_lane_attributes() {
        let attrs = inspect(&pick(-30.0, 0.0));
        assert_eq!(value(&attrs, "Kind"), "Lane");
        assert_eq!(value(&attrs, "Type"), "Surface Street");
        assert_eq!(value(&attrs, "Speed limit"), "25 mph");
        assert_eq!(value(&attrs, "Exit lanes"), "12, 13");
        assert_eq!(value(&attrs, "Left neighbors"), "None");
        assert_eq!(value(&attrs, "Right boundaries"), "1");
    }

    #[test]
    fn test_stop_sign_attributes() {
        let attrs = inspect(&pick(0.0, 20.0));
        assert_eq!(value(&attrs, "Kind"), "Stop Sign");
        assert_eq!(value(&attrs, "Controlled lanes"), "1");
    }

    #[test]
    fn test_polygon_attributes() {
        let attrs = inspect(&pick(35.0, 35.0));
        assert_eq!(value(&attrs, "Kind"), "Crosswalk");
        assert_eq!(value(&attrs, "Vertices"), "4");
    }
}
