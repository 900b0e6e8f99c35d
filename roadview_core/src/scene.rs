//! The scene model: one fully decoded scenario.
//!
//! A [`Scenario`] is built in one go from a provider payload and never
//! mutated afterwards. The app swaps whole scenarios behind an `Arc`, so
//! the renderer and the hit-test engine always see a consistent scene.
//!
//! # Wire format
//!
//! ```text
//! {
//!   "scenario_id": "...", "timestamps": [0.0, 0.1, ...],
//!   "current_time_index": 10, "sdc_track_index": 3,
//!   "objects_of_interest": [id, ...], "tracks_to_predict": [{track_index, difficulty}],
//!   "map_features": {"lanes": [...], "road_lines": [...], ...},
//!   "tracks": {"sdc": {...} | null, "vehicles": [...], "pedestrians": [...], "cyclists": [...]},
//!   "traffic_lights": [[{lane_id, state, state_name, stop_point}, ...], ...]
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::SceneError;
use crate::geometry::{Planar, Point};
use roadview_env::ScenarioSummary;

// ============================================================================
// MAP POINTS
// ============================================================================

/// A map vertex. Encoded as `[x, y]` or `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }
}

impl Planar for MapPoint {
    fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl TryFrom<Vec<f64>> for MapPoint {
    type Error = String;

    fn try_from(coords: Vec<f64>) -> Result<Self, Self::Error> {
        match coords.as_slice() {
            [x, y] => Ok(Self { x: *x, y: *y, z: None }),
            [x, y, z, ..] => Ok(Self {
                x: *x,
                y: *y,
                z: Some(*z),
            }),
            _ => Err(format!(
                "map point needs at least 2 coordinates, got {}",
                coords.len()
            )),
        }
    }
}

impl From<MapPoint> for Vec<f64> {
    fn from(p: MapPoint) -> Self {
        match p.z {
            Some(z) => vec![p.x, p.y, z],
            None => vec![p.x, p.y],
        }
    }
}

// ============================================================================
// FEATURE SUBTYPES
// ============================================================================

/// Lane type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum LaneType {
    #[default]
    Undefined,
    Freeway,
    SurfaceStreet,
    BikeLane,
}

impl From<i32> for LaneType {
    fn from(code: i32) -> Self {
        match code {
            1 => Self::Freeway,
            2 => Self::SurfaceStreet,
            3 => Self::BikeLane,
            _ => Self::Undefined,
        }
    }
}

impl From<LaneType> for i32 {
    fn from(t: LaneType) -> Self {
        match t {
            LaneType::Undefined => 0,
            LaneType::Freeway => 1,
            LaneType::SurfaceStreet => 2,
            LaneType::BikeLane => 3,
        }
    }
}

impl LaneType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Freeway => "Freeway",
            Self::SurfaceStreet => "Surface Street",
            Self::BikeLane => "Bike Lane",
        }
    }
}

/// Road line subtype, codes 0..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum RoadLineType {
    #[default]
    Unknown,
    BrokenSingleWhite,
    SolidSingleWhite,
    SolidDoubleWhite,
    BrokenSingleYellow,
    BrokenDoubleYellow,
    SolidSingleYellow,
    SolidDoubleYellow,
    PassingDoubleYellow,
}

impl From<i32> for RoadLineType {
    fn from(code: i32) -> Self {
        match code {
            1 => Self::BrokenSingleWhite,
            2 => Self::SolidSingleWhite,
            3 => Self::SolidDoubleWhite,
            4 => Self::BrokenSingleYellow,
            5 => Self::BrokenDoubleYellow,
            6 => Self::SolidSingleYellow,
            7 => Self::SolidDoubleYellow,
            8 => Self::PassingDoubleYellow,
            _ => Self::Unknown,
        }
    }
}

impl From<RoadLineType> for i32 {
    fn from(t: RoadLineType) -> Self {
        match t {
            RoadLineType::Unknown => 0,
            RoadLineType::BrokenSingleWhite => 1,
            RoadLineType::SolidSingleWhite => 2,
            RoadLineType::SolidDoubleWhite => 3,
            RoadLineType::BrokenSingleYellow => 4,
            RoadLineType::BrokenDoubleYellow => 5,
            RoadLineType::SolidSingleYellow => 6,
            RoadLineType::SolidDoubleYellow => 7,
            RoadLineType::PassingDoubleYellow => 8,
        }
    }
}

impl RoadLineType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::BrokenSingleWhite => "Broken Single White",
            Self::SolidSingleWhite => "Solid Single White",
            Self::SolidDoubleWhite => "Solid Double White",
            Self::BrokenSingleYellow => "Broken Single Yellow",
            Self::BrokenDoubleYellow => "Broken Double Yellow",
            Self::SolidSingleYellow => "Solid Single Yellow",
            Self::SolidDoubleYellow => "Solid Double Yellow",
            Self::PassingDoubleYellow => "Passing Double Yellow",
        }
    }
}

/// Road edge subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum RoadEdgeType {
    #[default]
    Unknown,
    Boundary,
    Median,
}

impl From<i32> for RoadEdgeType {
    fn from(code: i32) -> Self {
        match code {
            1 => Self::Boundary,
            2 => Self::Median,
            _ => Self::Unknown,
        }
    }
}

impl From<RoadEdgeType> for i32 {
    fn from(t: RoadEdgeType) -> Self {
        match t {
            RoadEdgeType::Unknown => 0,
            RoadEdgeType::Boundary => 1,
            RoadEdgeType::Median => 2,
        }
    }
}

impl RoadEdgeType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Boundary => "Road Edge Boundary",
            Self::Median => "Road Edge Median",
        }
    }
}

// ============================================================================
// MAP FEATURES
// ============================================================================

/// A stretch of a lane bounded by a road line or edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySegment {
    pub lane_start_index: i64,
    pub lane_end_index: i64,
    pub boundary_feature_id: i64,
    pub boundary_type: RoadLineType,
}

/// A neighboring lane and the index ranges the two lanes share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneNeighbor {
    pub feature_id: i64,
    pub self_start_index: i64,
    pub self_end_index: i64,
    pub neighbor_start_index: i64,
    pub neighbor_end_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: i64,

    /// Lane center line
    #[serde(default)]
    pub polyline: Vec<MapPoint>,

    #[serde(rename = "type", default)]
    pub lane_type: LaneType,

    #[serde(default)]
    pub speed_limit_mph: Option<f64>,

    /// True for lanes synthesized inside intersections
    #[serde(default)]
    pub interpolating: bool,

    #[serde(default)]
    pub entry_lanes: Vec<i64>,

    #[serde(default)]
    pub exit_lanes: Vec<i64>,

    #[serde(default)]
    pub left_neighbors: Vec<LaneNeighbor>,

    #[serde(default)]
    pub right_neighbors: Vec<LaneNeighbor>,

    #[serde(default)]
    pub left_boundaries: Vec<BoundarySegment>,

    #[serde(default)]
    pub right_boundaries: Vec<BoundarySegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadLine {
    pub id: i64,
    #[serde(default)]
    pub polyline: Vec<MapPoint>,
    #[serde(rename = "type", default)]
    pub line_type: RoadLineType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadEdge {
    pub id: i64,
    #[serde(default)]
    pub polyline: Vec<MapPoint>,
    #[serde(rename = "type", default)]
    pub edge_type: RoadEdgeType,
}

/// Crosswalks, speed bumps and driveways share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonFeature {
    pub id: i64,
    #[serde(default)]
    pub polygon: Vec<MapPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSign {
    pub id: i64,
    pub position: MapPoint,
    /// Lanes controlled by this sign
    #[serde(default)]
    pub lane_ids: Vec<i64>,
}

/// All static map features of a scenario, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapFeatures {
    pub lanes: Vec<Lane>,
    pub road_lines: Vec<RoadLine>,
    pub road_edges: Vec<RoadEdge>,
    pub crosswalks: Vec<PolygonFeature>,
    pub stop_signs: Vec<StopSign>,
    pub speed_bumps: Vec<PolygonFeature>,
    pub driveways: Vec<PolygonFeature>,
}

impl MapFeatures {
    /// Total number of features over all kinds.
    pub fn len(&self) -> usize {
        self.lanes.len()
            + self.road_lines.len()
            + self.road_edges.len()
            + self.crosswalks.len()
            + self.stop_signs.len()
            + self.speed_bumps.len()
            + self.driveways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Kind of a map feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Lane,
    RoadLine,
    RoadEdge,
    Crosswalk,
    StopSign,
    SpeedBump,
    Driveway,
}

impl FeatureKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Lane => "Lane",
            Self::RoadLine => "Road Line",
            Self::RoadEdge => "Road Edge",
            Self::Crosswalk => "Crosswalk",
            Self::StopSign => "Stop Sign",
            Self::SpeedBump => "Speed Bump",
            Self::Driveway => "Driveway",
        }
    }
}

/// One map feature of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum MapFeature {
    Lane(Lane),
    RoadLine(RoadLine),
    RoadEdge(RoadEdge),
    Crosswalk(PolygonFeature),
    StopSign(StopSign),
    SpeedBump(PolygonFeature),
    Driveway(PolygonFeature),
}

/// Geometry of a map feature, borrowed from the feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    Polyline(&'a [MapPoint]),
    Polygon(&'a [MapPoint]),
    Point(&'a MapPoint),
}

impl MapFeature {
    pub fn id(&self) -> i64 {
        match self {
            Self::Lane(f) => f.id,
            Self::RoadLine(f) => f.id,
            Self::RoadEdge(f) => f.id,
            Self::StopSign(f) => f.id,
            Self::Crosswalk(f) | Self::SpeedBump(f) | Self::Driveway(f) => f.id,
        }
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Lane(_) => FeatureKind::Lane,
            Self::RoadLine(_) => FeatureKind::RoadLine,
            Self::RoadEdge(_) => FeatureKind::RoadEdge,
            Self::Crosswalk(_) => FeatureKind::Crosswalk,
            Self::StopSign(_) => FeatureKind::StopSign,
            Self::SpeedBump(_) => FeatureKind::SpeedBump,
            Self::Driveway(_) => FeatureKind::Driveway,
        }
    }

    pub fn shape(&self) -> Shape<'_> {
        match self {
            Self::Lane(f) => Shape::Polyline(&f.polyline),
            Self::RoadLine(f) => Shape::Polyline(&f.polyline),
            Self::RoadEdge(f) => Shape::Polyline(&f.polyline),
            Self::StopSign(f) => Shape::Point(&f.position),
            Self::Crosswalk(f) | Self::SpeedBump(f) | Self::Driveway(f) => {
                Shape::Polygon(&f.polygon)
            }
        }
    }
}

// ============================================================================
// TRACKS
// ============================================================================

/// Geometry of a valid object state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,

    /// Radians, counter-clockwise from +x
    pub heading: f64,

    /// (vx, vy) in m/s
    pub velocity: Option<[f64; 2]>,

    pub length: f64,
    pub width: f64,
    pub height: Option<f64>,
}

impl Pose {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Speed in m/s, when the velocity is known.
    pub fn speed(&self) -> Option<f64> {
        self.velocity.map(|[vx, vy]| vx.hypot(vy))
    }
}

/// Per-step state of a tracked object.
///
/// Invalid states carry no geometry at all, so nothing can read a
/// position that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StateRecord", into = "StateRecord")]
pub enum ObjectState {
    Invalid,
    Valid(Pose),
}

impl ObjectState {
    pub fn pose(&self) -> Option<&Pose> {
        match self {
            Self::Valid(pose) => Some(pose),
            Self::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Flat wire form of a state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StateRecord {
    #[serde(default)]
    valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    velocity_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    velocity_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
}

impl From<StateRecord> for ObjectState {
    fn from(r: StateRecord) -> Self {
        if !r.valid {
            return Self::Invalid;
        }
        // A state flagged valid but lacking geometry is treated as invalid
        let (Some(x), Some(y), Some(heading), Some(length), Some(width)) =
            (r.x, r.y, r.heading, r.length, r.width)
        else {
            return Self::Invalid;
        };
        if ![x, y, heading, length, width].iter().all(|v| v.is_finite()) {
            return Self::Invalid;
        }
        let velocity = match (r.velocity_x, r.velocity_y) {
            (Some(vx), Some(vy)) => Some([vx, vy]),
            _ => None,
        };
        Self::Valid(Pose {
            x,
            y,
            z: r.z,
            heading,
            velocity,
            length,
            width,
            height: r.height,
        })
    }
}

impl From<ObjectState> for StateRecord {
    fn from(state: ObjectState) -> Self {
        match state {
            ObjectState::Invalid => Self::default(),
            ObjectState::Valid(p) => Self {
                valid: true,
                x: Some(p.x),
                y: Some(p.y),
                z: p.z,
                heading: Some(p.heading),
                velocity_x: p.velocity.map(|v| v[0]),
                velocity_y: p.velocity.map(|v| v[1]),
                length: Some(p.length),
                width: Some(p.width),
                height: p.height,
            },
        }
    }
}

/// One object's time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,

    #[serde(default)]
    pub object_type: i32,

    /// Position of the track in the source scenario, when known.
    /// Prediction targets refer to tracks by this index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_index: Option<usize>,

    /// Aligned with the scenario timestamps
    #[serde(default)]
    pub states: Vec<ObjectState>,
}

impl Track {
    /// Returns the pose at `step`, or None when the state is invalid or
    /// missing.
    pub fn state_at(&self, step: usize) -> Option<&Pose> {
        self.states.get(step).and_then(ObjectState::pose)
    }

    /// Returns the first valid pose of the track.
    pub fn first_valid(&self) -> Option<&Pose> {
        self.states.iter().find_map(ObjectState::pose)
    }
}

/// Agent category, listed in pick priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentCategory {
    Sdc,
    Vehicle,
    Pedestrian,
    Cyclist,
}

impl AgentCategory {
    /// Categories from highest to lowest pick priority.
    pub const PRIORITY: [AgentCategory; 4] = [
        AgentCategory::Sdc,
        AgentCategory::Vehicle,
        AgentCategory::Pedestrian,
        AgentCategory::Cyclist,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sdc => "SDC",
            Self::Vehicle => "Vehicle",
            Self::Pedestrian => "Pedestrian",
            Self::Cyclist => "Cyclist",
        }
    }
}

/// Tracks grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSet {
    pub sdc: Option<Track>,
    pub vehicles: Vec<Track>,
    pub pedestrians: Vec<Track>,
    pub cyclists: Vec<Track>,
}

impl TrackSet {
    pub fn tracks(&self, category: AgentCategory) -> &[Track] {
        match category {
            AgentCategory::Sdc => self.sdc.as_slice(),
            AgentCategory::Vehicle => &self.vehicles,
            AgentCategory::Pedestrian => &self.pedestrians,
            AgentCategory::Cyclist => &self.cyclists,
        }
    }

    /// Total number of tracks, SDC included.
    pub fn len(&self) -> usize {
        AgentCategory::PRIORITY
            .iter()
            .map(|c| self.tracks(*c).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// MARKERS & SIGNALS
// ============================================================================

/// A track flagged for prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionTarget {
    pub track_index: usize,
    #[serde(default)]
    pub difficulty: u8,
}

/// Named traffic signal state.
///
/// Unrecognized names decode as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalState {
    Stop,
    Caution,
    Go,
    #[default]
    Unknown,
    ArrowStop,
    ArrowCaution,
    ArrowGo,
    FlashingStop,
    FlashingCaution,
}

impl SignalState {
    /// Maps a numeric signal code to its name.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::ArrowStop,
            2 => Self::ArrowCaution,
            3 => Self::ArrowGo,
            4 => Self::Stop,
            5 => Self::Caution,
            6 => Self::Go,
            7 => Self::FlashingStop,
            8 => Self::FlashingCaution,
            _ => Self::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::Caution => "CAUTION",
            Self::Go => "GO",
            Self::Unknown => "UNKNOWN",
            Self::ArrowStop => "ARROW_STOP",
            Self::ArrowCaution => "ARROW_CAUTION",
            Self::ArrowGo => "ARROW_GO",
            Self::FlashingStop => "FLASHING_STOP",
            Self::FlashingCaution => "FLASHING_CAUTION",
        }
    }
}

impl From<String> for SignalState {
    fn from(name: String) -> Self {
        match name.as_str() {
            "STOP" => Self::Stop,
            "CAUTION" => Self::Caution,
            "GO" => Self::Go,
            "ARROW_STOP" => Self::ArrowStop,
            "ARROW_CAUTION" => Self::ArrowCaution,
            "ARROW_GO" => Self::ArrowGo,
            "FLASHING_STOP" => Self::FlashingStop,
            "FLASHING_CAUTION" => Self::FlashingCaution,
            _ => Self::Unknown,
        }
    }
}

impl From<SignalState> for String {
    fn from(state: SignalState) -> Self {
        state.name().to_string()
    }
}

/// State of one controlled lane at one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficLight {
    pub lane_id: i64,

    /// Numeric signal code
    #[serde(default)]
    pub state: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_name: Option<SignalState>,

    #[serde(default)]
    pub stop_point: Option<MapPoint>,
}

impl TrafficLight {
    /// The named state, falling back to the numeric code when no name was
    /// sent.
    pub fn signal(&self) -> SignalState {
        self.state_name
            .unwrap_or_else(|| SignalState::from_code(self.state))
    }
}

// ============================================================================
// SCENARIO
// ============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One loaded scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id: String,

    /// Seconds, strictly increasing
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamps: Vec<f64>,

    /// Index separating history from the future
    #[serde(default)]
    pub current_time_index: usize,

    #[serde(default)]
    pub sdc_track_index: i64,

    /// Track ids flagged as contextually relevant
    #[serde(default, deserialize_with = "null_as_default")]
    pub objects_of_interest: Vec<i64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tracks_to_predict: Vec<PredictionTarget>,

    #[serde(default)]
    pub map_features: MapFeatures,

    #[serde(default)]
    pub tracks: TrackSet,

    /// One list of lane signal states per step
    #[serde(default, deserialize_with = "null_as_default")]
    pub traffic_lights: Vec<Vec<TrafficLight>>,
}

impl Scenario {
    /// Decodes a provider payload.
    ///
    /// Elements that fail the data model are skipped (invalid states, lights
    /// without stop points); only a malformed document as a whole is an
    /// error.
    pub fn from_json(payload: &[u8]) -> Result<Self, SceneError> {
        let scenario: Scenario =
            serde_json::from_slice(payload).map_err(|e| SceneError::Decode(e.to_string()))?;

        if scenario.timestamps.windows(2).any(|w| w[1] <= w[0]) {
            warn!(
                "Scenario {} has non-increasing timestamps",
                scenario.scenario_id
            );
        }
        Ok(scenario)
    }

    /// Last valid step index (0 for a scenario without timestamps).
    pub fn max_step(&self) -> usize {
        self.timestamps.len().saturating_sub(1)
    }

    /// Position of the SDC at step 0, or its first valid position.
    pub fn sdc_start_position(&self) -> Option<Point> {
        let sdc = self.tracks.sdc.as_ref()?;
        sdc.state_at(0)
            .or_else(|| sdc.first_valid())
            .map(Pose::center)
    }

    /// Prediction difficulty of `track`, if it is a prediction target.
    pub fn prediction_difficulty(&self, track: &Track) -> Option<u8> {
        let index = track.track_index?;
        self.tracks_to_predict
            .iter()
            .find(|t| t.track_index == index)
            .map(|t| t.difficulty)
    }

    pub fn is_object_of_interest(&self, track: &Track) -> bool {
        self.objects_of_interest.contains(&track.id)
    }

    /// All tracks with their category, in pick priority order.
    pub fn agents(&self) -> impl Iterator<Item = (AgentCategory, &Track)> + '_ {
        AgentCategory::PRIORITY
            .into_iter()
            .flat_map(move |c| self.tracks.tracks(c).iter().map(move |t| (c, t)))
    }

    /// Looks up a track by category and position within the category.
    pub fn track(&self, category: AgentCategory, index: usize) -> Option<&Track> {
        self.tracks.tracks(category).get(index)
    }

    /// Traffic light states at `step` (empty when none were recorded).
    pub fn lights_at(&self, step: usize) -> &[TrafficLight] {
        self.traffic_lights
            .get(step)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Builds the summary a provider would report for this scenario.
    pub fn summary(&self, index: usize) -> ScenarioSummary {
        ScenarioSummary {
            index,
            scenario_id: self.scenario_id.clone(),
            num_tracks: self.tracks.len(),
            num_timesteps: self.timestamps.len(),
        }
    }
}
