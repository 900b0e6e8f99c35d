//! Shared fixtures for unit tests: scenario documents and an in-memory
//! data provider.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use roadview_env::{
    paginate, DataProvider, DatasetFolder, EnvError, FileEntry, FilePage, ScenarioPayload,
    ScenarioSummary, SearchHit, SearchPage,
};

use crate::scene::Scenario;

pub const SDC_ID: i64 = 100;
pub const VEHICLE_ID: i64 = 200;
pub const PEDESTRIAN_ID: i64 = 300;

/// A valid state at (`x`, `y`) moving at 5 m/s, 4.8 m x 2.0 m.
pub fn valid_state(x: f64, y: f64, heading: f64) -> Value {
    json!({
        "x": x, "y": y, "z": 0.0, "heading": heading,
        "velocity_x": 3.0, "velocity_y": 4.0,
        "length": 4.8, "width": 2.0, "height": 1.6,
        "valid": true
    })
}

pub fn invalid_state() -> Value {
    json!({"valid": false})
}

pub fn track_json(id: i64, object_type: i32, states: Vec<Value>) -> Value {
    json!({"id": id, "object_type": object_type, "states": states})
}

/// A scenario with `steps` timestamps and this layout:
///
/// - SDC driving east along y = 0 from the origin, 1 m per step
/// - one vehicle parked at (20, 10), prediction target (difficulty 2) and
///   object of interest
/// - one pedestrian standing at (-10, -10)
/// - a lane along y = 0, a road line along y = -5, a road edge along y = -15
/// - crosswalk (30..40, 30..40), speed bump (-40..-30, 30..40),
///   driveway (-40..-30, -40..-30), stop sign at (0, 20)
/// - a STOP light on lane 1 at (10, 0) and a GO light without stop point
pub fn scenario_json(steps: usize) -> Value {
    let timestamps: Vec<f64> = (0..steps).map(|i| i as f64 * 0.1).collect();
    let sdc_states: Vec<Value> = (0..steps)
        .map(|i| valid_state(i as f64, 0.0, 0.0))
        .collect();
    let vehicle_states: Vec<Value> = (0..steps).map(|_| valid_state(20.0, 10.0, 0.0)).collect();
    let pedestrian_states: Vec<Value> = (0..steps)
        .map(|_| valid_state(-10.0, -10.0, 0.0))
        .collect();
    let lights: Vec<Value> = (0..steps)
        .map(|_| {
            json!([
                {"lane_id": 1, "state": 4, "state_name": "STOP", "stop_point": [10.0, 0.0]},
                {"lane_id": 8, "state": 6, "state_name": "GO", "stop_point": null}
            ])
        })
        .collect();

    let mut sdc = track_json(SDC_ID, 1, sdc_states);
    sdc["track_index"] = json!(0);
    let mut vehicle = track_json(VEHICLE_ID, 1, vehicle_states);
    vehicle["track_index"] = json!(1);
    let mut pedestrian = track_json(PEDESTRIAN_ID, 2, pedestrian_states);
    pedestrian["track_index"] = json!(2);

    json!({
        "scenario_id": "test-scenario",
        "timestamps": timestamps,
        "current_time_index": 10.min(steps.saturating_sub(1)),
        "sdc_track_index": 0,
        "objects_of_interest": [VEHICLE_ID],
        "tracks_to_predict": [{"track_index": 1, "difficulty": 2}],
        "map_features": {
            "lanes": [{
                "id": 1,
                "polyline": [[-50.0, 0.0, 0.0], [50.0, 0.0, 0.0]],
                "type": 2,
                "speed_limit_mph": 25.0,
                "interpolating": false,
                "entry_lanes": [11],
                "exit_lanes": [12, 13],
                "left_boundaries": [],
                "right_boundaries": [{
                    "lane_start_index": 0, "lane_end_index": 1,
                    "boundary_feature_id": 2, "boundary_type": 1
                }],
                "left_neighbors": [],
                "right_neighbors": []
            }],
            "road_lines": [{"id": 2, "polyline": [[-50.0, -5.0], [50.0, -5.0]], "type": 1}],
            "road_edges": [{"id": 3, "polyline": [[-50.0, -15.0], [50.0, -15.0]], "type": 1}],
            "crosswalks": [{"id": 4, "polygon": square(30.0, 30.0, 10.0)}],
            "stop_signs": [{"id": 5, "position": [0.0, 20.0, 0.0], "lane_ids": [1]}],
            "speed_bumps": [{"id": 6, "polygon": square(-40.0, 30.0, 10.0)}],
            "driveways": [{"id": 7, "polygon": square(-40.0, -40.0, 10.0)}]
        },
        "tracks": {
            "sdc": sdc,
            "vehicles": [vehicle],
            "pedestrians": [pedestrian],
            "cyclists": []
        },
        "traffic_lights": lights
    })
}

fn square(x: f64, y: f64, size: f64) -> Value {
    json!([[x, y], [x + size, y], [x + size, y + size], [x, y + size]])
}

pub fn scene(steps: usize) -> Scenario {
    scene_from(&scenario_json(steps))
}

pub fn scene_from(doc: &Value) -> Scenario {
    Scenario::from_json(doc.to_string().as_bytes()).unwrap()
}

/// Data provider over in-memory records.
///
/// Records are keyed by path; every record lives in the folder "memory".
#[derive(Default)]
pub struct MemoryProvider {
    records: BTreeMap<String, Vec<Value>>,
    current: Mutex<Option<String>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record whose scenarios are the given documents.
    pub fn with_record(mut self, path: &str, scenarios: Vec<Value>) -> Self {
        self.records.insert(path.to_string(), scenarios);
        self
    }

    /// Adds a record of `count` fixture scenarios, ids "<path>-<i>".
    pub fn with_fixture_record(self, path: &str, count: usize, steps: usize) -> Self {
        let scenarios = (0..count)
            .map(|i| {
                let mut doc = scenario_json(steps);
                doc["scenario_id"] = json!(format!("{}-{}", path, i));
                doc
            })
            .collect();
        self.with_record(path, scenarios)
    }
}

#[async_trait]
impl DataProvider for MemoryProvider {
    async fn list_datasets(&self) -> Result<Vec<DatasetFolder>, EnvError> {
        Ok(vec![DatasetFolder {
            name: "memory".to_string(),
            path: "memory".to_string(),
            file_count: self.records.len(),
        }])
    }

    async fn list_files(&self, folder: &str, offset: usize) -> Result<FilePage, EnvError> {
        if folder != "memory" {
            return Err(EnvError::not_found(folder));
        }
        let entries: Vec<FileEntry> = self
            .records
            .keys()
            .map(|path| FileEntry {
                name: path.clone(),
                path: path.clone(),
                size_mb: 0.0,
            })
            .collect();
        let (files, has_more) = paginate(&entries, offset);
        Ok(FilePage {
            folder: folder.to_string(),
            files,
            total_count: entries.len(),
            offset,
            has_more,
        })
    }

    async fn load_record(&self, path: &str) -> Result<Vec<ScenarioSummary>, EnvError> {
        let scenarios = self
            .records
            .get(path)
            .ok_or_else(|| EnvError::not_found(path))?;
        let summaries = scenarios
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let scene = Scenario::from_json(doc.to_string().as_bytes())
                    .map_err(EnvError::serialization)?;
                Ok(scene.summary(i))
            })
            .collect::<Result<Vec<_>, EnvError>>()?;
        *self.current.lock().unwrap() = Some(path.to_string());
        Ok(summaries)
    }

    async fn fetch_scenario(&self, index: usize) -> Result<ScenarioPayload, EnvError> {
        let path = self
            .current
            .lock()
            .unwrap()
            .clone()
            .ok_or(EnvError::NoRecordLoaded)?;
        let doc = self
            .records
            .get(&path)
            .and_then(|r| r.get(index))
            .ok_or_else(|| EnvError::not_found(format!("scenario {}", index)))?;
        Ok(ScenarioPayload::new(path, index, doc.to_string().into_bytes()))
    }

    async fn search(&self, query: &str, offset: usize) -> Result<SearchPage, EnvError> {
        if query.is_empty() {
            return Ok(SearchPage::empty());
        }
        let needle = query.to_lowercase();
        let hits: Vec<SearchHit> = self
            .records
            .keys()
            .filter(|p| p.to_lowercase().contains(&needle))
            .map(|p| SearchHit {
                file_name: p.clone(),
                folder: "memory".to_string(),
                path: p.clone(),
            })
            .collect();
        let (results, has_more) = paginate(&hits, offset);
        Ok(SearchPage {
            results,
            total: hits.len(),
            offset,
            has_more,
        })
    }
}
