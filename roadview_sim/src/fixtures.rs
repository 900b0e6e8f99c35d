//! On-disk dataset fixtures for tests.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// A small scenario: an SDC driving east along a single lane, one parked
/// vehicle, `steps` timestamps 0.1 s apart.
pub fn scenario_doc(id: &str, steps: usize) -> Value {
    let state = |x: f64, y: f64| {
        json!({
            "x": x, "y": y, "heading": 0.0,
            "velocity_x": 10.0, "velocity_y": 0.0,
            "length": 4.5, "width": 2.0, "valid": true
        })
    };
    let timestamps: Vec<f64> = (0..steps).map(|i| i as f64 * 0.1).collect();
    let sdc: Vec<Value> = (0..steps).map(|i| state(i as f64, 0.0)).collect();
    let parked: Vec<Value> = (0..steps).map(|_| state(15.0, 4.0)).collect();

    json!({
        "scenario_id": id,
        "timestamps": timestamps,
        "sdc_track_index": 0,
        "map_features": {
            "lanes": [{"id": 1, "polyline": [[-20.0, 0.0], [80.0, 0.0]], "type": 2}]
        },
        "tracks": {
            "sdc": {"id": 1, "object_type": 1, "track_index": 0, "states": sdc},
            "vehicles": [{"id": 2, "object_type": 1, "track_index": 1, "states": parked}]
        }
    })
}

/// A dataset root under the system temp directory, removed on drop.
pub struct TempDataset {
    root: PathBuf,
}

impl TempDataset {
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "roadview_sim_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `contents` to `<root>/<folder>/<name>` and returns the path.
    pub fn write_file(&self, folder: &str, name: &str, contents: &str) -> String {
        let dir = self.root.join(folder);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path.display().to_string()
    }

    /// Writes a record of `count` scenarios with ids "<name>-<i>".
    pub fn write_record(&self, folder: &str, name: &str, count: usize) -> String {
        self.write_record_with_steps(folder, name, count, 10)
    }

    pub fn write_record_with_steps(
        &self,
        folder: &str,
        name: &str,
        count: usize,
        steps: usize,
    ) -> String {
        let scenarios: Vec<Value> = (0..count)
            .map(|i| scenario_doc(&format!("{}-{}", name, i), steps))
            .collect();
        self.write_file(folder, name, &json!({ "scenarios": scenarios }).to_string())
    }
}

impl Drop for TempDataset {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
