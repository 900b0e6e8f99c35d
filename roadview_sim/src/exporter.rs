//! JSON exporter for headless runs.
//!
//! Writes rendered frames, the run configuration and the run summary as
//! one JSON document that external tools can replay.

use std::fs::File;
use std::io::Write;

use roadview_core::{Frame, PlaybackMode};
use serde::Serialize;

use crate::runner::RunSummary;

/// Complete export of one headless run.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackExport {
    /// Record file the run started from
    pub record: String,

    /// Scenario index the run started at
    pub scenario_index: usize,

    pub mode: PlaybackMode,
    pub speed: f64,
    pub fps: u32,

    /// Keep every n-th frame (1 = all)
    pub frame_interval: usize,

    /// Scenario time of the last exported frame, in seconds
    pub duration_sec: f64,

    /// Exported frames
    pub frames: Vec<Frame>,

    /// Final results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,

    #[serde(skip)]
    seen: usize,
}

impl PlaybackExport {
    /// Creates a new export container.
    pub fn new(record: &str, scenario_index: usize, mode: PlaybackMode, speed: f64, fps: u32) -> Self {
        Self {
            record: record.to_string(),
            scenario_index,
            mode,
            speed,
            fps,
            frame_interval: 1,
            duration_sec: 0.0,
            frames: Vec::new(),
            summary: None,
            seen: 0,
        }
    }

    /// Keeps only every `interval`-th frame.
    pub fn with_frame_interval(mut self, interval: usize) -> Self {
        self.frame_interval = interval.max(1);
        self
    }

    /// Offers a frame; it is stored if it falls on the export interval.
    pub fn add_frame(&mut self, frame: &Frame) {
        let keep = self.seen % self.frame_interval == 0;
        self.seen += 1;
        if !keep {
            return;
        }
        if let Some(t) = frame.time_sec {
            self.duration_sec = t;
        }
        self.frames.push(frame.clone());
    }

    /// Finalizes the export. The last frame offered is always kept.
    pub fn finalize(&mut self, summary: RunSummary, last: Option<&Frame>) {
        if let Some(frame) = last {
            if self.frames.last() != Some(frame) {
                if let Some(t) = frame.time_sec {
                    self.duration_sec = t;
                }
                self.frames.push(frame.clone());
            }
        }
        self.summary = Some(summary);
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TempDataset;
    use crate::provider::JsonDirProvider;
    use roadview_core::ViewerApp;
    use roadview_env::ManualTicker;

    async fn frames(data: &TempDataset, steps: usize) -> Vec<Frame> {
        let path = data.write_record_with_steps("training", "export.json", 1, steps);
        let mut app = ViewerApp::new(JsonDirProvider::new(data.root()), ManualTicker::new());
        app.open_record(&path).await.unwrap();
        (0..steps)
            .map(|s| {
                app.set_step(s as i64);
                app.render().unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_frame_interval() {
        let data = TempDataset::new("export_interval");
        let frames = frames(&data, 10).await;

        let mut export =
            PlaybackExport::new("export.json", 0, PlaybackMode::Once, 1.0, 30).with_frame_interval(4);
        for f in &frames {
            export.add_frame(f);
        }
        let steps: Vec<usize> = export.frames.iter().map(|f| f.step).collect();
        assert_eq!(steps, vec![0, 4, 8]);

        export.finalize(RunSummary::default(), frames.last());
        assert_eq!(export.frames.last().map(|f| f.step), Some(9));
        approx::assert_relative_eq!(export.duration_sec, 0.9, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn test_write_to_file() {
        let data = TempDataset::new("export_write");
        let frames = frames(&data, 3).await;

        let mut export = PlaybackExport::new("export.json", 0, PlaybackMode::Loop, 2.0, 30);
        for f in &frames {
            export.add_frame(f);
        }
        export.finalize(RunSummary::default(), frames.last());

        let out = data.root().join("out.json");
        export.write_to_file(&out.display().to_string()).unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(doc["mode"], "loop");
        assert_eq!(doc["frames"].as_array().unwrap().len(), 3);
        assert_eq!(doc["frames"][2]["step"], 2);
        assert!(doc["frames"][0]["commands"].as_array().unwrap().len() > 0);
        assert!(doc.get("seen").is_none());
    }
}
