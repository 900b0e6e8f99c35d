//! Request/response records exchanged with the data provider.

use serde::{Deserialize, Serialize};

/// Number of entries returned per page by `list_files` and `search`.
pub const PAGE_SIZE: usize = 50;

/// A dataset folder containing record files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFolder {
    /// Folder name (relative to the dataset root)
    pub name: String,

    /// Full path of the folder as the provider knows it
    pub path: String,

    /// Number of record files in the folder
    pub file_count: usize,
}

/// One record file inside a dataset folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub size_mb: f64,
}

/// A page of record files, addressed by an offset cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePage {
    pub folder: String,
    pub files: Vec<FileEntry>,
    pub total_count: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Lightweight description of one scenario inside a loaded record file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    /// Position of the scenario within its record file
    pub index: usize,

    pub scenario_id: String,

    /// Number of tracks (all categories, SDC included)
    pub num_tracks: usize,

    /// Number of timestamps
    pub num_timesteps: usize,
}

/// A filename search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub file_name: String,
    pub folder: String,
    pub path: String,
}

/// A page of search matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchHit>,
    pub total: usize,
    pub offset: usize,
    pub has_more: bool,
}

impl SearchPage {
    /// The page returned for an empty query.
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total: 0,
            offset: 0,
            has_more: false,
        }
    }
}

/// Envelope for one full scenario.
///
/// The payload is opaque JSON bytes; the engine decodes it into its own
/// scene model so this crate stays free of scene types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPayload {
    /// Record file the scenario came from
    pub record_path: String,

    /// Index of the scenario inside the record file
    pub index: usize,

    /// Raw JSON document
    pub payload: Vec<u8>,
}

impl ScenarioPayload {
    /// Creates a new envelope.
    pub fn new(record_path: impl Into<String>, index: usize, payload: Vec<u8>) -> Self {
        Self {
            record_path: record_path.into(),
            index,
            payload,
        }
    }

    /// Returns the payload size in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

/// Slices `items` into one page starting at `offset`.
///
/// Returns the page and whether more entries follow it.
pub fn paginate<T: Clone>(items: &[T], offset: usize) -> (Vec<T>, bool) {
    let start = offset.min(items.len());
    let end = offset.saturating_add(PAGE_SIZE).min(items.len());
    (items[start..end].to_vec(), offset.saturating_add(PAGE_SIZE) < items.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_first_page() {
        let items: Vec<usize> = (0..120).collect();
        let (page, has_more) = paginate(&items, 0);
        assert_eq!(page.len(), PAGE_SIZE);
        assert_eq!(page[0], 0);
        assert!(has_more);
    }

    #[test]
    fn test_paginate_last_page() {
        let items: Vec<usize> = (0..120).collect();
        let (page, has_more) = paginate(&items, 100);
        assert_eq!(page, (100..120).collect::<Vec<_>>());
        assert!(!has_more);
    }

    #[test]
    fn test_paginate_offset_past_end() {
        let items: Vec<usize> = (0..10).collect();
        let (page, has_more) = paginate(&items, 40);
        assert!(page.is_empty());
        assert!(!has_more);
    }

    #[test]
    fn test_summary_wire_format() {
        let summary = ScenarioSummary {
            index: 3,
            scenario_id: "abc".to_string(),
            num_tracks: 12,
            num_timesteps: 91,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["scenario_id"], "abc");
        assert_eq!(json["num_timesteps"], 91);
    }
}
