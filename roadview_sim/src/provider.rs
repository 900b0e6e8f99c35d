//! Data provider over a directory of JSON record files.
//!
//! Layout:
//!
//! ```text
//! <root>/
//!   training/
//!     training_0000.json
//!     training_0001.json
//!   validation/
//!     validation_0000.json
//! ```
//!
//! A record file is either `{"scenarios": [ ... ]}` or a bare array of
//! scenario documents. The whole record is parsed on `load_record` and kept
//! in memory until another record is loaded.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use roadview_core::Scenario;
use roadview_env::{
    paginate, DataProvider, DatasetFolder, EnvError, FileEntry, FilePage, ScenarioPayload,
    ScenarioSummary, SearchHit, SearchPage,
};

/// Extension of record files.
pub const RECORD_EXTENSION: &str = "json";

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Wrapped { scenarios: Vec<Value> },
    Bare(Vec<Value>),
}

impl RecordFile {
    fn into_scenarios(self) -> Vec<Value> {
        match self {
            RecordFile::Wrapped { scenarios } => scenarios,
            RecordFile::Bare(scenarios) => scenarios,
        }
    }
}

/// The record currently served by `fetch_scenario`.
struct LoadedRecord {
    path: String,

    /// Serialized scenario documents, in record order
    payloads: Vec<Vec<u8>>,
}

/// [`DataProvider`] backed by JSON files on the local disk.
pub struct JsonDirProvider {
    root: PathBuf,
    current: Mutex<Option<LoadedRecord>>,
}

impl JsonDirProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the loaded record, if any.
    pub fn current_record(&self) -> Option<String> {
        self.current
            .lock()
            .ok()
            .and_then(|c| c.as_ref().map(|r| r.path.clone()))
    }

    /// Resolves a record path: as given if it exists, else under the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let given = PathBuf::from(path);
        if given.exists() {
            given
        } else {
            self.root.join(given)
        }
    }

    /// Sorted names of the subfolders of the root.
    async fn folders(&self) -> Result<Vec<String>, EnvError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| EnvError::backend(format!("{}: {}", self.root.display(), e)))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let is_dir = entry.file_type().await.map_err(io_error)?.is_dir();
            if is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Sorted record files of one folder.
    async fn records_in(&self, folder: &Path) -> Result<Vec<FileEntry>, EnvError> {
        let mut entries = tokio::fs::read_dir(folder).await.map_err(io_error)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let metadata = entry.metadata().await.map_err(io_error)?;
            if !metadata.is_file() {
                continue;
            }
            let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
            files.push(FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: path.display().to_string(),
                size_mb: (size_mb * 10.0).round() / 10.0,
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

fn io_error(err: std::io::Error) -> EnvError {
    if err.kind() == std::io::ErrorKind::NotFound {
        EnvError::not_found(err)
    } else {
        EnvError::backend(err.to_string())
    }
}

fn lock_error<T>(_: T) -> EnvError {
    EnvError::backend("record cache lock poisoned")
}

/// Summarizes every scenario of a record, failing on the first malformed
/// document.
fn summarize(payloads: &[Vec<u8>]) -> Result<Vec<ScenarioSummary>, EnvError> {
    payloads
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            Scenario::from_json(bytes)
                .map(|scene| scene.summary(index))
                .map_err(|e| EnvError::serialization(format!("scenario {}: {}", index, e)))
        })
        .collect()
}

#[async_trait]
impl DataProvider for JsonDirProvider {
    async fn list_datasets(&self) -> Result<Vec<DatasetFolder>, EnvError> {
        let mut datasets = Vec::new();
        for name in self.folders().await? {
            let path = self.root.join(&name);
            let file_count = self.records_in(&path).await?.len();
            if file_count > 0 {
                datasets.push(DatasetFolder {
                    name,
                    path: path.display().to_string(),
                    file_count,
                });
            }
        }
        debug!("Found {} dataset folders under {}", datasets.len(), self.root.display());
        Ok(datasets)
    }

    async fn list_files(&self, folder: &str, offset: usize) -> Result<FilePage, EnvError> {
        let path = self.root.join(folder);
        if !path.is_dir() {
            return Err(EnvError::not_found(format!("folder {}", folder)));
        }
        let records = self.records_in(&path).await?;
        let (files, has_more) = paginate(&records, offset);
        Ok(FilePage {
            folder: folder.to_string(),
            files,
            total_count: records.len(),
            offset,
            has_more,
        })
    }

    async fn load_record(&self, path: &str) -> Result<Vec<ScenarioSummary>, EnvError> {
        let full = self.resolve(path);
        let bytes = tokio::fs::read(&full).await.map_err(io_error)?;
        let record: RecordFile = serde_json::from_slice(&bytes).map_err(EnvError::serialization)?;
        let payloads = record
            .into_scenarios()
            .iter()
            .map(serde_json::to_vec)
            .collect::<Result<Vec<_>, _>>()
            .map_err(EnvError::serialization)?;

        // Fully validated before the cache is touched
        let summaries = summarize(&payloads)?;
        *self.current.lock().map_err(lock_error)? = Some(LoadedRecord {
            path: path.to_string(),
            payloads,
        });
        info!("Record {} loaded ({} scenarios)", full.display(), summaries.len());
        Ok(summaries)
    }

    async fn fetch_scenario(&self, index: usize) -> Result<ScenarioPayload, EnvError> {
        let guard = self.current.lock().map_err(lock_error)?;
        let record = guard.as_ref().ok_or(EnvError::NoRecordLoaded)?;
        let payload = record
            .payloads
            .get(index)
            .ok_or_else(|| EnvError::not_found(format!("scenario {} in {}", index, record.path)))?;
        Ok(ScenarioPayload::new(record.path.clone(), index, payload.clone()))
    }

    async fn search(&self, query: &str, offset: usize) -> Result<SearchPage, EnvError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(SearchPage::empty());
        }
        let mut hits = Vec::new();
        for folder in self.folders().await? {
            for file in self.records_in(&self.root.join(&folder)).await? {
                if file.name.to_lowercase().contains(&needle) {
                    hits.push(SearchHit {
                        file_name: file.name,
                        folder: folder.clone(),
                        path: file.path,
                    });
                }
            }
        }
        hits.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        let (results, has_more) = paginate(&hits, offset);
        Ok(SearchPage {
            results,
            total: hits.len(),
            offset,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{scenario_doc, TempDataset};

    #[tokio::test]
    async fn test_list_datasets_skips_empty_folders() {
        let data = TempDataset::new("list_datasets");
        data.write_record("training", "training_0001.json", 2);
        data.write_record("training", "training_0000.json", 1);
        data.write_file("empty", "notes.txt", "not a record");

        let provider = JsonDirProvider::new(data.root());
        let datasets = provider.list_datasets().await.unwrap();
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].name, "training");
        assert_eq!(datasets[0].file_count, 2);

        let page = provider.list_files("training", 0).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.files[0].name, "training_0000.json");
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_list_files_unknown_folder() {
        let data = TempDataset::new("unknown_folder");
        let provider = JsonDirProvider::new(data.root());
        let err = provider.list_files("nope", 0).await.unwrap_err();
        assert!(matches!(err, EnvError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_load_and_fetch() {
        let data = TempDataset::new("load_fetch");
        let path = data.write_record("validation", "validation_0000.json", 3);

        let provider = JsonDirProvider::new(data.root());
        assert_eq!(
            provider.fetch_scenario(0).await.unwrap_err(),
            EnvError::NoRecordLoaded
        );

        let summaries = provider.load_record(&path).await.unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[2].index, 2);
        assert_eq!(summaries[1].scenario_id, "validation_0000.json-1");

        let payload = provider.fetch_scenario(1).await.unwrap();
        let scene = Scenario::from_json(&payload.payload).unwrap();
        assert_eq!(scene.scenario_id, "validation_0000.json-1");
        assert!(matches!(
            provider.fetch_scenario(3).await,
            Err(EnvError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_bare_array_record() {
        let data = TempDataset::new("bare_array");
        let doc = Value::Array(vec![scenario_doc("bare", 4)]);
        data.write_file("misc", "bare.json", &doc.to_string());

        let provider = JsonDirProvider::new(data.root());
        let summaries = provider.load_record("misc/bare.json").await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].num_timesteps, 4);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_current_record() {
        let data = TempDataset::new("failed_load");
        let good = data.write_record("training", "good.json", 1);
        data.write_file("training", "broken.json", "{\"scenarios\": [");

        let provider = JsonDirProvider::new(data.root());
        provider.load_record(&good).await.unwrap();

        let err = provider.load_record("training/broken.json").await.unwrap_err();
        assert!(matches!(err, EnvError::Serialization(_)));
        assert!(provider.load_record("training/missing.json").await.is_err());

        assert_eq!(provider.current_record(), Some(good));
        assert!(provider.fetch_scenario(0).await.is_ok());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_sorted() {
        let data = TempDataset::new("search");
        data.write_record("validation", "validation_0002.json", 1);
        data.write_record("training", "training_0001.json", 1);
        data.write_record("validation", "Validation_0001.json", 1);

        let provider = JsonDirProvider::new(data.root());
        let page = provider.search("VALIDATION", 0).await.unwrap();
        assert_eq!(page.total, 2);
        let names: Vec<_> = page.results.iter().map(|h| h.file_name.as_str()).collect();
        assert_eq!(names, vec!["Validation_0001.json", "validation_0002.json"]);
        assert_eq!(page.results[0].folder, "validation");

        assert_eq!(provider.search("  ", 0).await.unwrap(), SearchPage::empty());
    }
}
