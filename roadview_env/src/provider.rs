//! Data provider abstraction for the RoadView engine.

use async_trait::async_trait;

use crate::error::EnvError;
use crate::types::{DatasetFolder, FilePage, ScenarioPayload, ScenarioSummary, SearchPage};

/// Abstraction over the backend that enumerates datasets and serves
/// decoded scenario records.
///
/// # Implementations
///
/// - **Production**: an HTTP client against the dataset server, or the
///   JSON-directory provider in `roadview_sim`
/// - **Tests**: in-memory fixtures
///
/// # Request Flow
///
/// ```text
/// UI shell             ViewerApp                 DataProvider
///   |-- open record ----->|                           |
///   |                     |-- load_record(path) ----->|
///   |                     |<-- [ScenarioSummary] -----|
///   |-- next scenario --->|                           |
///   |                     |-- fetch_scenario(i) ----->|
///   |                     |<-- ScenarioPayload -------|
/// ```
///
/// Every method is plain request/response. A failed call must not leave
/// the provider half-switched to a new record.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Lists dataset folders that contain at least one record file.
    async fn list_datasets(&self) -> Result<Vec<DatasetFolder>, EnvError>;

    /// Lists record files of a folder, one page starting at `offset`.
    async fn list_files(&self, folder: &str, offset: usize) -> Result<FilePage, EnvError>;

    /// Loads a record file and makes it the provider's current record.
    ///
    /// # Returns
    /// One summary per scenario in the record, in record order.
    async fn load_record(&self, path: &str) -> Result<Vec<ScenarioSummary>, EnvError>;

    /// Fetches one full scenario of the current record.
    ///
    /// # Errors
    /// * `EnvError::NoRecordLoaded` - `load_record` was never called
    /// * `EnvError::NotFound` - `index` is past the end of the record
    async fn fetch_scenario(&self, index: usize) -> Result<ScenarioPayload, EnvError>;

    /// Case-insensitive filename substring search across all folders.
    async fn search(&self, query: &str, offset: usize) -> Result<SearchPage, EnvError>;
}
