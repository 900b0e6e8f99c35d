//! Error types for the RoadView environment abstraction.

use thiserror::Error;

/// Errors that can occur when talking to the data provider or the clock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// The backend failed to answer (I/O failure, transport error, etc.)
    #[error("Backend error: {0}")]
    Backend(String),

    /// A folder, record file or scenario index does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request itself was malformed (empty path, bad offset, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A record or payload could not be encoded/decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A scenario was requested before any record file was loaded
    #[error("No record file has been loaded")]
    NoRecordLoaded,
}

impl EnvError {
    /// Creates a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Creates a not-found error.
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }

    /// Creates a serialization error.
    pub fn serialization(err: impl std::fmt::Display) -> Self {
        Self::Serialization(err.to_string())
    }
}
