//! Error types for the RoadView engine.

use roadview_env::EnvError;
use thiserror::Error;

/// Errors raised while decoding a scenario payload into the scene model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The payload is not a well-formed scenario document
    #[error("Failed to decode scenario: {0}")]
    Decode(String),
}

/// Errors raised while reading a viewer config document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to parse viewer config: {0}")]
    Parse(String),
}

/// Errors raised by the scenario navigator.
///
/// All of these are boundary conditions, not failures: the app turns them
/// into user notices and leaves its state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("No record file is loaded")]
    NoRecord,

    #[error("Already at the last scenario")]
    AtLastScenario,

    #[error("Already at the first scenario")]
    AtFirstScenario,

    #[error("Scenario index {index} out of range (record has {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Top-level error of the viewer application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// The response was superseded by a newer request
    #[error("Response discarded: a newer request is pending")]
    Stale,
}

impl ViewerError {
    /// Returns true for responses that were dropped by request gating.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}
