//! Sequencing through the scenarios of the loaded record.

use roadview_env::ScenarioSummary;

use crate::error::NavigationError;

/// Current position within the loaded record.
///
/// The navigator only answers "which index is next". The index becomes
/// current through [`ScenarioNavigator::commit`], after the scenario was
/// actually loaded, so a failed load leaves the position untouched.
#[derive(Debug, Clone, Default)]
pub struct ScenarioNavigator {
    record_path: Option<String>,
    summaries: Vec<ScenarioSummary>,
    current: Option<usize>,
}

impl ScenarioNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the loaded record. No scenario is current afterwards.
    pub fn set_record(&mut self, path: impl Into<String>, summaries: Vec<ScenarioSummary>) {
        self.record_path = Some(path.into());
        self.summaries = summaries;
        self.current = None;
    }

    pub fn record_path(&self) -> Option<&str> {
        self.record_path.as_deref()
    }

    pub fn summaries(&self) -> &[ScenarioSummary] {
        &self.summaries
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_summary(&self) -> Option<&ScenarioSummary> {
        self.current.and_then(|i| self.summaries.get(i))
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Validates `index` against the loaded record.
    pub fn check(&self, index: usize) -> Result<usize, NavigationError> {
        if self.record_path.is_none() {
            return Err(NavigationError::NoRecord);
        }
        if index >= self.summaries.len() {
            return Err(NavigationError::OutOfRange {
                index,
                len: self.summaries.len(),
            });
        }
        Ok(index)
    }

    /// Index of the scenario after the current one.
    pub fn next_index(&self) -> Result<usize, NavigationError> {
        if self.record_path.is_none() {
            return Err(NavigationError::NoRecord);
        }
        let next = self.current.map_or(0, |i| i + 1);
        if next >= self.summaries.len() {
            return Err(NavigationError::AtLastScenario);
        }
        Ok(next)
    }

    /// Index of the scenario before the current one.
    pub fn previous_index(&self) -> Result<usize, NavigationError> {
        if self.record_path.is_none() {
            return Err(NavigationError::NoRecord);
        }
        match self.current {
            Some(i) if i > 0 => Ok(i - 1),
            _ => Err(NavigationError::AtFirstScenario),
        }
    }

    /// Marks `index` as the current scenario. Out-of-range indices are
    /// ignored.
    pub fn commit(&mut self, index: usize) {
        if index < self.summaries.len() {
            self.current = Some(index);
        }
    }
}
