//! Replay results.

use anyhow::Result;
use scrollspy_store::UiState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// The assertion step that stopped a replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    #[serde(rename = "failed_step_index")]
    pub step_index: usize,
    /// Step type, e.g. `assert_active`
    pub assertion: String,
    pub message: String,
}

/// Machine-readable outcome of a replay.
///
/// A failure's fields appear at the top level of the JSON form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub status: ReportStatus,
    #[serde(flatten)]
    pub failure: Option<AssertionFailure>,
    /// Virtual time consumed by `wait` steps
    pub elapsed_ms: u64,
    /// State change notifications delivered to subscribers
    pub notifications: usize,
    pub final_state: UiState,
}

impl ScenarioReport {
    pub fn passed(elapsed_ms: u64, notifications: usize, final_state: UiState) -> Self {
        Self {
            status: ReportStatus::Passed,
            failure: None,
            elapsed_ms,
            notifications,
            final_state,
        }
    }

    /// Turn this report into a failure at `failure.step_index`
    pub fn fail(mut self, failure: AssertionFailure) -> Self {
        self.status = ReportStatus::Failed;
        self.failure = Some(failure);
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status == ReportStatus::Failed
    }

    pub fn failed_step_index(&self) -> Option<usize> {
        self.failure.as_ref().map(|failure| failure.step_index)
    }

    /// Write pretty JSON, creating parent directories as needed
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)?,
            _ => {}
        }
        let mut file = fs::File::create(path)?;
        self.write_to_writer(&mut file)
    }

    /// Pretty JSON followed by a newline
    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}
