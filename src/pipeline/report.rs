use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info};

/// A file whose processing failed; the run moved on to the next file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Per-file outcome of a directory run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub stage: &'static str,
    /// Output files written, in processing order.
    pub processed: Vec<PathBuf>,
    /// Inputs skipped because their output already existed.
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl RunReport {
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            ..Default::default()
        }
    }

    pub fn record_failure(&mut self, path: PathBuf, err: &dyn std::error::Error) {
        error!(stage = self.stage, path = %path.display(), error = %err, "Failed to process file");
        self.failures.push(FileFailure {
            path,
            error: err.to_string(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Inputs seen, whatever their outcome.
    pub fn total(&self) -> usize {
        self.processed.len() + self.skipped.len() + self.failures.len()
    }

    pub fn log_summary(&self) {
        info!(
            stage = self.stage,
            processed = self.processed.len(),
            skipped = self.skipped.len(),
            failed = self.failures.len(),
            "Run finished"
        );
        for failure in &self.failures {
            error!(
                stage = self.stage,
                path = %failure.path.display(),
                error = %failure.error,
                "File failed"
            );
        }
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} processed, {} skipped, {} failed",
            self.stage,
            self.processed.len(),
            self.skipped.len(),
            self.failures.len()
        )
    }
}
