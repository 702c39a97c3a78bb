//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Batch size must be at least one role.
    #[error("invalid batch size '{value}': must be at least 1")]
    InvalidBatchSize { value: String },

    /// Batch size string could not be parsed as a number.
    #[error("failed to parse batch size '{value}': {source}")]
    BatchSizeParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Weight list did not contain exactly four entries.
    #[error("expected 4 comma-separated weights, got {count} in '{value}'")]
    WrongWeightCount { value: String, count: usize },

    /// A weight entry could not be parsed as a float.
    #[error("failed to parse weight '{entry}' in '{value}': {source}")]
    WeightParseError {
        value: String,
        entry: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// A weight was NaN or infinite.
    #[error("weight '{entry}' must be finite")]
    NonFiniteWeight { entry: String },

    /// No reference embedding files were configured.
    #[error("no reference embedding paths configured")]
    NoReferencePaths,

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
