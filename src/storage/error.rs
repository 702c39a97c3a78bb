use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("archive {path} could not be read or written: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("archive {path} has no '{name}' array")]
    MissingArray { path: PathBuf, name: &'static str },

    #[error("archive {path} holds index {value}, which is not a valid reference position")]
    InvalidIndex { path: PathBuf, value: i64 },

    #[error("archive {path} has inconsistent arrays: {reason}")]
    ShapeMismatch { path: PathBuf, reason: String },
}

pub type StorageResult<T> = Result<T, StorageError>;
