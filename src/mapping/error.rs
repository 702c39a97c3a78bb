use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error(
        "reference index {index} for role {role} is out of bounds for name table of length {table_len}"
    )]
    IndexOutOfBounds {
        role: usize,
        index: usize,
        table_len: usize,
    },

    #[error("name table not found at path: {path}")]
    NamesNotFound { path: PathBuf },

    #[error("failed to read name table {path}: {source}")]
    NamesUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("name table {path} is not a JSON array of strings: {source}")]
    NamesInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
