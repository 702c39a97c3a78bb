use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::embedding::EmbeddingError;
use crate::mapping::MappingError;
use crate::ranking::RankingError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("cannot derive an output name from {path}")]
    InvalidFileName { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("ranking error: {0}")]
    Ranking(#[from] RankingError),

    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
