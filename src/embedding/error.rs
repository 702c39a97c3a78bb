use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding file not found at path: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to load embeddings from {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    #[error("expected a rank-3 (entity, slot, dim) tensor, got shape {shape:?}")]
    InvalidRank { shape: Vec<usize> },

    #[error("expected {expected} slots per entity, got {actual}")]
    SlotCountMismatch { expected: usize, actual: usize },

    #[error("embedding tensor is empty (shape {shape:?})")]
    Empty { shape: Vec<usize> },

    #[error("buffer holds {actual} values, shape requires {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("cannot concatenate embeddings with dimensions {left} and {right}")]
    ConcatDimensionMismatch { left: usize, right: usize },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("tensor operation failed: {reason}")]
    Tensor { reason: String },
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::Tensor {
            reason: err.to_string(),
        }
    }
}
