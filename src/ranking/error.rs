use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("embedding dimension mismatch: roles have {role_dim}, references have {reference_dim}")]
    DimensionMismatch { role_dim: usize, reference_dim: usize },

    #[error("top-{top_k} selection needs at least {top_k} references, got {available}")]
    TooFewReferences { top_k: usize, available: usize },

    #[error("invalid batch size {batch_size}: must be at least 1")]
    InvalidBatchSize { batch_size: usize },

    #[error("invalid top-k {top_k}: must be at least 1")]
    InvalidTopK { top_k: usize },

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("scoring computation failed: {reason}")]
    ComputationFailed { reason: String },
}

impl From<candle_core::Error> for RankingError {
    fn from(err: candle_core::Error) -> Self {
        RankingError::ComputationFailed {
            reason: err.to_string(),
        }
    }
}
