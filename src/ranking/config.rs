use crate::constants::{DEFAULT_BATCH_SIZE, NORM_EPSILON, TOP_K};

use super::error::RankingError;
use super::types::ScoreWeights;

/// Tuning knobs for [`SimilarityRanker`](super::SimilarityRanker).
#[derive(Debug, Clone, PartialEq)]
pub struct RankerConfig {
    pub weights: ScoreWeights,
    /// Roles scored per batch; bounds the live score matrix to `batch_size × N_ref`.
    pub batch_size: usize,
    pub top_k: usize,
    /// Norm floor used during normalization.
    pub epsilon: f32,
    /// Summarize the first batch's score distribution.
    pub collect_distribution: bool,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            top_k: TOP_K,
            epsilon: NORM_EPSILON,
            collect_distribution: true,
        }
    }
}

impl RankerConfig {
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn without_distribution(mut self) -> Self {
        self.collect_distribution = false;
        self
    }

    pub fn validate(&self) -> Result<(), RankingError> {
        if self.batch_size == 0 {
            return Err(RankingError::InvalidBatchSize {
                batch_size: self.batch_size,
            });
        }
        if self.top_k == 0 {
            return Err(RankingError::InvalidTopK { top_k: self.top_k });
        }
        Ok(())
    }
}
