use std::ops::Range;

use candle_core::{Device, Tensor};
use tracing::{debug, info, warn};

use crate::constants::{HISTOGRAM_BINS, REFERENCE_SLOTS, ROLE_SLOTS, validate_embedding_dim};
use crate::embedding::EmbeddingTensor;
use crate::embedding::device::device_label;

use super::batch::RoleBatches;
use super::config::RankerConfig;
use super::diagnostics::ScoreDistribution;
use super::error::RankingError;
use super::select::select_top_k;
use super::types::TopKResults;

/// `(role slot, reference slot)` for the terms weighted by `w1..w4`.
pub const SLOT_PAIRS: [(usize, usize); 4] = [(0, 0), (0, 1), (1, 2), (2, 3)];

/// Normalized role slots resident on the compute device, each `N_role × D`.
#[derive(Debug)]
pub struct PreparedRoles {
    slots: Vec<Tensor>,
    count: usize,
    dim: usize,
    degenerate: usize,
}

/// Normalized reference slots resident on the compute device, each
/// transposed to `D × N_ref`.
#[derive(Debug)]
pub struct PreparedReferences {
    slots_t: Vec<Tensor>,
    count: usize,
    dim: usize,
    degenerate: usize,
}

impl PreparedRoles {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of (entity, slot) vectors that hit the norm floor.
    pub fn degenerate(&self) -> usize {
        self.degenerate
    }
}

impl PreparedReferences {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of (entity, slot) vectors that hit the norm floor.
    pub fn degenerate(&self) -> usize {
        self.degenerate
    }
}

/// Scores for one batch of roles against every reference.
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    pub roles: Range<usize>,
    pub reference_count: usize,
    /// Row-major `roles.len() × reference_count` combined scores.
    pub scores: Vec<f32>,
    pub hits: TopKResults,
}

impl ScoredBatch {
    /// Combined scores of the `i`-th role in this batch.
    pub fn score_row(&self, i: usize) -> &[f32] {
        &self.scores[i * self.reference_count..(i + 1) * self.reference_count]
    }
}

/// Output of a full ranking pass.
#[derive(Debug, Clone)]
pub struct RankingRun {
    pub results: TopKResults,
    /// First-batch score distribution, if requested.
    pub distribution: Option<ScoreDistribution>,
}

/// Weighted four-term cosine ranker.
///
/// ```text
/// score(r, e) = w1·cos(R[r,0], E[e,0]) + w2·cos(R[r,0], E[e,1])
///             + w3·cos(R[r,1], E[e,2]) + w4·cos(R[r,2], E[e,3])
/// ```
///
/// Roles are processed in increasing index order, one batch at a time.
#[derive(Debug, Clone)]
pub struct SimilarityRanker {
    config: RankerConfig,
    device: Device,
}

impl SimilarityRanker {
    pub fn new(config: RankerConfig, device: Device) -> Result<Self, RankingError> {
        config.validate()?;
        Ok(Self { config, device })
    }

    pub fn cpu(config: RankerConfig) -> Result<Self, RankingError> {
        Self::new(config, Device::Cpu)
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Normalizes each role slot and uploads it.
    pub fn prepare_roles(&self, roles: &EmbeddingTensor) -> Result<PreparedRoles, RankingError> {
        roles.expect_slots(ROLE_SLOTS)?;

        let (slots, degenerate) = self.upload_slots(roles, ROLE_SLOTS, "role", false)?;
        Ok(PreparedRoles {
            slots,
            count: roles.entities(),
            dim: roles.dim(),
            degenerate,
        })
    }

    /// Normalizes each reference slot and uploads it transposed.
    pub fn prepare_references(
        &self,
        references: &EmbeddingTensor,
    ) -> Result<PreparedReferences, RankingError> {
        references.expect_slots(REFERENCE_SLOTS)?;

        let (slots_t, degenerate) =
            self.upload_slots(references, REFERENCE_SLOTS, "reference", true)?;
        Ok(PreparedReferences {
            slots_t,
            count: references.entities(),
            dim: references.dim(),
            degenerate,
        })
    }

    fn upload_slots(
        &self,
        tensor: &EmbeddingTensor,
        slot_count: usize,
        side: &'static str,
        transpose: bool,
    ) -> Result<(Vec<Tensor>, usize), RankingError> {
        let mut uploaded = Vec::with_capacity(slot_count);
        let mut degenerate = 0;

        for slot in 0..slot_count {
            let matrix = tensor.normalized_slot(slot, self.config.epsilon)?;
            for &entity in &matrix.degenerate {
                warn!(
                    side,
                    entity,
                    slot,
                    "Near-zero embedding norm, dividing by epsilon floor"
                );
            }
            degenerate += matrix.degenerate.len();

            let t = Tensor::from_vec(matrix.data, (matrix.rows, matrix.dim), &self.device)?;
            let t = if transpose { t.t()?.contiguous()? } else { t };
            uploaded.push(t);
        }

        debug!(
            side,
            entities = tensor.entities(),
            dim = tensor.dim(),
            device = device_label(&self.device),
            "Uploaded normalized slots"
        );
        Ok((uploaded, degenerate))
    }

    /// Checks the pair can be ranked before any batch runs.
    pub fn check_compatible(
        &self,
        roles: &PreparedRoles,
        references: &PreparedReferences,
    ) -> Result<(), RankingError> {
        validate_embedding_dim(roles.dim, references.dim).map_err(|_| {
            RankingError::DimensionMismatch {
                role_dim: roles.dim,
                reference_dim: references.dim,
            }
        })?;
        if references.count < self.config.top_k {
            return Err(RankingError::TooFewReferences {
                top_k: self.config.top_k,
                available: references.count,
            });
        }
        Ok(())
    }

    /// Scores roles `range` against every reference and selects their top-k.
    pub fn score_batch(
        &self,
        roles: &PreparedRoles,
        references: &PreparedReferences,
        range: Range<usize>,
    ) -> Result<ScoredBatch, RankingError> {
        let len = range.len();
        let weights = self.config.weights.as_array();

        let mut combined: Option<Tensor> = None;
        for (&(role_slot, reference_slot), &weight) in SLOT_PAIRS.iter().zip(&weights) {
            let cosines = roles.slots[role_slot]
                .narrow(0, range.start, len)?
                .matmul(&references.slots_t[reference_slot])?;
            let term = cosines.affine(weight as f64, 0.0)?;
            combined = Some(match combined {
                Some(acc) => acc.add(&term)?,
                None => term,
            });
        }
        let combined = combined.ok_or_else(|| RankingError::ComputationFailed {
            reason: "no score terms".to_string(),
        })?;

        let scores = combined.flatten_all()?.to_vec1::<f32>()?;

        let k = self.config.top_k;
        let mut hits = TopKResults::with_capacity(k, len);
        for row in scores.chunks_exact(references.count) {
            hits.push_row(&select_top_k(row, k));
        }

        Ok(ScoredBatch {
            roles: range,
            reference_count: references.count,
            scores,
            hits,
        })
    }

    /// Lazily scores consecutive role batches in increasing order.
    pub fn batches<'a>(
        &'a self,
        roles: &'a PreparedRoles,
        references: &'a PreparedReferences,
    ) -> Result<impl Iterator<Item = Result<ScoredBatch, RankingError>> + 'a, RankingError> {
        self.check_compatible(roles, references)?;
        Ok(RoleBatches::new(roles.count, self.config.batch_size)
            .map(move |range| self.score_batch(roles, references, range)))
    }

    /// Ranks every role against the prepared references.
    ///
    /// `label` names the run in logs and in the score distribution.
    pub fn rank_prepared(
        &self,
        roles: &PreparedRoles,
        references: &PreparedReferences,
        label: &str,
    ) -> Result<RankingRun, RankingError> {
        info!(
            label,
            roles = roles.count,
            references = references.count,
            batch_size = self.config.batch_size,
            weights = %self.config.weights,
            "Computing weighted cosine similarities"
        );

        let mut results = TopKResults::with_capacity(self.config.top_k, roles.count);
        let mut distribution = None;

        for (i, batch) in self.batches(roles, references)?.enumerate() {
            let batch = batch?;

            if i == 0 && self.config.collect_distribution {
                distribution = ScoreDistribution::from_scores(label, &batch.scores, HISTOGRAM_BINS);
                if let Some(d) = &distribution {
                    debug!(summary = %d, "First batch score distribution");
                }
            }

            info!(
                label,
                start = batch.roles.start,
                end = batch.roles.end - 1,
                done = batch.roles.end,
                total = roles.count,
                "Processed role batch"
            );
            results.extend(batch.hits);
        }

        Ok(RankingRun {
            results,
            distribution,
        })
    }

    /// Prepares both tensors and ranks them.
    pub fn rank(
        &self,
        roles: &EmbeddingTensor,
        references: &EmbeddingTensor,
        label: &str,
    ) -> Result<RankingRun, RankingError> {
        if roles.dim() != references.dim() {
            return Err(RankingError::DimensionMismatch {
                role_dim: roles.dim(),
                reference_dim: references.dim(),
            });
        }
        let prepared_references = self.prepare_references(references)?;
        let prepared_roles = self.prepare_roles(roles)?;
        self.rank_prepared(&prepared_roles, &prepared_references, label)
    }
}
