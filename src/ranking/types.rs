use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_WEIGHTS;

/// Coefficients `(w1, w2, w3, w4)` of the four cosine terms.
///
/// Weights are signed; a negative weight penalizes its term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// `cos(role[0], reference[0])`
    pub w1: f32,
    /// `cos(role[0], reference[1])`
    pub w2: f32,
    /// `cos(role[1], reference[2])`
    pub w3: f32,
    /// `cos(role[2], reference[3])`
    pub w4: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::from(DEFAULT_WEIGHTS)
    }
}

impl From<[f32; 4]> for ScoreWeights {
    fn from([w1, w2, w3, w4]: [f32; 4]) -> Self {
        Self { w1, w2, w3, w4 }
    }
}

impl ScoreWeights {
    pub fn as_array(&self) -> [f32; 4] {
        [self.w1, self.w2, self.w3, self.w4]
    }

    /// Score of a pair whose four cosine terms are all `1.0`.
    pub fn sum(&self) -> f32 {
        self.w1 + self.w2 + self.w3 + self.w4
    }
}

impl std::fmt::Display for ScoreWeights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.w1, self.w2, self.w3, self.w4)
    }
}

/// A reference index with its combined score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedHit {
    pub index: usize,
    pub score: f32,
}

impl RankedHit {
    pub fn new(index: usize, score: f32) -> Self {
        Self { index, score }
    }

    /// Ranking order: higher score first, lower index first on ties.
    ///
    /// NaN sorts after every other score; signed zeros compare equal.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        rank_key(other.score)
            .total_cmp(&rank_key(self.score))
            .then(self.index.cmp(&other.index))
    }
}

#[inline]
fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else if score == 0.0 {
        // -0.0 and 0.0 tie
        0.0
    } else {
        score
    }
}

impl std::fmt::Display for RankedHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} ({:.4})", self.index, self.score)
    }
}

/// Per-role top-k hits, stored row-major (`roles × k`).
#[derive(Debug, Clone, PartialEq)]
pub struct TopKResults {
    top_k: usize,
    hits: Vec<RankedHit>,
}

impl TopKResults {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            hits: Vec::new(),
        }
    }

    pub fn with_capacity(top_k: usize, roles: usize) -> Self {
        Self {
            top_k,
            hits: Vec::with_capacity(top_k * roles),
        }
    }

    /// Rebuilds results from parallel row-major index and score buffers.
    ///
    /// Returns `None` if the buffers disagree in length or are not a
    /// multiple of `top_k`.
    pub fn from_parts(top_k: usize, indices: &[u32], scores: &[f32]) -> Option<Self> {
        if top_k == 0 || indices.len() != scores.len() || indices.len() % top_k != 0 {
            return None;
        }
        let hits = indices
            .iter()
            .zip(scores)
            .map(|(&index, &score)| RankedHit::new(index as usize, score))
            .collect();
        Some(Self { top_k, hits })
    }

    /// Appends one role's row. `row` must hold exactly `top_k` hits.
    pub(crate) fn push_row(&mut self, row: &[RankedHit]) {
        debug_assert_eq!(row.len(), self.top_k);
        self.hits.extend_from_slice(row);
    }

    pub(crate) fn extend(&mut self, other: TopKResults) {
        debug_assert_eq!(other.top_k, self.top_k);
        self.hits.extend(other.hits);
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.hits.len().checked_div(self.top_k).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn row(&self, role: usize) -> &[RankedHit] {
        &self.hits[role * self.top_k..(role + 1) * self.top_k]
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, RankedHit> {
        self.hits.chunks_exact(self.top_k.max(1))
    }

    /// Largest reference index across all rows.
    pub fn max_index(&self) -> Option<usize> {
        self.hits.iter().map(|h| h.index).max()
    }

    /// Row-major reference indices.
    pub fn indices(&self) -> Vec<u32> {
        self.hits.iter().map(|h| h.index as u32).collect()
    }

    /// Row-major scores.
    pub fn scores(&self) -> Vec<f32> {
        self.hits.iter().map(|h| h.score).collect()
    }
}
