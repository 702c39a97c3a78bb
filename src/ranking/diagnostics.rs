//! Score distribution summary for the first batch.

use serde::{Deserialize, Serialize};

/// One histogram bucket, `[lower, upper)` except the last which is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f32,
    pub upper: f32,
    pub count: usize,
}

/// Summary statistics and histogram of a block of scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub label: String,
    pub count: usize,
    pub mean: f32,
    /// Population standard deviation.
    pub std: f32,
    pub min: f32,
    pub max: f32,
    pub bins: Vec<HistogramBin>,
}

impl ScoreDistribution {
    /// Summarizes the finite values of `scores` into `bin_count` equal-width bins.
    ///
    /// Returns `None` when there are no finite scores.
    pub fn from_scores(label: impl Into<String>, scores: &[f32], bin_count: usize) -> Option<Self> {
        let finite: Vec<f64> = scores
            .iter()
            .filter(|s| s.is_finite())
            .map(|&s| s as f64)
            .collect();
        if finite.is_empty() {
            return None;
        }

        let count = finite.len();
        let mean = finite.iter().sum::<f64>() / count as f64;
        let variance = finite.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count as f64;
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let bin_count = bin_count.max(1);
        let width = (max - min) / bin_count as f64;
        let mut counts = vec![0usize; bin_count];
        for s in &finite {
            let bin = if width > 0.0 {
                (((s - min) / width) as usize).min(bin_count - 1)
            } else {
                0
            };
            counts[bin] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: (min + width * i as f64) as f32,
                upper: (min + width * (i + 1) as f64) as f32,
                count,
            })
            .collect();

        Some(Self {
            label: label.into(),
            count,
            mean: mean as f32,
            std: variance.sqrt() as f32,
            min: min as f32,
            max: max as f32,
            bins,
        })
    }
}

impl std::fmt::Display for ScoreDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: n={} mean={:.4} std={:.4} min={:.4} max={:.4}",
            self.label, self.count, self.mean, self.std, self.min, self.max
        )
    }
}
