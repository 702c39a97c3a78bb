//! Partial top-k selection over one score row.

use super::types::RankedHit;

/// Returns the `k` best entries of `scores`, best first.
///
/// Uses `select_nth_unstable_by` (average `O(n)`) and then sorts only the
/// `k` survivors. The comparator is a total order over `(score, index)`, so
/// the result does not depend on the unstable partition.
pub fn select_top_k(scores: &[f32], k: usize) -> Vec<RankedHit> {
    let mut candidates: Vec<RankedHit> = scores
        .iter()
        .enumerate()
        .map(|(index, &score)| RankedHit::new(index, score))
        .collect();

    if k == 0 {
        return Vec::new();
    }

    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, RankedHit::rank_cmp);
        candidates.truncate(k);
    }

    candidates.sort_unstable_by(RankedHit::rank_cmp);
    candidates
}
