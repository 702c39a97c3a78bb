//! L2 normalization with a norm floor.
//!
//! A vector whose norm is below the floor is divided by the floor instead of
//! its norm. An all-zero vector therefore stays all-zero and never turns into
//! NaN/inf; callers should still treat it as an ill-formed embedding.

/// L2 norm of `v`.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Normalizes `v` in place. Returns `true` if the norm fell under `epsilon`.
#[inline]
pub fn l2_normalize(v: &mut [f32], epsilon: f32) -> bool {
    let norm = l2_norm(v);
    let degenerate = norm < epsilon;
    let divisor = if degenerate { epsilon } else { norm };
    for x in v.iter_mut() {
        *x /= divisor;
    }
    degenerate
}

/// Normalizes every `dim`-wide row of `data`. Returns the degenerate row indices.
pub fn normalize_rows(data: &mut [f32], dim: usize, epsilon: f32) -> Vec<usize> {
    if dim == 0 {
        return Vec::new();
    }
    data.chunks_exact_mut(dim)
        .enumerate()
        .filter_map(|(i, row)| l2_normalize(row, epsilon).then_some(i))
        .collect()
}
