//! Cross-cutting, shared constants.
//!
//! # Slot Layout
//!
//! Every embedding file is a rank-3 tensor `(entity, slot, dim)`. Roles carry
//! [`ROLE_SLOTS`] facets and references carry [`REFERENCE_SLOTS`] facets; the
//! pairing between the two is fixed by the scoring formula in
//! [`crate::ranking`]. The embedding dimension itself is only known at
//! runtime and is checked with [`validate_embedding_dim`] at module
//! boundaries.

/// Vector slots per role entity.
pub const ROLE_SLOTS: usize = 3;

/// Vector slots per reference entity.
pub const REFERENCE_SLOTS: usize = 4;

/// Number of matches kept per role.
pub const TOP_K: usize = 3;

/// Roles scored per batch unless overridden.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default weights `(w1, w2, w3, w4)` for the four cosine terms.
pub const DEFAULT_WEIGHTS: [f32; 4] = [0.3, -0.2, 0.2, 0.7];

/// Norm floor applied before dividing a vector by its L2 norm.
pub const NORM_EPSILON: f32 = 1e-8;

/// Bins in the first-batch score histogram.
pub const HISTOGRAM_BINS: usize = 50;

/// Extension of role/reference embedding files.
pub const EMBEDDING_EXTENSION: &str = "npy";

/// Suffix (including extension) of ranker output archives.
pub const RESULTS_SUFFIX: &str = "_top3_results.npz";

/// Suffix (including extension) of mapped name output files.
pub const MAPPED_SUFFIX: &str = "_top3_image_results.json";

/// Suffix (including extension) of the diagnostics report.
pub const DISTRIBUTION_SUFFIX: &str = "_similarity_distribution.json";

/// Array name for top-k reference indices inside a results archive.
pub const NPZ_INDICES_KEY: &str = "top_indices";

/// Array name for top-k scores inside a results archive.
pub const NPZ_SCORES_KEY: &str = "top_scores";

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// Use this at module boundaries to catch dimension mismatches before any
/// matrix product is attempted.
///
/// # Example
///
/// ```
/// use memerank::constants::validate_embedding_dim;
///
/// let role_dim = 2304;
/// let reference_dim = 2304;
/// validate_embedding_dim(role_dim, reference_dim).unwrap();
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 || actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
