//! Weighted multi-slot similarity ranking.
//!
//! Each role carries three embedding slots and each reference four. A pair
//! is scored by four cosine terms drawn from fixed slot pairings (see
//! [`SLOT_PAIRS`]) and combined with signed [`ScoreWeights`]. Roles are
//! scored in batches so only one `batch_size × N_ref` score matrix is live
//! at a time, and each row is reduced to its top-k with a partial selection.
//!
//! # Determinism
//!
//! Ordering is by descending score, then ascending reference index. The
//! selection comparator is a total order, so repeated runs over identical
//! inputs produce identical results.

pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ranker;
pub mod select;
pub mod types;


pub use batch::RoleBatches;
pub use config::RankerConfig;
pub use diagnostics::{HistogramBin, ScoreDistribution};
pub use error::RankingError;
pub use ranker::{
    PreparedReferences, PreparedRoles, RankingRun, SLOT_PAIRS, ScoredBatch, SimilarityRanker,
};
pub use select::select_top_k;
pub use types::{RankedHit, ScoreWeights, TopKResults};
