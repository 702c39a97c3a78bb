//! Index-to-name resolution of ranked results.
//!
//! The mapper has no numeric responsibility: it checks every reference index
//! against the [`NameTable`] and emits `{name, similarity_score}` records in
//! the ranker's order. A single out-of-range index means the embedding corpus
//! and its name index disagree, so the whole mapping fails.

pub mod error;
pub mod mapper;
pub mod names;


pub use error::MappingError;
pub use mapper::{MatchRecord, ResultMapper};
pub use names::NameTable;
