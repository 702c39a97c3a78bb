//! Memerank library crate (used by the binary and integration tests).
//!
//! Ranks reference entities (memes) against per-role embeddings and resolves
//! the winners to display names.
//!
//! # Public API Surface
//!
//! ## Ranking
//! - [`SimilarityRanker`], [`RankerConfig`] - Weighted four-term cosine ranking
//! - [`ScoreWeights`], [`TopKResults`], [`RankedHit`] - Scores and selections
//! - [`ScoreDistribution`] - First-batch score diagnostics
//!
//! ## Mapping
//! - [`ResultMapper`], [`NameTable`], [`MatchRecord`] - Index to name resolution
//!
//! ## Embeddings & Storage
//! - [`EmbeddingTensor`] - `(entity, slot, dim)` tensors loaded from `.npy`
//! - [`write_top_k`], [`read_top_k`] - Top-k `.npz` archives
//!
//! ## Orchestration
//! - [`Pipeline`], [`RunReport`] - Directory-level rank and map stages
//! - [`Config`], [`ConfigError`] - Environment configuration

pub mod config;
pub mod constants;
pub mod embedding;
pub mod mapping;
pub mod pipeline;
pub mod ranking;
pub mod storage;

pub use config::{Config, ConfigError};
pub use constants::{
    DimValidationError, REFERENCE_SLOTS, ROLE_SLOTS, TOP_K, validate_embedding_dim,
};
pub use embedding::{EmbeddingError, EmbeddingTensor};
pub use mapping::{MappingError, MatchRecord, NameTable, ResultMapper};
pub use pipeline::{FileFailure, Pipeline, PipelineError, RunReport};
pub use ranking::{
    RankedHit, RankerConfig, RankingError, RankingRun, ScoreDistribution, ScoreWeights,
    SimilarityRanker, TopKResults,
};
pub use storage::{StorageError, read_top_k, write_top_k};
