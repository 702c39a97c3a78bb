//! Embedding tensors and their preparation.
//!
//! - [`tensor`] loads `(entity, slot, dim)` tensors from `.npy` files.
//! - [`normalize`] provides the L2 normalization used before scoring.
//! - [`device`] picks the compute device for the ranker.

/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// L2 normalization with a norm floor.
pub mod normalize;
/// Host-side embedding tensors.
pub mod tensor;


pub use error::EmbeddingError;
pub use normalize::{l2_norm, l2_normalize, normalize_rows};
pub use tensor::{EmbeddingTensor, SlotMatrix};
