//! Host-side `(entity, slot, dim)` embedding tensors.

use std::path::Path;

use candle_core::{DType, Tensor};
use tracing::{debug, info};

use super::error::EmbeddingError;
use super::normalize::normalize_rows;

/// A fully materialized rank-3 embedding tensor in row-major
/// `(entity, slot, dim)` order.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingTensor {
    data: Vec<f32>,
    entities: usize,
    slots: usize,
    dim: usize,
}

/// One slot of every entity, L2-normalized, as a dense `entities × dim` matrix.
#[derive(Debug, Clone)]
pub struct SlotMatrix {
    /// Row-major values.
    pub data: Vec<f32>,
    /// Number of rows (entities).
    pub rows: usize,
    /// Row width (embedding dimension).
    pub dim: usize,
    /// Entities whose vector for this slot fell under the norm floor.
    pub degenerate: Vec<usize>,
}

impl EmbeddingTensor {
    /// Wraps a flat buffer, checking it matches the declared shape.
    pub fn from_vec(
        data: Vec<f32>,
        entities: usize,
        slots: usize,
        dim: usize,
    ) -> Result<Self, EmbeddingError> {
        let shape = vec![entities, slots, dim];
        if entities == 0 || slots == 0 || dim == 0 {
            return Err(EmbeddingError::Empty { shape });
        }
        let expected = entities * slots * dim;
        if data.len() != expected {
            return Err(EmbeddingError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            entities,
            slots,
            dim,
        })
    }

    /// Converts a candle tensor of any float dtype into a host tensor.
    pub fn from_tensor(tensor: &Tensor) -> Result<Self, EmbeddingError> {
        let shape = tensor.dims().to_vec();
        let (entities, slots, dim) = match shape.as_slice() {
            [e, s, d] => (*e, *s, *d),
            _ => return Err(EmbeddingError::InvalidRank { shape }),
        };
        let data = tensor
            .to_dtype(DType::F32)?
            .flatten_all()?
            .to_vec1::<f32>()?;
        Self::from_vec(data, entities, slots, dim)
    }

    /// Reads a NumPy `.npy` file.
    pub fn read_npy(path: impl AsRef<Path>) -> Result<Self, EmbeddingError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EmbeddingError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        info!(path = %path.display(), "Loading embeddings");
        let tensor = Tensor::read_npy(path).map_err(|e| EmbeddingError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let loaded = Self::from_tensor(&tensor)?;
        info!(
            path = %path.display(),
            shape = ?loaded.shape(),
            "Loaded embeddings"
        );
        Ok(loaded)
    }

    /// Reads several `.npy` files and stacks them along the entity axis.
    pub fn read_npy_many<P: AsRef<Path>>(paths: &[P]) -> Result<Self, EmbeddingError> {
        let parts = paths
            .iter()
            .map(Self::read_npy)
            .collect::<Result<Vec<_>, _>>()?;
        Self::concat(parts)
    }

    /// Stacks tensors along the entity axis, preserving order.
    pub fn concat(parts: Vec<Self>) -> Result<Self, EmbeddingError> {
        let mut iter = parts.into_iter();
        let Some(mut merged) = iter.next() else {
            return Err(EmbeddingError::Empty { shape: vec![0] });
        };
        for part in iter {
            if part.slots != merged.slots {
                return Err(EmbeddingError::SlotCountMismatch {
                    expected: merged.slots,
                    actual: part.slots,
                });
            }
            if part.dim != merged.dim {
                return Err(EmbeddingError::ConcatDimensionMismatch {
                    left: merged.dim,
                    right: part.dim,
                });
            }
            merged.entities += part.entities;
            merged.data.extend_from_slice(&part.data);
        }
        Ok(merged)
    }

    /// Fails unless every entity carries exactly `expected` slots.
    pub fn expect_slots(&self, expected: usize) -> Result<(), EmbeddingError> {
        if self.slots != expected {
            return Err(EmbeddingError::SlotCountMismatch {
                expected,
                actual: self.slots,
            });
        }
        Ok(())
    }

    pub fn entities(&self) -> usize {
        self.entities
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.entities, self.slots, self.dim]
    }

    /// The vector for `entity` at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn vector(&self, entity: usize, slot: usize) -> &[f32] {
        assert!(entity < self.entities && slot < self.slots);
        let start = (entity * self.slots + slot) * self.dim;
        &self.data[start..start + self.dim]
    }

    /// Copies one slot of every entity into a matrix and L2-normalizes each row.
    pub fn normalized_slot(&self, slot: usize, epsilon: f32) -> Result<SlotMatrix, EmbeddingError> {
        if slot >= self.slots {
            return Err(EmbeddingError::SlotCountMismatch {
                expected: slot + 1,
                actual: self.slots,
            });
        }

        let mut data = Vec::with_capacity(self.entities * self.dim);
        for entity in 0..self.entities {
            data.extend_from_slice(self.vector(entity, slot));
        }
        let degenerate = normalize_rows(&mut data, self.dim, epsilon);
        debug!(
            slot,
            rows = self.entities,
            degenerate = degenerate.len(),
            "Normalized slot"
        );

        Ok(SlotMatrix {
            data,
            rows: self.entities,
            dim: self.dim,
            degenerate,
        })
    }
}

impl SlotMatrix {
    /// Row `i` of the matrix.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }
}
