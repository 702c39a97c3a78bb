//! NumPy `.npz` archives of per-role top-k results.
//!
//! Layout: `top_indices` (`u32`, `roles × k`) and `top_scores` (`f32`,
//! `roles × k`), both row-major in role order.

use std::fs;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use tracing::debug;

use crate::constants::{NPZ_INDICES_KEY, NPZ_SCORES_KEY, TOP_K};
use crate::ranking::TopKResults;

use super::error::{StorageError, StorageResult};
use super::json::{ensure_parent_dir, temp_path};

/// Writes `results` to `path` as an `.npz` archive.
pub fn write_top_k(path: &Path, results: &TopKResults) -> StorageResult<()> {
    let archive_err = |e: candle_core::Error| StorageError::Archive {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let shape = (results.len(), results.top_k());
    let indices = Tensor::from_vec(results.indices(), shape, &Device::Cpu).map_err(archive_err)?;
    let scores = Tensor::from_vec(results.scores(), shape, &Device::Cpu).map_err(archive_err)?;

    ensure_parent_dir(path)?;
    let temp = temp_path(path);
    Tensor::write_npz(
        &[(NPZ_INDICES_KEY, &indices), (NPZ_SCORES_KEY, &scores)],
        &temp,
    )
    .map_err(archive_err)?;
    fs::rename(&temp, path)?;

    debug!(path = %path.display(), roles = results.len(), "Wrote top-k archive");
    Ok(())
}

/// Reads an archive written by [`write_top_k`].
///
/// Archives must hold exactly [`TOP_K`] hits per role.
pub fn read_top_k(path: &Path) -> StorageResult<TopKResults> {
    let archive_err = |e: candle_core::Error| StorageError::Archive {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let arrays = Tensor::read_npz(path).map_err(archive_err)?;
    let find = |name: &'static str| {
        arrays
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, t)| t)
            .ok_or_else(|| StorageError::MissingArray {
                path: path.to_path_buf(),
                name,
            })
    };
    let indices = find(NPZ_INDICES_KEY)?;
    let scores = find(NPZ_SCORES_KEY)?;

    let (roles, top_k) = indices.dims2().map_err(archive_err)?;
    if top_k != TOP_K {
        return Err(StorageError::ShapeMismatch {
            path: path.to_path_buf(),
            reason: format!("expected {TOP_K} hits per role, got {top_k}"),
        });
    }
    if scores.dims() != indices.dims() {
        return Err(StorageError::ShapeMismatch {
            path: path.to_path_buf(),
            reason: format!(
                "indices {:?} vs scores {:?}",
                indices.dims(),
                scores.dims()
            ),
        });
    }

    let indices: Vec<u32> = match indices.dtype() {
        DType::U32 => indices
            .flatten_all()
            .and_then(|t| t.to_vec1::<u32>())
            .map_err(archive_err)?,
        // signed archives: every value must still fit a u32
        _ => indices
            .to_dtype(DType::I64)
            .and_then(|t| t.flatten_all())
            .and_then(|t| t.to_vec1::<i64>())
            .map_err(archive_err)?
            .into_iter()
            .map(|i| {
                u32::try_from(i).map_err(|_| StorageError::InvalidIndex {
                    path: path.to_path_buf(),
                    value: i,
                })
            })
            .collect::<StorageResult<_>>()?,
    };
    let scores = scores
        .to_dtype(DType::F32)
        .and_then(|t| t.flatten_all())
        .and_then(|t| t.to_vec1::<f32>())
        .map_err(archive_err)?;

    TopKResults::from_parts(top_k, &indices, &scores).ok_or_else(|| StorageError::ShapeMismatch {
        path: path.to_path_buf(),
        reason: format!("{roles} rows of {top_k} do not match buffer lengths"),
    })
}
