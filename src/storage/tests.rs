use super::*;
use crate::ranking::{RankedHit, TopKResults};
use candle_core::{Device, Tensor};
use serde::Serialize;

fn sample_results() -> TopKResults {
    TopKResults::from_parts(3, &[4, 1, 0, 2, 3, 1], &[0.91, 0.5, 0.12, 0.8, 0.8, -0.1])
        .expect("valid parts")
}

#[test]
fn test_top_k_archive_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("role_top3_results.npz");
    let results = sample_results();

    write_top_k(&path, &results).expect("write");
    let loaded = read_top_k(&path).expect("read");

    assert_eq!(loaded, results);
    assert_eq!(loaded.row(1)[1], RankedHit::new(3, 0.8));
}

#[test]
fn test_write_top_k_creates_directories_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested/out/role_top3_results.npz");

    write_top_k(&path, &sample_results()).expect("write");

    assert!(path.exists());
    let leftovers: Vec<_> = std::fs::read_dir(path.parent().expect("parent"))
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_read_top_k_accepts_signed_indices() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("signed.npz");
    let indices = Tensor::from_vec(vec![2i64, 0, 1], (1, 3), &Device::Cpu).expect("indices");
    let scores = Tensor::from_vec(vec![0.9f32, 0.4, 0.1], (1, 3), &Device::Cpu).expect("scores");
    Tensor::write_npz(&[("top_indices", &indices), ("top_scores", &scores)], &path)
        .expect("write npz");

    let loaded = read_top_k(&path).expect("read");
    assert_eq!(loaded.indices(), vec![2, 0, 1]);
}

#[test]
fn test_read_top_k_rejects_negative_indices() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("negative.npz");
    let indices = Tensor::from_vec(vec![2i64, -1, 1], (1, 3), &Device::Cpu).expect("indices");
    let scores = Tensor::from_vec(vec![0.9f32, 0.4, 0.1], (1, 3), &Device::Cpu).expect("scores");
    Tensor::write_npz(&[("top_indices", &indices), ("top_scores", &scores)], &path)
        .expect("write npz");

    assert!(matches!(
        read_top_k(&path),
        Err(StorageError::InvalidIndex { value: -1, .. })
    ));
}

#[test]
fn test_read_top_k_missing_array() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("partial.npz");
    let indices = Tensor::from_vec(vec![0u32, 1, 2], (1, 3), &Device::Cpu).expect("indices");
    Tensor::write_npz(&[("top_indices", &indices)], &path).expect("write npz");

    assert!(matches!(
        read_top_k(&path),
        Err(StorageError::MissingArray {
            name: "top_scores",
            ..
        })
    ));
}

#[test]
fn test_read_top_k_shape_mismatch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("mismatch.npz");
    let indices = Tensor::from_vec(vec![0u32, 1, 2], (1, 3), &Device::Cpu).expect("indices");
    let scores = Tensor::from_vec(vec![0.1f32; 6], (2, 3), &Device::Cpu).expect("scores");
    Tensor::write_npz(&[("top_indices", &indices), ("top_scores", &scores)], &path)
        .expect("write npz");

    assert!(matches!(
        read_top_k(&path),
        Err(StorageError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_read_top_k_rejects_wrong_hit_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wide_top3_results.npz");
    let indices = Tensor::from_vec((0u32..10).collect::<Vec<_>>(), (2, 5), &Device::Cpu)
        .expect("indices");
    let scores = Tensor::from_vec(vec![0.5f32; 10], (2, 5), &Device::Cpu).expect("scores");
    Tensor::write_npz(&[("top_indices", &indices), ("top_scores", &scores)], &path)
        .expect("write npz");

    let err = read_top_k(&path).unwrap_err();
    assert!(matches!(err, StorageError::ShapeMismatch { .. }));
    assert!(err.to_string().contains("got 5"));
}

#[test]
fn test_read_top_k_not_an_archive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("garbage.npz");
    std::fs::write(&path, b"not a zip").expect("write");

    assert!(matches!(read_top_k(&path), Err(StorageError::Archive { .. })));
}

#[derive(Serialize)]
struct Record<'a> {
    name: &'a str,
    similarity_score: f32,
}

#[test]
fn test_write_json_atomic_creates_parent_dirs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("a/b/out.json");
    let rows = vec![vec![Record {
        name: "cat.png",
        similarity_score: 0.75,
    }]];

    write_json_atomic(&path, &rows).expect("write");

    let text = std::fs::read_to_string(&path).expect("read");
    let value: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(value[0][0]["name"], "cat.png");
    assert_eq!(value[0][0]["similarity_score"], 0.75);
    assert!(!json::temp_path(&path).exists());
}

#[test]
fn test_ensure_parent_dir_relative_file_name() {
    assert!(ensure_parent_dir(std::path::Path::new("out.json")).is_ok());
}
