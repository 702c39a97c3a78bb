//! Test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use candle_core::{Device, Tensor};
use memerank::config::Config;
use tempfile::TempDir;

pub const DEFAULT_DIM: usize = 8;

pub const DEFAULT_SEED: u64 = 42;

/// Builds `(entities, slots, dim)` float tensors and writes them as `.npy`.
pub struct EmbeddingFixtureBuilder {
    entities: usize,
    slots: usize,
    dim: usize,
    seed: Option<u64>,
}

impl EmbeddingFixtureBuilder {
    pub fn roles(entities: usize) -> Self {
        Self {
            entities,
            slots: memerank::ROLE_SLOTS,
            dim: DEFAULT_DIM,
            seed: None,
        }
    }

    pub fn references(entities: usize) -> Self {
        Self {
            entities,
            slots: memerank::REFERENCE_SLOTS,
            dim: DEFAULT_DIM,
            seed: None,
        }
    }

    pub fn dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    /// Pseudo-random values instead of basis vectors.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Without a seed, every slot of entity `i` is the basis vector `e_(i % dim)`.
    pub fn data(&self) -> Vec<f32> {
        match self.seed {
            Some(seed) => generate_deterministic_values(self.entities * self.slots * self.dim, seed),
            None => {
                let mut data = vec![0.0f32; self.entities * self.slots * self.dim];
                for (i, chunk) in data.chunks_exact_mut(self.dim).enumerate() {
                    chunk[(i / self.slots) % self.dim] = 1.0;
                }
                data
            }
        }
    }

    pub fn write(self, path: &Path) -> PathBuf {
        Tensor::from_vec(self.data(), (self.entities, self.slots, self.dim), &Device::Cpu)
            .expect("fixture tensor")
            .write_npy(path)
            .expect("write fixture npy");
        path.to_path_buf()
    }
}

pub fn generate_deterministic_values(len: usize, seed: u64) -> Vec<f32> {
    let mut state = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) % 2000) as f32 / 1000.0 - 1.0
        })
        .collect()
}

pub fn write_names(path: &Path, count: usize) -> PathBuf {
    let names: Vec<String> = (0..count).map(|i| format!("meme_{i:03}.png")).collect();
    fs::write(path, serde_json::to_string(&names).expect("names json")).expect("write names");
    path.to_path_buf()
}

/// A temporary role directory, reference corpus and name table.
pub struct Workspace {
    pub dir: TempDir,
    pub role_dir: PathBuf,
    pub reference_path: PathBuf,
    pub names_path: PathBuf,
}

impl Workspace {
    pub fn new(references: usize) -> Self {
        Self::with_names(references, references)
    }

    pub fn with_names(references: usize, names: usize) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let role_dir = dir.path().join("roles-dialog-embedding");
        fs::create_dir(&role_dir).expect("role dir");
        let reference_path =
            EmbeddingFixtureBuilder::references(references).write(&dir.path().join("embeddings.npy"));
        let names_path = write_names(&dir.path().join("figures.json"), names);
        Self {
            dir,
            role_dir,
            reference_path,
            names_path,
        }
    }

    pub fn role_file(&self, name: &str) -> PathBuf {
        self.role_dir.join(name)
    }

    pub fn config(&self) -> Config {
        Config {
            role_dir: self.role_dir.clone(),
            reference_paths: vec![self.reference_path.clone()],
            names_path: self.names_path.clone(),
            output_dir: None,
            diagnostics_dir: None,
            ..Config::default()
        }
    }
}
