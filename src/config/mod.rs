//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `MEMERANK_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_WEIGHTS};
use crate::ranking::ScoreWeights;

/// Run configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `MEMERANK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned for role `.npy` files. Default: `roles-dialog-embedding`.
    pub role_dir: PathBuf,

    /// Reference `.npy` files, concatenated along the entity axis in order.
    pub reference_paths: Vec<PathBuf>,

    /// JSON array of display names, indexed by reference position.
    pub names_path: PathBuf,

    /// Output directory. `None` writes results next to their input file.
    pub output_dir: Option<PathBuf>,

    /// Where the first-batch score distribution goes. `None` disables it.
    pub diagnostics_dir: Option<PathBuf>,

    /// Weights for the four cosine terms. Default: `0.3,-0.2,0.2,0.7`.
    pub weights: ScoreWeights,

    /// Roles per scoring batch. Default: `100`.
    pub batch_size: usize,

    /// Recompute outputs that already exist. Default: `false`.
    pub overwrite: bool,
}

/// Default role directory used when `MEMERANK_ROLE_DIR` is not set.
pub const DEFAULT_ROLE_DIR: &str = "roles-dialog-embedding";
/// Default reference embeddings used when `MEMERANK_REFERENCE_PATHS` is not set.
pub const DEFAULT_REFERENCE_PATH: &str = "Meme_Warehouse/embeddings.npy";
/// Default name table used when `MEMERANK_NAMES_PATH` is not set.
pub const DEFAULT_NAMES_PATH: &str = "Meme_Warehouse/figures.json";
/// Default diagnostics directory used when `MEMERANK_DIAGNOSTICS_DIR` is not set.
pub const DEFAULT_DIAGNOSTICS_DIR: &str = "./plots";

impl Default for Config {
    fn default() -> Self {
        Self {
            role_dir: PathBuf::from(DEFAULT_ROLE_DIR),
            reference_paths: vec![PathBuf::from(DEFAULT_REFERENCE_PATH)],
            names_path: PathBuf::from(DEFAULT_NAMES_PATH),
            output_dir: None,
            diagnostics_dir: Some(PathBuf::from(DEFAULT_DIAGNOSTICS_DIR)),
            weights: ScoreWeights::from(DEFAULT_WEIGHTS),
            batch_size: DEFAULT_BATCH_SIZE,
            overwrite: false,
        }
    }
}

impl Config {
    const ENV_ROLE_DIR: &'static str = "MEMERANK_ROLE_DIR";
    const ENV_REFERENCE_PATHS: &'static str = "MEMERANK_REFERENCE_PATHS";
    const ENV_NAMES_PATH: &'static str = "MEMERANK_NAMES_PATH";
    const ENV_OUTPUT_DIR: &'static str = "MEMERANK_OUTPUT_DIR";
    const ENV_DIAGNOSTICS_DIR: &'static str = "MEMERANK_DIAGNOSTICS_DIR";
    const ENV_WEIGHTS: &'static str = "MEMERANK_WEIGHTS";
    const ENV_BATCH_SIZE: &'static str = "MEMERANK_BATCH_SIZE";
    const ENV_OVERWRITE: &'static str = "MEMERANK_OVERWRITE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let role_dir = Self::parse_path_from_env(Self::ENV_ROLE_DIR, defaults.role_dir);
        let reference_paths =
            Self::parse_path_list_from_env(Self::ENV_REFERENCE_PATHS, defaults.reference_paths);
        let names_path = Self::parse_path_from_env(Self::ENV_NAMES_PATH, defaults.names_path);
        let output_dir = Self::parse_optional_path_from_env(Self::ENV_OUTPUT_DIR);
        let diagnostics_dir = match env::var(Self::ENV_DIAGNOSTICS_DIR) {
            Ok(_) => Self::parse_optional_path_from_env(Self::ENV_DIAGNOSTICS_DIR),
            Err(_) => defaults.diagnostics_dir,
        };
        let weights = Self::parse_weights_from_env(defaults.weights)?;
        let batch_size = Self::parse_batch_size_from_env(defaults.batch_size)?;
        let overwrite = Self::parse_bool_from_env(Self::ENV_OVERWRITE, defaults.overwrite);

        Ok(Self {
            role_dir,
            reference_paths,
            names_path,
            output_dir,
            diagnostics_dir,
            weights,
            batch_size,
            overwrite,
        })
    }

    /// Validates a full rank-then-map run (does not create directories).
    ///
    /// The results directory may not exist yet; the rank stage creates it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_rank()?;
        Self::require_file(&self.names_path)
    }

    /// Checks the inputs of the rank stage: batch size, role directory and
    /// reference files. The name table is not required.
    pub fn validate_rank(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize {
                value: self.batch_size.to_string(),
            });
        }

        if self.reference_paths.is_empty() {
            return Err(ConfigError::NoReferencePaths);
        }
        for path in &self.reference_paths {
            Self::require_file(path)?;
        }

        Self::require_dir(&self.role_dir)?;
        self.check_output_dirs()
    }

    /// Checks the inputs of the map stage: name table and results directory.
    /// Reference embeddings are not required.
    pub fn validate_map(&self) -> Result<(), ConfigError> {
        Self::require_file(&self.names_path)?;
        Self::require_dir(self.results_dir())?;
        self.check_output_dirs()
    }

    /// Directory the rank stage writes archives to and the map stage reads
    /// them from.
    pub fn results_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.role_dir)
    }

    fn check_output_dirs(&self) -> Result<(), ConfigError> {
        for dir in [&self.output_dir, &self.diagnostics_dir].into_iter().flatten() {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::NotADirectory { path: dir.clone() });
            }
        }
        Ok(())
    }

    fn require_dir(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn require_file(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_weights_from_env(default: ScoreWeights) -> Result<ScoreWeights, ConfigError> {
        match env::var(Self::ENV_WEIGHTS) {
            Ok(value) => Self::parse_weights(&value),
            Err(_) => Ok(default),
        }
    }

    /// Parses `"w1,w2,w3,w4"` into [`ScoreWeights`].
    pub fn parse_weights(value: &str) -> Result<ScoreWeights, ConfigError> {
        let entries: Vec<&str> = value.split(',').map(str::trim).collect();
        if entries.len() != 4 {
            return Err(ConfigError::WrongWeightCount {
                value: value.to_string(),
                count: entries.len(),
            });
        }

        let mut parsed = [0.0f32; 4];
        for (slot, entry) in parsed.iter_mut().zip(&entries) {
            let weight: f32 = entry.parse().map_err(|e| ConfigError::WeightParseError {
                value: value.to_string(),
                entry: entry.to_string(),
                source: e,
            })?;
            if !weight.is_finite() {
                return Err(ConfigError::NonFiniteWeight {
                    entry: entry.to_string(),
                });
            }
            *slot = weight;
        }

        Ok(ScoreWeights::from(parsed))
    }

    fn parse_batch_size_from_env(default: usize) -> Result<usize, ConfigError> {
        match env::var(Self::ENV_BATCH_SIZE) {
            Ok(value) => {
                let batch_size: usize =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::BatchSizeParseError {
                            value: value.clone(),
                            source: e,
                        })?;

                if batch_size == 0 {
                    return Err(ConfigError::InvalidBatchSize { value });
                }

                Ok(batch_size)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_path_list_from_env(var_name: &str, default: Vec<PathBuf>) -> Vec<PathBuf> {
        match env::var(var_name) {
            Ok(value) => value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .collect(),
            Err(_) => default,
        }
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .map(|s| {
                let s = s.trim().to_lowercase();
                s == "true" || s == "1" || s == "yes"
            })
            .unwrap_or(default)
    }
}
