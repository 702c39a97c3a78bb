//! Directory-level orchestration of the two stages.
//!
//! - **rank**: every `*.npy` role file in the role directory is ranked against
//!   the reference corpus and saved as `<stem>_top3_results.npz`.
//! - **map**: every `*_top3_results.npz` is resolved through the name table
//!   and saved as `<stem>_top3_image_results.json`.
//!
//! References and names are loaded at most once per run, and only when some
//! file still needs processing. Files are processed in file-name order. A failing file is recorded in the [`RunReport`] and the
//! run continues; only a missing input directory or an unloadable corpus
//! aborts the stage. Existing outputs are skipped unless
//! [`Config::overwrite`] is set, which makes an interrupted run resumable.

pub mod error;
pub mod report;


pub use error::PipelineError;
pub use report::{FileFailure, RunReport};

use std::fs;
use std::path::{Path, PathBuf};

use candle_core::Device;
use tracing::{info, warn};

use crate::config::Config;
use crate::constants::{
    DISTRIBUTION_SUFFIX, EMBEDDING_EXTENSION, MAPPED_SUFFIX, REFERENCE_SLOTS, RESULTS_SUFFIX,
};
use crate::embedding::EmbeddingTensor;
use crate::embedding::device::select_device;
use crate::mapping::{NameTable, ResultMapper};
use crate::ranking::{PreparedReferences, RankerConfig, RankingError, SimilarityRanker};
use crate::storage::{read_top_k, write_json_atomic, write_top_k};

/// Runs the rank and map stages over directories of files.
#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    ranker: SimilarityRanker,
}

impl Pipeline {
    pub fn new(config: Config, device: Device) -> Result<Self, PipelineError> {
        let ranker_config = RankerConfig {
            weights: config.weights,
            batch_size: config.batch_size,
            collect_distribution: config.diagnostics_dir.is_some(),
            ..RankerConfig::default()
        };
        let ranker = SimilarityRanker::new(ranker_config, device)?;
        Ok(Self { config, ranker })
    }

    /// Builds a pipeline on the best available device.
    pub fn from_config(config: Config) -> Result<Self, PipelineError> {
        let device = select_device()?;
        Self::new(config, device)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ranker(&self) -> &SimilarityRanker {
        &self.ranker
    }

    /// Directory the rank stage writes to and the map stage reads from.
    pub fn results_dir(&self) -> &Path {
        self.config.results_dir()
    }

    fn output_for(&self, input: &Path, file_name: String) -> PathBuf {
        match &self.config.output_dir {
            Some(dir) => dir.join(file_name),
            None => input.with_file_name(file_name),
        }
    }

    /// `roles/foo.npy` -> `<out>/foo_top3_results.npz`
    pub fn results_path(&self, role_file: &Path) -> Result<PathBuf, PipelineError> {
        let stem = file_stem(role_file)?;
        Ok(self.output_for(role_file, format!("{stem}{RESULTS_SUFFIX}")))
    }

    /// `<out>/foo_top3_results.npz` -> `<out>/foo_top3_image_results.json`
    pub fn mapped_path(&self, results_file: &Path) -> Result<PathBuf, PipelineError> {
        let name = results_file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PipelineError::InvalidFileName {
                path: results_file.to_path_buf(),
            })?;
        let stem = name.strip_suffix(RESULTS_SUFFIX).unwrap_or(name);
        Ok(self.output_for(results_file, format!("{stem}{MAPPED_SUFFIX}")))
    }

    /// `<diagnostics>/foo_similarity_distribution.json`, if diagnostics are on.
    pub fn distribution_path(&self, role_file: &Path) -> Option<PathBuf> {
        let dir = self.config.diagnostics_dir.as_ref()?;
        let stem = file_stem(role_file).ok()?;
        Some(dir.join(format!("{stem}{DISTRIBUTION_SUFFIX}")))
    }

    /// Loads and prepares the reference corpus.
    pub fn load_references(&self) -> Result<PreparedReferences, PipelineError> {
        let references = EmbeddingTensor::read_npy_many(&self.config.reference_paths)?;
        references.expect_slots(REFERENCE_SLOTS)?;
        let prepared = self.ranker.prepare_references(&references)?;
        info!(
            references = prepared.count(),
            dim = prepared.dim(),
            degenerate = prepared.degenerate(),
            "Reference corpus ready"
        );
        Ok(prepared)
    }

    /// Ranks every role file in the role directory.
    pub fn rank_directory(&self) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::new("rank");
        let role_files = list_files(&self.config.role_dir, |name| {
            Path::new(name)
                .extension()
                .is_some_and(|ext| ext == EMBEDDING_EXTENSION)
        })?;

        if role_files.is_empty() {
            warn!(dir = %self.config.role_dir.display(), "No .npy role files found");
            return Ok(report);
        }
        info!(
            dir = %self.config.role_dir.display(),
            files = role_files.len(),
            "Found role files"
        );

        // Loaded on the first file that needs ranking.
        let mut references: Option<PreparedReferences> = None;

        for role_file in role_files {
            let output = match self.results_path(&role_file) {
                Ok(output) => output,
                Err(e) => {
                    report.record_failure(role_file, &e);
                    continue;
                }
            };
            if output.exists() && !self.config.overwrite {
                info!(path = %role_file.display(), "Results exist, skipping");
                report.skipped.push(role_file);
                continue;
            }

            info!(input = %role_file.display(), output = %output.display(), "Processing role file");
            let prepared = match references.take() {
                Some(prepared) => references.insert(prepared),
                None => references.insert(self.load_references()?),
            };
            match self.rank_file(&role_file, &output, prepared) {
                Ok(()) => report.processed.push(output),
                Err(e) => report.record_failure(role_file, &e),
            }
        }

        Ok(report)
    }

    /// Ranks one role file and writes its results archive to `output`.
    pub fn rank_file(
        &self,
        role_file: &Path,
        output: &Path,
        references: &PreparedReferences,
    ) -> Result<(), PipelineError> {
        let roles = EmbeddingTensor::read_npy(role_file)?;
        if roles.dim() != references.dim() {
            return Err(RankingError::DimensionMismatch {
                role_dim: roles.dim(),
                reference_dim: references.dim(),
            }
            .into());
        }

        let prepared = self.ranker.prepare_roles(&roles)?;
        let label = file_stem(role_file)?;
        let run = self.ranker.rank_prepared(&prepared, references, &label)?;

        if let (Some(distribution), Some(path)) =
            (&run.distribution, self.distribution_path(role_file))
        {
            match write_json_atomic(&path, distribution) {
                Ok(()) => info!(path = %path.display(), "Saved similarity distribution"),
                Err(e) => warn!(path = %path.display(), error = %e, "Could not save similarity distribution"),
            }
        }

        write_top_k(output, &run.results)?;
        info!(
            path = %output.display(),
            roles = run.results.len(),
            "Saved top-k results"
        );
        for (i, row) in run.results.rows().take(3).enumerate() {
            let hits: Vec<String> = row.iter().map(ToString::to_string).collect();
            info!(role = i, hits = %hits.join(", "), "Sample result");
        }
        Ok(())
    }

    /// Maps every results archive in [`Self::results_dir`] to names.
    pub fn map_directory(&self) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::new("map");
        let dir = self.results_dir();
        let archives = list_files(dir, |name| name.ends_with(RESULTS_SUFFIX))?;

        if archives.is_empty() {
            warn!(dir = %dir.display(), "No *{RESULTS_SUFFIX} files found");
            return Ok(report);
        }
        info!(dir = %dir.display(), files = archives.len(), "Found result archives");

        let mut names: Option<NameTable> = None;

        for archive in archives {
            let output = match self.mapped_path(&archive) {
                Ok(output) => output,
                Err(e) => {
                    report.record_failure(archive, &e);
                    continue;
                }
            };
            if output.exists() && !self.config.overwrite {
                info!(path = %archive.display(), "Mapped output exists, skipping");
                report.skipped.push(archive);
                continue;
            }

            info!(input = %archive.display(), output = %output.display(), "Mapping results");
            let table = match names.take() {
                Some(table) => names.insert(table),
                None => names.insert(NameTable::load(&self.config.names_path)?),
            };
            match self.map_file(&archive, &output, table) {
                Ok(()) => report.processed.push(output),
                Err(e) => report.record_failure(archive, &e),
            }
        }

        Ok(report)
    }

    /// Maps one results archive and writes the JSON records to `output`.
    pub fn map_file(
        &self,
        archive: &Path,
        output: &Path,
        names: &NameTable,
    ) -> Result<(), PipelineError> {
        let results = read_top_k(archive)?;
        ResultMapper::new(names).map_to_file(&results, output)?;
        Ok(())
    }

    /// Rank stage followed by map stage.
    pub fn run(&self) -> Result<(RunReport, RunReport), PipelineError> {
        let ranked = self.rank_directory()?;
        ranked.log_summary();
        let mapped = self.map_directory()?;
        mapped.log_summary();
        Ok((ranked, mapped))
    }
}

fn file_stem(path: &Path) -> Result<String, PipelineError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| PipelineError::InvalidFileName {
            path: path.to_path_buf(),
        })
}

/// Regular files in `dir` whose name satisfies `keep`, sorted by name.
fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, PipelineError> {
    if !dir.exists() {
        return Err(PipelineError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(PipelineError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(&keep);
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
