//! Memerank command-line entrypoint.
//!
//! ```text
//! memerank [rank|map|run]
//! ```
//!
//! Settings come from `MEMERANK_*` environment variables; log verbosity from
//! `RUST_LOG`.

use anyhow::bail;
use mimalloc::MiMalloc;

use memerank::config::Config;
use memerank::pipeline::{Pipeline, RunReport};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Rank,
    Map,
    Run,
}

impl Stage {
    fn parse(arg: Option<&str>) -> anyhow::Result<Self> {
        match arg {
            None | Some("run") => Ok(Self::Run),
            Some("rank") => Ok(Self::Rank),
            Some("map") => Ok(Self::Map),
            Some(other) => bail!("unknown command {other:?}, expected one of: rank, map, run"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let arg = std::env::args().nth(1);
    let stage = Stage::parse(arg.as_deref())?;

    let config = Config::from_env()?;
    match stage {
        Stage::Rank => config.validate_rank()?,
        Stage::Map => config.validate_map()?,
        Stage::Run => config.validate()?,
    }

    tracing::info!(
        ?stage,
        role_dir = %config.role_dir.display(),
        references = config.reference_paths.len(),
        names = %config.names_path.display(),
        weights = %config.weights,
        batch_size = config.batch_size,
        overwrite = config.overwrite,
        "Memerank starting"
    );

    let pipeline = Pipeline::from_config(config)?;

    let reports: Vec<RunReport> = match stage {
        Stage::Rank => {
            let report = pipeline.rank_directory()?;
            report.log_summary();
            vec![report]
        }
        Stage::Map => {
            let report = pipeline.map_directory()?;
            report.log_summary();
            vec![report]
        }
        Stage::Run => {
            let (ranked, mapped) = pipeline.run()?;
            vec![ranked, mapped]
        }
    };

    let failed: usize = reports.iter().map(|r| r.failures.len()).sum();
    for report in &reports {
        tracing::info!(summary = %report, "Stage complete");
    }
    if failed > 0 {
        bail!("{failed} file(s) failed, see log for details");
    }

    Ok(())
}
