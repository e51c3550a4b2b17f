//! Batch run over a dataset file.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use sightid_sighting::{Dataset, Mode, Pipeline};
use tracing::{info, warn};

use crate::config::{load_config, load_file};
use crate::output::write_json;
use crate::Cli;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Queries against the known set
    Known,
    /// Known and queries pooled, nearest non-self neighbor
    All,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Known => Mode::Known,
            ModeArg::All => Mode::All,
        }
    }
}

/// Match, validate, aggregate and explode a dataset.
#[derive(Args)]
pub struct RunCommand {
    /// Dataset with `known`, `queries` and `occurrences` (JSON or YAML)
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Retrieval mode (overrides config file)
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Candidates per query in known mode (overrides config file)
    #[arg(short = 'k', long)]
    k: Option<usize>,
}

impl RunCommand {
    pub fn run(&self, cli: &Cli) -> Result<()> {
        let mut cfg = load_config(cli.config.as_deref())?;
        if let Some(mode) = self.mode {
            cfg.mode = mode.into();
        }
        if let Some(k) = self.k {
            cfg.matcher.k = k;
        }

        let data: Dataset = load_file(&self.input)?;
        let pipeline = Pipeline::new(cfg)?;
        let report = pipeline.run(&data);

        for f in &report.failures {
            warn!("model {} failed: {}", f.model, f.error);
        }
        info!(
            "{} candidates, {} individuals, {} occurrence rows",
            report.candidates.len(),
            report.individuals.len(),
            report.occurrences.len()
        );

        write_json(&report, cli.output.as_deref())
    }
}
