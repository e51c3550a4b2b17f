//! sightid - match animal embeddings and check the matches against
//! geography and time.

mod commands;
mod config;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckCommand, RunCommand};

/// Match query embeddings to known individuals and flag matches that would
/// need an impossible journey.
#[derive(Parser)]
#[command(name = "sightid")]
#[command(about = "Sighting re-identification and plausibility checks")]
#[command(version)]
pub struct Cli {
    /// Config file with `mode`, `matcher` and `validator` sections (JSON or YAML)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match, validate, aggregate and explode a dataset
    Run(RunCommand),
    /// Assess a single pair of sightings
    Check(CheckCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info, or debug with -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Run(cmd) => cmd.run(&cli),
        Commands::Check(cmd) => cmd.run(&cli),
    }
}
