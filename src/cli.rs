//! Command-line interface: a single-run `simulate` command and a
//! `batch` command for the parallel ensemble runner.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs a single realisation to completion, writing a trajectory and a
    /// final-state snapshot.
    Simulate {
        /// Path to the TOML configuration describing particles, interactions and systems.
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to write the trajectory and final snapshot into.
        #[arg(short, long, default_value = "./data/simulation/")]
        output: PathBuf,

        /// Run-length cutoff. Parsed as `t=<seconds>` or a bare event count.
        #[arg(short, long, default_value = "1000")]
        run_length: String,

        /// RNG seed.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        /// Capture a trajectory frame every this many executed events.
        #[arg(long, default_value_t = 100)]
        snapshot_interval: u64,
    },

    /// Runs many independent realisations of the same configuration in
    /// parallel, one per seed.
    Batch {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, default_value = "./data/simulation/")]
        output: PathBuf,

        #[arg(short, long, default_value = "1000")]
        run_length: String,

        /// Number of independent realisations to run.
        #[arg(short = 'n', long, default_value_t = 10)]
        runs: u64,

        /// Seed assigned to the first realisation; subsequent runs increment from here.
        #[arg(long, default_value_t = 0)]
        first_seed: u64,
    },
}

/// Parses a run-length string as either `t=<seconds>` (an absolute-time
/// halt) or a bare non-negative integer (an event-count halt).
pub fn parse_run_length(text: &str) -> Result<crate::systems::Halt, String> {
    if let Some(rest) = text.strip_prefix("t=") {
        let t: f64 = rest.parse().map_err(|_| format!("invalid time value: {rest}"))?;
        Ok(crate::systems::Halt::AtTime(t))
    } else {
        let n: u64 = text.parse().map_err(|_| format!("invalid event count: {text}"))?;
        Ok(crate::systems::Halt::AfterEvents(n))
    }
}
