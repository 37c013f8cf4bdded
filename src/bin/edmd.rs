//! Binary entry point: parses the CLI, runs the requested command, and maps
//! any error to a process exit code.

use clap::Parser;
use edmd::batch::run_ensemble;
use edmd::cli::{parse_run_length, Cli, Commands};
use edmd::config::Config;
use edmd::engine::{Simulation, StepOutcome};
use edmd::error::EdmdError;
use edmd::io::trajectory::{trajectory_path, TrajectoryWriter};
use edmd::io::{save_binary, Snapshot};
use edmd::rng::seeded;
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), EdmdError> {
    match cli.command {
        Commands::Simulate { input, output, run_length, seed, snapshot_interval } => {
            simulate(&input, &output, &run_length, seed, snapshot_interval)
        }
        Commands::Batch { input, output, run_length, runs, first_seed } => batch(&input, &output, &run_length, runs, first_seed),
    }
}

fn simulate(
    input: &std::path::Path,
    output: &std::path::Path,
    run_length: &str,
    seed: u64,
    snapshot_interval: u64,
) -> Result<(), EdmdError> {
    let text = std::fs::read_to_string(input)?;
    let config = Config::from_toml_str(&text).map_err(EdmdError::Config)?;
    let halt = parse_run_length(run_length).map_err(|e| EdmdError::Config(edmd::error::ConfigError::Malformed(e)))?;

    let mut simulation = Simulation::new(&config, halt, seeded(seed)).map_err(EdmdError::Config)?;
    let mut writer = TrajectoryWriter::new(snapshot_interval);

    loop {
        match simulation.step() {
            StepOutcome::Executed => writer.on_event(&simulation),
            StepOutcome::Halted | StepOutcome::Idle => break,
        }
    }

    info!("run finished after {} events ({} capture desyncs)", simulation.events_executed, simulation.capture_desyncs);

    std::fs::create_dir_all(output)?;
    writer.save(&trajectory_path(output, "run", seed as usize))?;
    let final_snapshot = Snapshot::capture(&simulation);
    save_binary(&final_snapshot, &output.join(format!("run-{seed}-final.bin")))?;
    Ok(())
}

fn batch(input: &std::path::Path, output: &std::path::Path, run_length: &str, runs: u64, first_seed: u64) -> Result<(), EdmdError> {
    let text = std::fs::read_to_string(input)?;
    let config = Config::from_toml_str(&text).map_err(EdmdError::Config)?;
    let halt = parse_run_length(run_length).map_err(|e| EdmdError::Config(edmd::error::ConfigError::Malformed(e)))?;

    let results = run_ensemble(&config, halt, runs, first_seed)?;
    info!("batch of {} runs complete", results.len());

    std::fs::create_dir_all(output)?;
    for result in &results {
        let path = output.join(format!("run-{}-final.bin", result.seed));
        save_binary(&result.final_snapshot, &path)?;
    }
    Ok(())
}
