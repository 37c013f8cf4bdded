//! Runs many independent realisations of the same configuration, each seeded
//! differently, in parallel via `rayon`.
//!
//! The unit of parallel work is a whole independent run rather than one
//! particle update within a single run, since an event loop is inherently
//! sequential: there is no shared mutable state between runs, so each one
//! can execute start-to-finish on its own thread.

use crate::config::Config;
use crate::engine::{Simulation, StepOutcome};
use crate::error::EdmdError;
use crate::io::Snapshot;
use crate::rng::seeded;
use crate::systems::Halt;
use rayon::prelude::*;

/// One realisation's outcome: enough to reconstruct statistics across the
/// ensemble without keeping every intermediate event in memory.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub seed: u64,
    pub events_executed: u64,
    pub capture_desyncs: u64,
    pub final_snapshot: Snapshot,
}

/// Runs `n_runs` independent realisations of `config`, one per seed in
/// `first_seed..first_seed + n_runs`, to completion (`halt`), in parallel.
///
/// A single run failing to construct (bad config, initial overlap) aborts
/// the whole batch rather than silently dropping that realisation: every
/// run shares the same `config`, so a construction failure for one seed
/// means every other seed would fail identically.
pub fn run_ensemble(config: &Config, halt: Halt, n_runs: u64, first_seed: u64) -> Result<Vec<RunResult>, EdmdError> {
    (first_seed..first_seed + n_runs)
        .into_par_iter()
        .map(|seed| run_one(config, halt, seed))
        .collect()
}

fn run_one(config: &Config, halt: Halt, seed: u64) -> Result<RunResult, EdmdError> {
    let mut simulation = Simulation::new(config, halt, seeded(seed))?;
    loop {
        match simulation.step() {
            StepOutcome::Executed => {}
            StepOutcome::Halted | StepOutcome::Idle => break,
        }
    }
    Ok(RunResult {
        seed,
        events_executed: simulation.events_executed,
        capture_desyncs: simulation.capture_desyncs,
        final_snapshot: Snapshot::capture(&simulation),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use crate::particle::SpeciesProperties;
    use crate::vector::Vec3;

    fn config() -> Config {
        Config {
            particles: ParticlesConfig {
                species: vec![SpeciesProperties { name: "A".into(), mass: 1.0, diameter: 1.0 }],
                positions: vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
                velocities: vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)],
                species_of: vec![0, 0],
            },
            interactions: vec![InteractionConfig::HardSphere { a: 0, b: 0, diameter: 1.0 }],
            systems: vec![],
            dynamics: DynamicsConfig { kind: DynamicsKind::Newtonian, overlap_squash: false },
            boundary: BoundaryConfig::None,
            scheduler: SchedulerConfig { sorter: crate::fel::SchedulerKind::Heap },
            ensemble: EnsembleConfig { kind: EnsembleKind::Nve },
        }
    }

    #[test]
    fn runs_one_realisation_per_seed() {
        let cfg = config();
        let results = run_ensemble(&cfg, Halt::AfterEvents(2), 4, 100).unwrap();
        assert_eq!(results.len(), 4);
        let mut seeds: Vec<u64> = results.iter().map(|r| r.seed).collect();
        seeds.sort();
        assert_eq!(seeds, vec![100, 101, 102, 103]);
    }

    #[test]
    fn every_run_executes_up_to_the_requested_events() {
        let cfg = config();
        let results = run_ensemble(&cfg, Halt::AfterEvents(2), 2, 0).unwrap();
        for result in &results {
            assert!(result.events_executed <= 2);
        }
    }
}
