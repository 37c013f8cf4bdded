//! Accumulates periodic snapshots over a run, built incrementally and
//! finalised and persisted once at the end rather than streamed through an
//! MPSC channel, since a single run has no multi-simulation receiver-thread
//! fan-in to feed.

use crate::engine::Simulation;
use crate::error::EdmdError;
use crate::io::{save_binary, Snapshot};
use std::path::{Path, PathBuf};

/// Collects `Snapshot`s taken every `interval_events` executed events, then
/// persists the whole trajectory as a single bincode file on `finalize`.
#[derive(Debug)]
pub struct TrajectoryWriter {
    interval_events: u64,
    last_captured_at: u64,
    frames: Vec<Snapshot>,
}

impl TrajectoryWriter {
    pub fn new(interval_events: u64) -> Self {
        TrajectoryWriter { interval_events: interval_events.max(1), last_captured_at: 0, frames: Vec::new() }
    }

    /// Called after each executed event; captures a frame only once
    /// `interval_events` have elapsed since the last capture.
    pub fn on_event(&mut self, simulation: &Simulation) {
        if simulation.events_executed - self.last_captured_at >= self.interval_events {
            self.frames.push(Snapshot::capture(simulation));
            self.last_captured_at = simulation.events_executed;
        }
    }

    pub fn frames(&self) -> &[Snapshot] {
        &self.frames
    }

    pub fn finalize(self) -> Vec<Snapshot> {
        self.frames
    }

    /// Persists the accumulated trajectory to `path` as a single bincode file.
    pub fn save(&self, path: &Path) -> Result<(), EdmdError> {
        save_binary(&self.frames, path)
    }
}

/// Builds the conventional per-run trajectory file path, mirroring the
/// teacher's `{tag}-{id}.bin` naming convention under a run-specific directory.
pub fn trajectory_path(output_dir: &Path, tag: &str, run_id: usize) -> PathBuf {
    output_dir.join(format!("{tag}-{run_id}.bin"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use crate::particle::SpeciesProperties;
    use crate::rng::seeded;
    use crate::systems::Halt;
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
    fn captures_a_frame_every_interval() {
        let cfg = config();
        let mut simulation = Simulation::new(&cfg, Halt::AfterEvents(4), seeded(1)).unwrap();
        let mut writer = TrajectoryWriter::new(2);
        loop {
            match simulation.step() {
                crate::engine::StepOutcome::Executed => writer.on_event(&simulation),
                _ => break,
            }
        }
        assert_eq!(writer.frames().len(), 2);
    }

    #[test]
    fn save_round_trips_through_a_temp_file() {
        let cfg = config();
        let mut simulation = Simulation::new(&cfg, Halt::AfterEvents(1), seeded(1)).unwrap();
        let mut writer = TrajectoryWriter::new(1);
        simulation.step();
        writer.on_event(&simulation);

        let dir = tempfile::tempdir().unwrap();
        let path = trajectory_path(dir.path(), "test", 0);
        writer.save(&path).unwrap();

        let reloaded: Vec<Snapshot> = crate::io::load_binary(&path).unwrap();
        assert_eq!(reloaded.len(), writer.frames().len());
    }
}
