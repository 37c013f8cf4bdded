//! A point-in-time snapshot of a running simulation, serialisable to the
//! same `Config` schema the run was loaded from, so a run can be resumed or
//! inspected offline.

use crate::config::{Config, ParticlesConfig};
use crate::engine::Simulation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: f64,
    pub events_executed: u64,
    pub particles: ParticlesConfig,
}

impl Snapshot {
    /// Captures the current particle state of a running simulation. Does
    /// not capture interactions/systems/boundary — those are unchanged from
    /// the `Config` the run started with, so only particle state need be
    /// round-tripped for a mid-run snapshot.
    pub fn capture(simulation: &Simulation) -> Self {
        let positions = simulation.particles.iter().map(|p| p.position_at(simulation.time)).collect();
        let velocities = simulation.particles.iter().map(|p| p.velocity).collect();
        let species_of = simulation.particles.iter().map(|p| p.species.0).collect();
        Snapshot {
            time: simulation.time,
            events_executed: simulation.events_executed,
            particles: ParticlesConfig { species: simulation.species.clone(), positions, velocities, species_of },
        }
    }

    /// Produces a full end-of-run `Config` by grafting this snapshot's
    /// particle state onto the rest of `base` (interactions, systems,
    /// boundary, scheduler, ensemble all carry over unchanged).
    pub fn into_config(self, base: &Config) -> Config {
        Config { particles: self.particles, ..base.clone() }
    }
}
