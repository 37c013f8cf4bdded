//! The `Simulation` engine: owns all per-run state and builds the
//! interaction registry, cell list, and FEL from a `Config`. The event loop itself lives in `loop_`, split out the same way
//! the vector kernel splits `ops`/`math` from its struct definition.

pub mod loop_;

use crate::boundary::Boundary;
use crate::capture::CaptureMap;
use crate::cells::CellGrid;
use crate::config::{BoundaryConfig, Config, DynamicsKind, InteractionConfig};
use crate::error::{ConfigError, OverlapError};
use crate::fel::{CalendarFel, FutureEventList, HeapFel, SchedulerKind};
use crate::interaction::bonded::Bonded;
use crate::interaction::compressing::Compressing;
use crate::interaction::hard_sphere::HardSphere;
use crate::interaction::square_well::SquareWell;
use crate::interaction::stepped::Stepped;
use crate::interaction::PairKind;
use crate::particle::{Particle, SpeciesId, SpeciesProperties};
use crate::potential::{LennardJones, ShellTable};
use crate::systems::{Compression, Halt, Thermostat};
use log::warn;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::rc::Rc;

/// Reserved PEL owner slot for system-level events (thermostat firings, the
/// halt sentinel) that have no single owning particle.
pub fn system_owner(n_particles: usize) -> usize {
    n_particles
}

pub struct Simulation {
    pub particles: Vec<Particle>,
    pub species: Vec<SpeciesProperties>,
    pub boundary: Boundary,
    pub registry: HashMap<(u16, u16), PairKind>,
    pub cells: CellGrid,
    pub fel: Box<dyn FutureEventList>,
    pub capture: CaptureMap,
    pub thermostat: Option<Thermostat>,
    pub compression: Option<Compression>,
    pub halt: Halt,
    pub rng: StdRng,
    pub time: f64,
    pub events_executed: u64,
    pub capture_desyncs: u64,
    pub dynamics: DynamicsKind,
}

impl Simulation {
    pub fn new(config: &Config, halt: Halt, rng: StdRng) -> Result<Self, ConfigError> {
        let species = config.particles.species.clone();
        let mut particles = Vec::with_capacity(config.particles.positions.len());
        for (i, &position) in config.particles.positions.iter().enumerate() {
            let velocity = config.particles.velocities[i];
            let species_id = SpeciesId(config.particles.species_of[i]);
            particles.push(Particle::new(position, velocity, species_id));
        }

        let boundary = match config.boundary {
            BoundaryConfig::None => Boundary::None,
            BoundaryConfig::Periodic { box_size } => Boundary::Periodic { box_size },
            BoundaryConfig::LeesEdwards { box_size, shear_rate } => {
                Boundary::LeesEdwards { box_size, shear_rate, shear_offset: std::cell::Cell::new(0.0) }
            }
        };

        let registry = build_registry(&config.interactions)?;

        let max_cutoff = registry_max_cutoff(&registry).max(1.0);
        let box_size = boundary.box_size().unwrap_or(Vec3LikeDefault::fallback(&particles));
        let mut cells = CellGrid::new(box_size, max_cutoff, particles.len());
        for (i, particle) in particles.iter().enumerate() {
            cells.insert(i, particle.position);
        }

        let fel: Box<dyn FutureEventList> = match config.scheduler.sorter {
            SchedulerKind::Heap => Box::new(HeapFel::new(particles.len() + 1)),
            SchedulerKind::Calendar => Box::new(CalendarFel::new(particles.len() + 1, max_cutoff)),
        };

        let thermostat = config.systems.iter().find_map(|s| match s {
            crate::config::SystemConfig::AndersenThermostat { rate, temperature } => Some(Thermostat::new(*rate, *temperature)),
            _ => None,
        });
        let compression = config.systems.iter().find_map(|s| match s {
            crate::config::SystemConfig::Compression { growth_rate } => Some(Compression::new(*growth_rate)),
            _ => None,
        });

        let mut simulation = Simulation {
            particles,
            species,
            boundary,
            registry,
            cells,
            fel,
            capture: CaptureMap::new(),
            thermostat,
            compression,
            halt,
            rng,
            time: 0.0,
            events_executed: 0,
            capture_desyncs: 0,
            dynamics: config.dynamics.kind,
        };
        simulation.schedule_initial_events();
        simulation.check_no_overlaps(config.dynamics.overlap_squash)?;
        Ok(simulation)
    }

    /// Rejects (or, with `overlap_squash`, squashes) hard-core overlaps
    /// present at initialisation. An overlap is fatal unless `overlap_squash`
    /// is set, in which case a `Recalculate` event is scheduled for the
    /// offending pair so its capture state is re-established from geometry
    /// once the run starts, rather than failing construction outright.
    fn check_no_overlaps(&mut self, overlap_squash: bool) -> Result<(), ConfigError> {
        let mut overlaps = Vec::new();
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let key = species_key(self.particles[i].species, self.particles[j].species);
                if let Some(kind) = self.registry.get(&key) {
                    let min_separation = kind.min_safe_separation();
                    let (d, _) = self.boundary.delta(self.particles[i].position, self.particles[j].position);
                    if d.norm() < min_separation - 1e-9 {
                        if !overlap_squash {
                            return Err(ConfigError::Malformed(format!(
                                "particles {} and {} overlap at init: separation {} < {}",
                                i,
                                j,
                                d.norm(),
                                min_separation
                            )));
                        }
                        overlaps.push((i, j));
                    }
                }
            }
        }
        for (i, j) in overlaps {
            warn!("squashing init overlap between particles {i} and {j}; scheduling recalculate");
            let owner = i.min(j);
            let event = crate::event::Event::recalculate(self.time, i, j, self.particles[i].token, self.particles[j].token);
            self.fel.push(owner, event);
        }
        Ok(())
    }

    fn schedule_initial_events(&mut self) {
        let n = self.particles.len();
        for i in 0..n {
            self.repredict_particle(i);
        }
        if let Some(thermostat) = self.thermostat {
            let dt = thermostat.next_collision_interval(n, &mut self.rng);
            if dt.is_finite() {
                self.fel.push(system_owner(n), crate::event::Event::single(self.time + dt, crate::event::EventKind::Thermostat, system_owner(n), 0));
            }
        }
        self.fel.push(system_owner(n), crate::event::Event::halt(self.halt_time_estimate()));
    }

    fn halt_time_estimate(&self) -> f64 {
        match self.halt {
            Halt::AtTime(t) => t,
            Halt::AfterEvents(_) => f64::INFINITY,
        }
    }

    pub fn species_properties(&self, id: SpeciesId) -> &SpeciesProperties {
        &self.species[id.0 as usize]
    }
}

impl PairKind {
    /// The hard-core-equivalent radius below which the pair is considered to
    /// have overlapped at initialisation.
    pub fn min_safe_separation(&self) -> f64 {
        match self {
            PairKind::HardSphere(k) => k.diameter,
            PairKind::SquareWell(k) => k.hard_core,
            PairKind::Stepped(k) => k.table.hard_core(),
            PairKind::Bonded(k) => k.hard_core,
            PairKind::Compressing(k) => k.initial_diameter,
        }
    }

    /// The largest separation at which this pair can still generate an
    /// event — what the cell grid's cell size must be at least as large as.
    pub fn interaction_range(&self) -> f64 {
        match self {
            PairKind::HardSphere(k) => k.diameter,
            PairKind::SquareWell(k) => k.well_radius,
            PairKind::Stepped(k) => k.table.cutoff(),
            PairKind::Bonded(k) => k.tether_radius,
            PairKind::Compressing(k) => k.initial_diameter,
        }
    }
}

pub(crate) fn species_key(a: SpeciesId, b: SpeciesId) -> (u16, u16) {
    if a.0 <= b.0 {
        (a.0, b.0)
    } else {
        (b.0, a.0)
    }
}

fn build_registry(interactions: &[InteractionConfig]) -> Result<HashMap<(u16, u16), PairKind>, ConfigError> {
    let mut registry = HashMap::new();
    for interaction in interactions {
        let (key, kind) = match interaction {
            InteractionConfig::HardSphere { a, b, diameter } => ((*a, *b), PairKind::HardSphere(HardSphere::new(*diameter))),
            InteractionConfig::SquareWell { a, b, hard_core, well_radius, well_depth } => {
                ((*a, *b), PairKind::SquareWell(SquareWell::new(*hard_core, *well_radius, *well_depth)))
            }
            InteractionConfig::Bonded { a, b, hard_core, tether_radius } => {
                ((*a, *b), PairKind::Bonded(Bonded::new(*hard_core, *tether_radius)))
            }
            InteractionConfig::Compressing { a, b, initial_diameter, growth_rate } => {
                ((*a, *b), PairKind::Compressing(Compressing::new(*initial_diameter, *growth_rate)))
            }
            InteractionConfig::Stepped { a, b, hard_core, steps } => {
                let shells = steps.iter().map(|s| crate::potential::Shell { r: s.r, energy: s.e }).collect();
                let table = ShellTable::from_steps(shells, *hard_core);
                ((*a, *b), PairKind::Stepped(Stepped::new(Rc::new(table))))
            }
            InteractionConfig::LennardJones { a, b, sigma, epsilon, cut_off, attractive_steps, u_mode, r_mode, hard_core } => {
                let lj = LennardJones::new(*sigma, *epsilon, *cut_off);
                let radial_mode = r_mode.into_radial_mode(*attractive_steps);
                let energy_mode = (*u_mode).into();
                let table = ShellTable::new(lj, radial_mode, energy_mode, *hard_core);
                ((*a, *b), PairKind::Stepped(Stepped::new(Rc::new(table))))
            }
        };
        let (a, b) = key;
        let sorted_key = if a <= b { (a, b) } else { (b, a) };
        registry.insert(sorted_key, kind);
    }
    Ok(registry)
}

fn registry_max_cutoff(registry: &HashMap<(u16, u16), PairKind>) -> f64 {
    registry.values().map(PairKind::interaction_range).fold(1.0_f64, f64::max)
}

use crate::vector::Vec3;

struct Vec3LikeDefault;
impl Vec3LikeDefault {
    /// Falls back to a box enclosing all particles with generous padding
    /// when there is no explicit boundary box (an unbounded `Boundary::None`
    /// system still needs *some* cell-grid extent to bucket particles in).
    fn fallback(particles: &[Particle]) -> Vec3 {
        let mut max = Vec3::new(1.0, 1.0, 1.0);
        for p in particles {
            max.x = max.x.max(p.position.x.abs() * 2.0 + 10.0);
            max.y = max.y.max(p.position.y.abs() * 2.0 + 10.0);
            max.z = max.z.max(p.position.z.abs() * 2.0 + 10.0);
        }
        max
    }
}

/// Possible outcomes of advancing the engine by one executed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Executed,
    Halted,
    Idle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use crate::particle::SpeciesProperties;
    use crate::rng::seeded;
    use crate::systems::Halt;

    fn overlapping_pair_config(overlap_squash: bool) -> Config {
        Config {
            particles: ParticlesConfig {
                species: vec![SpeciesProperties { name: "A".into(), mass: 1.0, diameter: 1.0 }],
                positions: vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)],
                velocities: vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0)],
                species_of: vec![0, 0],
            },
            interactions: vec![InteractionConfig::HardSphere { a: 0, b: 0, diameter: 1.0 }],
            systems: vec![],
            dynamics: DynamicsConfig { kind: DynamicsKind::Newtonian, overlap_squash },
            boundary: BoundaryConfig::None,
            scheduler: SchedulerConfig { sorter: crate::fel::SchedulerKind::Heap },
            ensemble: EnsembleConfig { kind: EnsembleKind::Nve },
        }
    }

    #[test]
    fn overlap_at_init_is_fatal_by_default() {
        let config = overlapping_pair_config(false);
        assert!(Simulation::new(&config, Halt::AfterEvents(1), seeded(1)).is_err());
    }

    #[test]
    fn overlap_squash_schedules_a_recalculate_instead_of_failing() {
        let config = overlapping_pair_config(true);
        let simulation = Simulation::new(&config, Halt::AfterEvents(1), seeded(1)).unwrap();
        assert_eq!(simulation.particles.len(), 2);
    }
}
