//! Particle state and the freshness-token invalidation scheme.

use crate::vector::Vec3;
use serde::{Deserialize, Serialize};

/// Index into a simulation's species table. Kept separate from `Particle` so
/// the per-particle record stays `Copy` and cache-dense, the same design the
/// teacher crate uses for its own particle struct (position/velocity only,
/// no owned strings or heap data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeciesId(pub u16);

/// Immutable per-species properties, owned by the simulation context rather
/// than duplicated on every particle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesProperties {
    pub name: String,
    pub mass: f64,
    /// Hard-core diameter used when no explicit interaction table overrides it.
    pub diameter: f64,
}

/// A single particle: identity is its index into the simulation's particle
/// array, so it is not stored on the struct itself.
///
/// Invariant: `r(t) = position + velocity * (t - last_update)`
/// for all `t` in `[last_update, next_event_for_this_particle]` — i.e.
/// between events the particle moves ballistically in its own local frame.
/// `stream_to` is the only sanctioned way to advance `position`/`last_update`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Simulation time at which `position` was last synchronised.
    pub last_update: f64,
    pub species: SpeciesId,
    /// Monotonic counter bumped every time this particle's kinematic state
    /// changes. An event is fresh iff both its `token_a`/`token_b` equal the
    /// current tokens of the particles it names (see `event::Event`).
    pub token: u64,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3, species: SpeciesId) -> Self {
        Particle { position, velocity, last_update: 0.0, species, token: 0 }
    }

    /// Position at absolute time `t`, under free ballistic motion since
    /// `last_update`. Does not mutate `self` — callers needing the
    /// synchronised position persisted should use `stream_to`.
    #[inline]
    pub fn position_at(&self, t: f64) -> Vec3 {
        self.position + self.velocity * (t - self.last_update)
    }

    /// Advances `position`/`last_update` to `t` under free motion, without
    /// bumping the freshness token: streaming is not a kinematic change, it
    /// is just catching the stored position up to the clock. Velocity is
    /// untouched.
    pub fn stream_to(&mut self, t: f64) {
        self.position = self.position_at(t);
        self.last_update = t;
    }

    /// Applies an instantaneous velocity change (an impulse, a thermostat
    /// kick, or a capture-shell jump) and bumps the freshness token so any
    /// scheduled event naming this particle becomes stale.
    pub fn kick(&mut self, new_velocity: Vec3) {
        self.velocity = new_velocity;
        self.token = self.token.wrapping_add(1);
    }
}
