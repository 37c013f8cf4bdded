//! Andersen thermostat: Poisson-timed collisions with a
//! virtual heat bath, each resampling one particle's velocity from the
//! Maxwell-Boltzmann distribution at temperature `T`.

use crate::vector::Vec3;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thermostat {
    /// Collision rate per particle; the bath fires at total rate `nu * N`.
    pub nu: f64,
    pub temperature: f64,
}

impl Thermostat {
    pub fn new(nu: f64, temperature: f64) -> Self {
        Thermostat { nu, temperature }
    }

    /// Draws the time until the next bath collision anywhere in the system,
    /// an exponential with rate `nu * n_particles`.
    pub fn next_collision_interval<R: Rng + ?Sized>(&self, n_particles: usize, rng: &mut R) -> f64 {
        let rate = self.nu * n_particles as f64;
        if rate <= 0.0 {
            return f64::INFINITY;
        }
        let u: f64 = rng.random_range(f64::EPSILON..1.0);
        -u.ln() / rate
    }

    /// Uniformly picks which particle the bath collides with.
    pub fn choose_particle<R: Rng + ?Sized>(&self, n_particles: usize, rng: &mut R) -> usize {
        rng.random_range(0..n_particles)
    }

    /// Resamples one particle's velocity components independently from
    /// `N(0, T/mass)`, i.e. Maxwell-Boltzmann at temperature `T` in units
    /// where `k_B = 1`.
    pub fn resample_velocity<R: Rng + ?Sized>(&self, mass: f64, rng: &mut R) -> Vec3 {
        let sigma = (self.temperature / mass).sqrt();
        let normal = Normal::new(0.0, sigma).expect("sigma must be finite and positive");
        Vec3::new(normal.sample(rng), normal.sample(rng), normal.sample(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zero_rate_never_fires() {
        let thermostat = Thermostat::new(0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(thermostat.next_collision_interval(100, &mut rng), f64::INFINITY);
    }

    #[test]
    fn resampled_velocity_is_finite() {
        let thermostat = Thermostat::new(1.0, 2.0);
        let mut rng = StdRng::seed_from_u64(42);
        let v = thermostat.resample_velocity(1.0, &mut rng);
        assert!(v.x.is_finite() && v.y.is_finite() && v.z.is_finite());
    }
}
