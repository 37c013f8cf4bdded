//! The Lennard-Jones continuous potential, the only continuous `U(r)` this
//! crate discretises.

use serde::{Deserialize, Serialize};

/// `U(r) = 4*epsilon * ((sigma/r)^12 - (sigma/r)^6)`, truncated at `cutoff`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LennardJones {
    pub sigma: f64,
    pub epsilon: f64,
    pub cutoff: f64,
}

impl LennardJones {
    pub fn new(sigma: f64, epsilon: f64, cutoff: f64) -> Self {
        LennardJones { sigma, epsilon, cutoff }
    }

    /// Potential energy at separation `r`.
    #[inline]
    pub fn u(&self, r: f64) -> f64 {
        let sr6 = (self.sigma / r).powi(6);
        4.0 * self.epsilon * (sr6 * sr6 - sr6)
    }

    /// `r` at which `U` is minimised: `2^(1/6) * sigma`.
    #[inline]
    pub fn minimum_r(&self) -> f64 {
        2f64.powf(1.0 / 6.0) * self.sigma
    }

    pub fn minimum_u(&self) -> f64 {
        -self.epsilon
    }

    /// Closed-form antiderivative of `U(r) * r^2`, used by the `Volume`
    /// energy-assignment mode to analytically average `U`
    /// over a spherical shell instead of sampling it.
    ///
    /// `d/dr [ -4*eps*sigma^12/(9 r^9) + 4*eps*sigma^6/(3 r^3) ] = U(r) * r^2`
    fn r2_antiderivative(&self, r: f64) -> f64 {
        let s12 = self.sigma.powi(12);
        let s6 = self.sigma.powi(6);
        -4.0 * self.epsilon * s12 / (9.0 * r.powi(9)) + 4.0 * self.epsilon * s6 / (3.0 * r.powi(3))
    }

    /// Volume-weighted average of `U` over the spherical shell `[r_inner, r_outer]`.
    pub fn volume_average(&self, r_inner: f64, r_outer: f64) -> f64 {
        debug_assert!(r_outer > r_inner);
        let integral = self.r2_antiderivative(r_outer) - self.r2_antiderivative(r_inner);
        3.0 * integral / (r_outer.powi(3) - r_inner.powi(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_is_where_derivative_vanishes() {
        let lj = LennardJones::new(1.0, 1.0, 3.0);
        let r_min = lj.minimum_r();
        let h = 1e-6;
        let slope = (lj.u(r_min + h) - lj.u(r_min - h)) / (2.0 * h);
        assert!(slope.abs() < 1e-4);
        assert!((lj.u(r_min) - lj.minimum_u()).abs() < 1e-9);
    }

    #[test]
    fn volume_average_matches_numeric_integration() {
        let lj = LennardJones::new(1.0, 1.0, 3.0);
        let (r_inner, r_outer) = (1.2, 1.5);
        let analytic = lj.volume_average(r_inner, r_outer);

        let n = 200_000;
        let dr = (r_outer - r_inner) / n as f64;
        let mut numerator = 0.0;
        for i in 0..n {
            let r = r_inner + (i as f64 + 0.5) * dr;
            numerator += lj.u(r) * r * r * dr;
        }
        let numeric = 3.0 * numerator / (r_outer.powi(3) - r_inner.powi(3));

        assert!((analytic - numeric).abs() / numeric.abs() < 1e-4);
    }
}
