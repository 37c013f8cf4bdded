//! Compressing hard spheres: the hard-core diameter grows linearly in time
//! at rate `gamma_c`. The contact condition becomes
//! `|Δr + v·t|² = (σ₀ + γc·(t₀+t))²`; solved by Newton iteration rather than
//! the closed-form quadratic root, since the right-hand side is also
//! time-dependent.

use super::{apply_impulse, resolve_normal_velocity, ImpulseResult, PairContext, PredictedEvent};

const NEWTON_MAX_ITERATIONS: usize = 50;
const NEWTON_TOLERANCE: f64 = 1e-13;

#[derive(Debug, Clone, Copy)]
pub struct Compressing {
    pub initial_diameter: f64,
    pub growth_rate: f64,
}

impl Compressing {
    pub fn new(initial_diameter: f64, growth_rate: f64) -> Self {
        Compressing { initial_diameter, growth_rate }
    }

    fn diameter_at(&self, t_abs: f64) -> f64 {
        self.initial_diameter + self.growth_rate * t_abs
    }

    pub fn predict(&self, ctx: &PairContext) -> Option<PredictedEvent> {
        let r = ctx.separation();
        let v = ctx.relative_velocity();
        let t0 = ctx.now;

        let f = |t: f64| -> f64 {
            let d = r + v * t;
            d.dot(&d) - self.diameter_at(t0 + t).powi(2)
        };
        let f_prime = |t: f64| -> f64 {
            let h = 1e-7_f64.max(t.abs() * 1e-9);
            (f(t + h) - f(t - h)) / (2.0 * h)
        };

        // Quadratic approximation ignoring diameter growth gives a sane
        // starting bracket for Newton's method.
        let a = v.dot(&v);
        let b = r.dot(&v);
        let c = r.dot(&r) - self.initial_diameter.powi(2);
        if a <= 0.0 {
            return None;
        }
        let discriminant = b * b - a * c;
        let mut t = if discriminant >= 0.0 && b < 0.0 {
            (-b - discriminant.sqrt()) / a
        } else {
            return None;
        };
        if t <= 0.0 {
            return None;
        }

        for _ in 0..NEWTON_MAX_ITERATIONS {
            let fv = f(t);
            if fv.abs() < NEWTON_TOLERANCE {
                break;
            }
            let fp = f_prime(t);
            if fp == 0.0 {
                break;
            }
            let next = t - fv / fp;
            if next <= 0.0 {
                break;
            }
            t = next;
        }

        if t > 0.0 && f(t).abs() < 1e-6 {
            Some(PredictedEvent { t: ctx.now + t, shell_from: 0, shell_to: 0 })
        } else {
            None
        }
    }

    /// Elastic contact, same as `HardSphere`: compression does not change
    /// the energy balance of an individual collision, only the geometry.
    pub fn resolve(&self, ctx: &PairContext, _shell_from: usize, _shell_to: usize) -> ImpulseResult {
        let r = ctx.separation();
        let n_hat = r.normalize();
        let vn = ctx.relative_velocity().dot(&n_hat);
        let (vn_prime, reflected) = resolve_normal_velocity(vn, ctx.reduced_mass(), 0.0);
        apply_impulse(ctx, n_hat, vn, vn_prime, reflected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vec3;

    #[test]
    fn growth_brings_contact_forward_relative_to_static_diameter() {
        let growing = Compressing::new(1.0, 0.2);
        let stationary = Compressing::new(1.0, 0.0);
        let ctx = PairContext {
            ra: Vec3::new(0.0, 0.0, 0.0),
            rb: Vec3::new(3.0, 0.0, 0.0),
            va: Vec3::new(0.2, 0.0, 0.0),
            vb: Vec3::new(-0.2, 0.0, 0.0),
            mass_a: 1.0,
            mass_b: 1.0,
            captured_shell: 0,
            now: 0.0,
        };
        let t_growing = growing.predict(&ctx).unwrap().t;
        let t_static = stationary.predict(&ctx).unwrap().t;
        assert!(t_growing < t_static);
    }
}
