//! Bonded square wells: a permanent tether between a pair. Unlike `SquareWell`, the outer radius is never an
//! escape route — crossing it reflects the pair back inward, the same as
//! hard-core contact, so the pair stays bonded for the life of the run.

use super::{apply_impulse, resolve_normal_velocity, solve_shell_crossing, Direction, ImpulseResult, PairContext, PredictedEvent};

#[derive(Debug, Clone, Copy)]
pub struct Bonded {
    pub hard_core: f64,
    pub tether_radius: f64,
}

impl Bonded {
    pub fn new(hard_core: f64, tether_radius: f64) -> Self {
        Bonded { hard_core, tether_radius }
    }

    /// Always predicts within the bonded pair: contact at the hard core
    /// (inward) or the tether snapping taut (outward). Both leave the pair
    /// bonded, so `shell_from`/`shell_to` are both `1`.
    pub fn predict(&self, ctx: &PairContext) -> Option<PredictedEvent> {
        let r = ctx.separation();
        let v = ctx.relative_velocity();

        let inward = solve_shell_crossing(r, v, self.hard_core, Direction::Inward)
            .map(|t| PredictedEvent { t: ctx.now + t, shell_from: 1, shell_to: 1 });
        let outward = solve_shell_crossing(r, v, self.tether_radius, Direction::Outward)
            .map(|t| PredictedEvent { t: ctx.now + t, shell_from: 1, shell_to: 1 });

        match (inward, outward) {
            (Some(a), Some(b)) => Some(if a.t <= b.t { a } else { b }),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    /// Always a reflection: neither boundary of a bond transmits energy.
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
    fn tether_reflects_receding_pair() {
        let bonded = Bonded::new(1.0, 2.0);
        let ctx = PairContext {
            ra: Vec3::new(0.0, 0.0, 0.0),
            rb: Vec3::new(1.5, 0.0, 0.0),
            va: Vec3::new(-1.0, 0.0, 0.0),
            vb: Vec3::new(1.0, 0.0, 0.0),
            mass_a: 1.0,
            mass_b: 1.0,
            captured_shell: 1,
            now: 0.0,
        };
        let predicted = bonded.predict(&ctx).unwrap();
        let mut at_tether = ctx;
        at_tether.ra = ctx.ra + ctx.va * predicted.t;
        at_tether.rb = ctx.rb + ctx.vb * predicted.t;
        let result = bonded.resolve(&at_tether, 1, 1);
        assert!(result.reflected);
    }
}
