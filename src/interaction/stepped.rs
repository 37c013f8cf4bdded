//! Stepped potentials backed by a full `ShellTable`:
//! the general multi-shell case, used both for discretised Lennard-Jones and
//! for directly-configured `Type="Stepped"` tables.

use super::{apply_impulse, resolve_normal_velocity, solve_shell_crossing, Direction, ImpulseResult, PairContext, PredictedEvent};
use crate::potential::ShellTable;
use std::rc::Rc;

#[derive(Clone)]
pub struct Stepped {
    pub table: Rc<ShellTable>,
}

impl std::fmt::Debug for Stepped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stepped").field("shells_materialised", &self.table.len()).finish()
    }
}

impl Stepped {
    pub fn new(table: Rc<ShellTable>) -> Self {
        Stepped { table }
    }

    pub fn predict(&self, ctx: &PairContext) -> Option<PredictedEvent> {
        let r = ctx.separation();
        let v = ctx.relative_velocity();
        let shell = ctx.captured_shell;

        let inward_target = self.table.shell(shell + 1).r;
        let inward = solve_shell_crossing(r, v, inward_target, Direction::Inward)
            .map(|t| PredictedEvent { t: ctx.now + t, shell_from: shell, shell_to: shell + 1 });

        let outward = if shell > 0 {
            let outward_target = self.table.shell(shell - 1).r;
            solve_shell_crossing(r, v, outward_target, Direction::Outward)
                .map(|t| PredictedEvent { t: ctx.now + t, shell_from: shell, shell_to: shell - 1 })
        } else {
            None
        };

        match (inward, outward) {
            (Some(a), Some(b)) => Some(if a.t <= b.t { a } else { b }),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    pub fn resolve(&self, ctx: &PairContext, shell_from: usize, shell_to: usize) -> ImpulseResult {
        let r = ctx.separation();
        let n_hat = r.normalize();
        let vn = ctx.relative_velocity().dot(&n_hat);

        let e_from = self.shell_energy(shell_from);
        let e_to = self.shell_energy(shell_to);
        let delta_e = e_to - e_from;

        let (vn_prime, reflected) = resolve_normal_velocity(vn, ctx.reduced_mass(), delta_e);
        apply_impulse(ctx, n_hat, vn, vn_prime, reflected)
    }

    /// Cumulative energy at shell `index`: `0` outside the cutoff (shell 0),
    /// the table's own per-shell `energy` otherwise. The table stores the
    /// energy release of crossing *into* a shell, so cumulative energy is a
    /// running sum from the outermost shell inward.
    fn shell_energy(&self, index: usize) -> f64 {
        if index == 0 {
            return 0.0;
        }
        let mut total = 0.0;
        for i in 1..=index {
            total += self.table.shell(i).energy;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::{EnergyMode, LennardJones, RadialMode};
    use crate::vector::Vec3;

    fn ctx(ra: Vec3, rb: Vec3, va: Vec3, vb: Vec3, captured_shell: usize) -> PairContext {
        PairContext { ra, rb, va, vb, mass_a: 1.0, mass_b: 1.0, captured_shell, now: 0.0 }
    }

    #[test]
    fn predicts_inward_crossing_to_next_shell() {
        let lj = LennardJones::new(1.0, 1.0, 3.0);
        let table = Rc::new(ShellTable::new(lj, RadialMode::DeltaR { n_att: 10 }, EnergyMode::Midpoint, 0.8));
        let stepped = Stepped::new(table);
        let c = ctx(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            0,
        );
        let predicted = stepped.predict(&c).unwrap();
        assert_eq!(predicted.shell_from, 0);
        assert_eq!(predicted.shell_to, 1);
        assert!(predicted.t > 0.0);
    }
}
