//! Hard spheres: a single contact shell, purely elastic.

use super::{apply_impulse, resolve_normal_velocity, solve_shell_crossing, Direction, ImpulseResult, PairContext, PredictedEvent};

#[derive(Debug, Clone, Copy)]
pub struct HardSphere {
    pub diameter: f64,
}

impl HardSphere {
    pub fn new(diameter: f64) -> Self {
        HardSphere { diameter }
    }

    /// Only ever predicts inward contact; there is no outward event because
    /// a hard sphere has no shell beyond contact to escape from.
    pub fn predict(&self, ctx: &PairContext) -> Option<PredictedEvent> {
        let t = solve_shell_crossing(ctx.separation(), ctx.relative_velocity(), self.diameter, Direction::Inward)?;
        Some(PredictedEvent { t: ctx.now + t, shell_from: 0, shell_to: 0 })
    }

    /// Always a reflection: hard-core contact carries `delta_e = 0`.
    pub fn resolve(&self, ctx: &PairContext, _shell_from: usize, _shell_to: usize) -> ImpulseResult {
        let r = ctx.separation();
        let n_hat = r.normalize();
        let vn = ctx.relative_velocity().dot(&n_hat);
        let (vn_prime, reflected) = resolve_normal_velocity(vn, ctx.reduced_mass(), 0.0);
        apply_impulse(ctx, n_hat, vn, vn_prime, reflected)
    }
}
