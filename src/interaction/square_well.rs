//! Square wells: a hard core plus one attractive shell.
//!
//! Shell index `0` is outside the well (`r > well_radius`); shell index `1`
//! is captured, between `hard_core` and `well_radius`.

use super::{apply_impulse, resolve_normal_velocity, solve_shell_crossing, Direction, ImpulseResult, PairContext, PredictedEvent};

#[derive(Debug, Clone, Copy)]
pub struct SquareWell {
    pub hard_core: f64,
    pub well_radius: f64,
    /// Energy released on capture (entering shell 1 from shell 0); negative
    /// for an attractive well.
    pub well_depth: f64,
}

impl SquareWell {
    pub fn new(hard_core: f64, well_radius: f64, well_depth: f64) -> Self {
        SquareWell { hard_core, well_radius, well_depth }
    }

    pub fn predict(&self, ctx: &PairContext) -> Option<PredictedEvent> {
        let r = ctx.separation();
        let v = ctx.relative_velocity();

        let candidate = if ctx.captured_shell == 0 {
            solve_shell_crossing(r, v, self.well_radius, Direction::Inward)
                .map(|t| PredictedEvent { t: ctx.now + t, shell_from: 0, shell_to: 1 })
        } else {
            let inward = solve_shell_crossing(r, v, self.hard_core, Direction::Inward)
                .map(|t| PredictedEvent { t: ctx.now + t, shell_from: 1, shell_to: 1 });
            let outward = solve_shell_crossing(r, v, self.well_radius, Direction::Outward)
                .map(|t| PredictedEvent { t: ctx.now + t, shell_from: 1, shell_to: 0 });
            earliest(inward, outward)
        };
        candidate
    }

    pub fn resolve(&self, ctx: &PairContext, shell_from: usize, shell_to: usize) -> ImpulseResult {
        let r = ctx.separation();
        let n_hat = r.normalize();
        let vn = ctx.relative_velocity().dot(&n_hat);

        let delta_e = if shell_from == shell_to {
            // Hard-core contact while already captured.
            0.0
        } else if shell_to > shell_from {
            self.well_depth
        } else {
            -self.well_depth
        };

        let (vn_prime, reflected) = resolve_normal_velocity(vn, ctx.reduced_mass(), delta_e);
        apply_impulse(ctx, n_hat, vn, vn_prime, reflected)
    }
}

fn earliest(a: Option<PredictedEvent>, b: Option<PredictedEvent>) -> Option<PredictedEvent> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if a.t <= b.t { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}
