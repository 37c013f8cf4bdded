//! The interaction registry.
//!
//! Each pair type is a tagged variant rather than a trait object: the set of
//! kinds is closed and known at build time, so dispatch is a `match` on
//! `PairKind` instead of a vtable call. All variants share the quadratic-root
//! prediction kernel and the energy-conserving impulse resolver defined here.

pub mod bonded;
pub mod compressing;
pub mod hard_sphere;
pub mod square_well;
pub mod stepped;

use crate::vector::Vec3;

/// Inputs a prediction needs about one pair, already streamed to a common
/// time `now` and with any boundary velocity correction folded in.
#[derive(Debug, Clone, Copy)]
pub struct PairContext {
    pub ra: Vec3,
    pub rb: Vec3,
    pub va: Vec3,
    pub vb: Vec3,
    pub mass_a: f64,
    pub mass_b: f64,
    /// Shell index the pair currently occupies, per `capture::CaptureMap`.
    /// `0` means outside the potential's outermost shell.
    pub captured_shell: usize,
    /// Simulation time `ra`/`rb`/`va`/`vb` are valid at.
    pub now: f64,
}

impl PairContext {
    pub fn separation(&self) -> Vec3 {
        self.ra - self.rb
    }

    pub fn relative_velocity(&self) -> Vec3 {
        self.va - self.vb
    }

    pub fn reduced_mass(&self) -> f64 {
        self.mass_a * self.mass_b / (self.mass_a + self.mass_b)
    }
}

/// Result of a successful prediction: the absolute time of the next
/// discontinuity and which shells it moves between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedEvent {
    pub t: f64,
    pub shell_from: usize,
    pub shell_to: usize,
}

/// Result of resolving an impulse: the two particles' new velocities and
/// whether the event turned out to be a reflection rather than a crossing.
#[derive(Debug, Clone, Copy)]
pub struct ImpulseResult {
    pub velocity_a: Vec3,
    pub velocity_b: Vec3,
    pub reflected: bool,
}

/// Direction of approach a shell-crossing root is being solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Separation is decreasing: solve with the `-sqrt` root.
    Inward,
    /// Separation is increasing: solve with the `+sqrt` root.
    Outward,
}

/// Solves `|r + v*t|^2 = rs^2` for the earliest positive `t`:
/// `b = r.v`, `c = r.r - rs^2`, `a = v.v`.
///
/// Returns `None` for grazing (`b == 0`), non-approaching/non-receding
/// geometry for the requested direction, a negative discriminant, or a
/// non-positive root — all of which mean this shell is not the next event
/// for this pair in the requested direction.
pub fn solve_shell_crossing(r: Vec3, v: Vec3, rs: f64, direction: Direction) -> Option<f64> {
    let a = v.dot(&v);
    if a <= 0.0 {
        return None;
    }
    let b = r.dot(&v);
    let c = r.dot(&r) - rs * rs;

    match direction {
        Direction::Inward if b >= 0.0 => return None,
        Direction::Outward if b <= 0.0 => return None,
        _ => {}
    }

    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_disc = discriminant.sqrt();

    let t = match direction {
        Direction::Inward => (-b - sqrt_disc) / a,
        Direction::Outward => (-b + sqrt_disc) / a,
    };

    if t > 0.0 {
        Some(t)
    } else {
        None
    }
}

/// Resolves the normal-component impulse for a shell crossing of energy
/// change `delta_e = E_to - E_from`.
///
/// Hard-core contact (`delta_e == 0`) always reflects, matching "Hard-core
/// contact is the special case ΔE=0 with sign reversal." Otherwise, if the
/// normal kinetic energy is insufficient to pay for the energy change, the
/// event becomes a reflection instead of a crossing; if sufficient, the
/// particle continues through the shell at the speed energy conservation
/// dictates, in the same normal direction it was already travelling.
pub fn resolve_normal_velocity(vn: f64, mu: f64, delta_e: f64) -> (f64, bool) {
    if delta_e == 0.0 {
        return (-vn, true);
    }
    let ke = 0.5 * mu * vn * vn;
    if ke < delta_e {
        return (-vn, true);
    }
    let vn_prime_sq = vn * vn - 2.0 * delta_e / mu;
    (vn.signum() * vn_prime_sq.max(0.0).sqrt(), false)
}

/// Applies a resolved normal-velocity impulse to both participants:
/// `Δp = μ(vn' - vn)·n̂`, `va += Δp/ma`, `vb -= Δp/mb`.
pub fn apply_impulse(ctx: &PairContext, n_hat: Vec3, vn: f64, vn_prime: f64, reflected: bool) -> ImpulseResult {
    let mu = ctx.reduced_mass();
    let delta_p = n_hat * (mu * (vn_prime - vn));
    ImpulseResult {
        velocity_a: ctx.va + delta_p * (1.0 / ctx.mass_a),
        velocity_b: ctx.vb - delta_p * (1.0 / ctx.mass_b),
        reflected,
    }
}

/// A registered pair-interaction type. Closed set, dispatched by `match`.
#[derive(Debug, Clone)]
pub enum PairKind {
    HardSphere(hard_sphere::HardSphere),
    SquareWell(square_well::SquareWell),
    Stepped(stepped::Stepped),
    Bonded(bonded::Bonded),
    Compressing(compressing::Compressing),
}

impl PairKind {
    pub fn predict(&self, ctx: &PairContext) -> Option<PredictedEvent> {
        match self {
            PairKind::HardSphere(k) => k.predict(ctx),
            PairKind::SquareWell(k) => k.predict(ctx),
            PairKind::Stepped(k) => k.predict(ctx),
            PairKind::Bonded(k) => k.predict(ctx),
            PairKind::Compressing(k) => k.predict(ctx),
        }
    }

    pub fn resolve(&self, ctx: &PairContext, shell_from: usize, shell_to: usize) -> ImpulseResult {
        match self {
            PairKind::HardSphere(k) => k.resolve(ctx, shell_from, shell_to),
            PairKind::SquareWell(k) => k.resolve(ctx, shell_from, shell_to),
            PairKind::Stepped(k) => k.resolve(ctx, shell_from, shell_to),
            PairKind::Bonded(k) => k.resolve(ctx, shell_from, shell_to),
            PairKind::Compressing(k) => k.resolve(ctx, shell_from, shell_to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_on_approach_solves_inward_root() {
        let r = Vec3::new(-2.0, 0.0, 0.0);
        let v = Vec3::new(2.0, 0.0, 0.0);
        let t = solve_shell_crossing(r, v, 1.0, Direction::Inward).unwrap();
        assert!((t - 0.5).abs() < 1e-12);
    }

    #[test]
    fn receding_pair_has_no_inward_root() {
        let r = Vec3::new(-2.0, 0.0, 0.0);
        let v = Vec3::new(-2.0, 0.0, 0.0);
        assert!(solve_shell_crossing(r, v, 1.0, Direction::Inward).is_none());
    }

    #[test]
    fn hard_core_contact_always_reflects() {
        let (vn_prime, reflected) = resolve_normal_velocity(-2.0, 0.5, 0.0);
        assert!(reflected);
        assert!((vn_prime - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sufficient_energy_crossing_conserves_energy() {
        let mu = 0.5;
        let vn = -2.0;
        let delta_e = -1.0;
        let (vn_prime, reflected) = resolve_normal_velocity(vn, mu, delta_e);
        assert!(!reflected);
        let ke_before = 0.5 * mu * vn * vn;
        let ke_after = 0.5 * mu * vn_prime * vn_prime;
        assert!((ke_after - (ke_before - delta_e)).abs() < 1e-9);
    }

    #[test]
    fn insufficient_energy_reflects_instead_of_crossing() {
        let mu = 0.5;
        let vn = -0.1;
        let delta_e = 1.0;
        let (vn_prime, reflected) = resolve_normal_velocity(vn, mu, delta_e);
        assert!(reflected);
        assert!((vn_prime - 0.1).abs() < 1e-12);
    }
}
