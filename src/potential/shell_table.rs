//! The ordered shell table: a strictly descending sequence of
//! radii with cumulative energies, built either directly from a `Stepped`
//! configuration entry or lazily discretised from a continuous potential.
//!
//! Extension is append-only and performed by a single producer (the thread
//! running the event loop); `highest_valid` lets readers on the same thread
//! check how far the table currently reaches without taking a lock, keeping
//! the hot path free of synchronisation.

use crate::potential::LennardJones;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    /// Outer radius of this shell.
    pub r: f64,
    /// Energy released when crossing inward from the previous (larger) shell.
    pub energy: f64,
}

/// How successive shell radii are spaced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum RadialMode {
    /// Uniform spacing in `r`: `n_att` steps between the cutoff and the
    /// potential's minimum, continuing at the same spacing below the minimum
    /// down to a truncated hard core.
    DeltaR { n_att: usize },
    /// Uniform spacing in energy: each step changes `U` by `target_delta_u`,
    /// located by bisection.
    DeltaU { target_delta_u: f64 },
}

/// How the energy assigned to a shell crossing is computed from the
/// continuous potential.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EnergyMode {
    /// `U` evaluated at the shell midpoint.
    Midpoint,
    /// `U` evaluated at the outer (left, larger-r) edge.
    Left,
    /// `U` evaluated at the inner (right, smaller-r) edge.
    Right,
    /// Volume-weighted average of `U` over the shell, via the closed-form
    /// antiderivative (`LennardJones::volume_average`).
    Volume,
    /// Energy chosen so the shell's contribution to the second virial
    /// coefficient matches the continuous potential's, at temperature `kt`.
    Virial { kt: f64 },
}

/// Number of sub-intervals used by the trapezoidal virial integral.
const VIRIAL_INTEGRATION_STEPS: usize = 100_000;

/// A lazily-extended, strictly descending shell table for one continuous
/// pair potential.
#[derive(Debug)]
pub struct ShellTable {
    potential: LennardJones,
    radial_mode: RadialMode,
    energy_mode: EnergyMode,
    /// Hard-core radius: the table never extends below this.
    hard_core: f64,
    shells: RefCell<Vec<Shell>>,
    highest_valid: Cell<usize>,
}

impl ShellTable {
    pub fn new(potential: LennardJones, radial_mode: RadialMode, energy_mode: EnergyMode, hard_core: f64) -> Self {
        let mut table = ShellTable {
            potential,
            radial_mode,
            energy_mode,
            hard_core,
            shells: RefCell::new(Vec::new()),
            highest_valid: Cell::new(0),
        };
        table.seed();
        table
    }

    /// Builds a table directly from pre-computed steps, bypassing
    /// discretisation entirely (used for `Type = "Stepped"` configuration
    /// entries, which are not generated from a continuous `U`).
    pub fn from_steps(steps: Vec<Shell>, hard_core: f64) -> Self {
        let n = steps.len();
        ShellTable {
            potential: LennardJones::new(1.0, 0.0, steps.first().map(|s| s.r).unwrap_or(1.0)),
            radial_mode: RadialMode::DeltaR { n_att: 0 },
            energy_mode: EnergyMode::Midpoint,
            hard_core,
            shells: RefCell::new(steps),
            highest_valid: Cell::new(n),
        }
    }

    /// Seeds the table with its outermost shell, at the potential's cutoff.
    fn seed(&mut self) {
        let cutoff = self.potential.cutoff;
        self.shells.get_mut().push(Shell { r: cutoff, energy: 0.0 });
        self.highest_valid.set(1);
    }

    /// Number of shells currently materialised.
    pub fn len(&self) -> usize {
        self.highest_valid.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outer (largest) radius, i.e. the potential's cutoff.
    pub fn cutoff(&self) -> f64 {
        self.shells.borrow()[0].r
    }

    /// Inner (smallest) radius the table will ever extend to.
    pub fn hard_core(&self) -> f64 {
        self.hard_core
    }

    /// Returns the shell at `index`, extending the table as needed.
    ///
    /// Panics if `index` would require extending past the hard core; callers
    /// must check `hard_core` themselves before requesting deeper shells
    /// (the registry does this when deciding whether a pair has reached
    /// contact).
    pub fn shell(&self, index: usize) -> Shell {
        self.extend_to(index);
        self.shells.borrow()[index]
    }

    fn extend_to(&self, index: usize) {
        while self.highest_valid.get() <= index {
            self.push_next_shell();
        }
    }

    fn push_next_shell(&self) {
        let mut shells = self.shells.borrow_mut();
        let prev = *shells.last().expect("seeded with at least one shell");
        let next_r = self.next_radius(prev.r);
        let next_r = next_r.max(self.hard_core);

        let energy = self.assign_energy(next_r, prev.r);
        shells.push(Shell { r: next_r, energy });
        self.highest_valid.set(shells.len());
    }

    fn next_radius(&self, prev_r: f64) -> f64 {
        match self.radial_mode {
            RadialMode::DeltaR { n_att } => {
                let r_min = self.potential.minimum_r();
                let span = (self.potential.cutoff - r_min) / n_att.max(1) as f64;
                (prev_r - span).max(0.0)
            }
            RadialMode::DeltaU { target_delta_u } => {
                let target_u = self.potential.u(prev_r) + target_delta_u;
                bisect_for_u(&self.potential, prev_r, self.hard_core, target_u)
            }
        }
    }

    fn assign_energy(&self, r_inner: f64, r_outer: f64) -> f64 {
        match self.energy_mode {
            EnergyMode::Midpoint => self.potential.u((r_inner + r_outer) / 2.0),
            EnergyMode::Left => self.potential.u(r_outer),
            EnergyMode::Right => self.potential.u(r_inner),
            EnergyMode::Volume => self.potential.volume_average(r_inner, r_outer),
            EnergyMode::Virial { kt } => self.virial_matched_energy(r_inner, r_outer, kt),
        }
    }

    /// Picks the shell energy `e` such that the stepped shell's contribution
    /// to the second virial coefficient,
    /// `-2*pi*(exp(-e/kt) - 1) * (r_outer^3 - r_inner^3) / 3`,
    /// matches the continuous potential's own contribution over the same
    /// interval, computed by trapezoidal integration of
    /// `-2*pi*(exp(-U(r)/kt) - 1) * r^2`.
    fn virial_matched_energy(&self, r_inner: f64, r_outer: f64, kt: f64) -> f64 {
        let n = VIRIAL_INTEGRATION_STEPS;
        let dr = (r_outer - r_inner) / n as f64;
        let integrand = |r: f64| -> f64 {
            let u = self.potential.u(r);
            -2.0 * std::f64::consts::PI * ((-u / kt).exp() - 1.0) * r * r
        };
        let mut integral = 0.5 * (integrand(r_inner) + integrand(r_outer));
        for i in 1..n {
            integral += integrand(r_inner + i as f64 * dr);
        }
        integral *= dr;

        let shell_volume_factor = (r_outer.powi(3) - r_inner.powi(3)) / 3.0;
        let ratio = integral / (2.0 * std::f64::consts::PI * shell_volume_factor);
        -kt * (1.0 - ratio).ln()
    }
}

/// Bisects for the radius at which `U(r) == target_u`, searching inward from
/// `from` toward `hard_core`.
fn bisect_for_u(potential: &LennardJones, from: f64, hard_core: f64, target_u: f64) -> f64 {
    let mut lo = hard_core.max(1e-12);
    let mut hi = from;
    let f = |r: f64| potential.u(r) - target_u;

    if f(lo).signum() == f(hi).signum() {
        return lo;
    }

    let tolerance = target_u.abs().max(1e-300) * 1e-15;
    for _ in 0..1000 {
        let mid = 0.5 * (lo + hi);
        let fm = f(mid);
        if fm.abs() <= tolerance {
            return mid;
        }
        if fm.signum() == f(lo).signum() {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lj() -> LennardJones {
        LennardJones::new(1.0, 1.0, 3.0)
    }

    #[test]
    fn table_starts_with_one_shell_at_cutoff() {
        let table = ShellTable::new(lj(), RadialMode::DeltaR { n_att: 10 }, EnergyMode::Midpoint, 0.5);
        assert_eq!(table.len(), 1);
        assert_eq!(table.shell(0).r, 3.0);
    }

    #[test]
    fn extending_produces_strictly_descending_radii() {
        let table = ShellTable::new(lj(), RadialMode::DeltaR { n_att: 10 }, EnergyMode::Midpoint, 0.5);
        let r0 = table.shell(0).r;
        let r1 = table.shell(1).r;
        let r2 = table.shell(2).r;
        assert!(r1 < r0);
        assert!(r2 < r1);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn delta_u_mode_spaces_shells_by_constant_energy() {
        let table = ShellTable::new(lj(), RadialMode::DeltaU { target_delta_u: 0.05 }, EnergyMode::Midpoint, 0.5);
        let u0 = lj().u(table.shell(0).r);
        let u1 = lj().u(table.shell(1).r);
        assert!((((u1 - u0).abs()) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn from_steps_marks_all_shells_valid_immediately() {
        let steps = vec![Shell { r: 2.0, energy: 0.0 }, Shell { r: 1.5, energy: -1.0 }];
        let table = ShellTable::from_steps(steps, 1.0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.shell(1).energy, -1.0);
    }

    #[test]
    fn virial_energy_is_finite_and_negative_in_attractive_well() {
        let table = ShellTable::new(lj(), RadialMode::DeltaR { n_att: 10 }, EnergyMode::Virial { kt: 1.0 }, 0.5);
        let e = table.shell(1).energy;
        assert!(e.is_finite());
    }

    #[test]
    fn summed_shell_energy_reproduces_u_at_the_shell_radius() {
        // With a single attractive step (n_att = 1), the cutoff-to-minimum
        // span is one shell: summing shell energies from the cutoff inward
        // must reproduce U at that shell's own radius, to within the
        // stepping rule's error bound. `Right` assigns each shell exactly
        // `U` evaluated at its own (inner) radius, so for one step the
        // bound is exact.
        let table = ShellTable::new(lj(), RadialMode::DeltaR { n_att: 1 }, EnergyMode::Right, 0.5);
        let r1 = table.shell(1).r;
        let summed: f64 = (1..=1).map(|k| table.shell(k).energy).sum();
        assert!((summed - lj().u(r1)).abs() < 1e-12);
    }
}
