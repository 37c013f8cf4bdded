//! Continuous-potential discretisation.
//!
//! Converts a continuous pair potential `U(r)` into an ordered shell table:
//! a strictly descending sequence of radii with cumulative energies,
//! extended lazily as the engine asks for deeper shells. Only Lennard-Jones
//! is implemented as a continuous potential; `Stepped` potentials skip
//! discretisation entirely and are read directly from configuration as a
//! `ShellTable::from_steps`.

pub mod lennard_jones;
pub mod shell_table;

pub use lennard_jones::LennardJones;
pub use shell_table::{EnergyMode, RadialMode, Shell, ShellTable};
