//! Error types for the EDMD engine.
//!
//! Follows the error-kind split from the design: `ConfigError` and
//! `OverlapError` are ordinary `Result` values that can legitimately
//! propagate to `main`, while `NumericalError` represents a broken
//! invariant that a correct engine should never produce in practice —
//! it is still returned rather than panicked on directly, so the CLI
//! can log full particle state and exit with a stable code instead of
//! unwinding with a bare `panic!`.

use thiserror::Error;

/// Malformed configuration, detected at startup before any event is scheduled.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown type tag: {0}")]
    UnknownType(String),

    #[error("inconsistent units: {0}")]
    InconsistentUnits(String),

    #[error("cutoff {cutoff} is below the potential minimum {minimum}")]
    CutoffBelowMinimum { cutoff: f64, minimum: f64 },

    #[error("empty particle set")]
    EmptyParticleSet,

    #[error("malformed configuration: {0}")]
    Malformed(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Particles found inside the hard core, at init or after a predict-resolve cycle.
///
/// Fatal unless overlap-squash is enabled, in which case the caller schedules
/// a `Recalculate` event instead of surfacing this (see `engine::loop_`).
#[derive(Error, Debug)]
#[error("overlap between particles {a} and {b}: separation {separation} < hard core {hard_core}")]
pub struct OverlapError {
    pub a: usize,
    pub b: usize,
    pub separation: f64,
    pub hard_core: f64,
}

/// Negative discriminant where positive was expected, or NaN in a vector op.
///
/// Spec: "a correct EDMD must not silently swallow this." Always logged at
/// `error!` with full participant state by the call site before being
/// returned.
#[derive(Error, Debug)]
pub enum NumericalError {
    #[error("negative discriminant ({discriminant}) predicting event for particles {a}/{b}")]
    NegativeDiscriminant { a: usize, b: usize, discriminant: f64 },

    #[error("NaN encountered in {context} for particle {particle}")]
    NotANumber { context: &'static str, particle: usize },

    #[error("time moved backwards: {prev} -> {next}")]
    TimeRegression { prev: f64, next: f64 },

    #[error("stale event executed: token mismatch for particle {particle}")]
    StaleEventExecuted { particle: usize },
}

/// Top-level error type returned from `main` and mapped to a process exit
/// code: 0 normal, 1 bad input, 2 runtime invariant violation.
#[derive(Error, Debug)]
pub enum EdmdError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("unresolved particle overlap: {0}")]
    Overlap(#[from] OverlapError),

    #[error("numerical invariant violated: {0}")]
    Numerical(#[from] NumericalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}

impl EdmdError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EdmdError::Config(_) => 1,
            EdmdError::Overlap(_) | EdmdError::Numerical(_) => 2,
            EdmdError::Io(_) | EdmdError::Bincode(_) => 1,
        }
    }
}
