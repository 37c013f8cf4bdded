//! Native (TOML) configuration, carrying the same logical sections a
//! particle/interaction/system/boundary description needs, independent of
//! any particular on-disk wire format.

use crate::error::ConfigError;
use crate::fel::SchedulerKind;
use crate::particle::SpeciesProperties;
use crate::potential::{EnergyMode, RadialMode};
use crate::vector::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub particles: ParticlesConfig,
    #[serde(default)]
    pub interactions: Vec<InteractionConfig>,
    #[serde(default)]
    pub systems: Vec<SystemConfig>,
    pub dynamics: DynamicsConfig,
    pub boundary: BoundaryConfig,
    pub scheduler: SchedulerConfig,
    pub ensemble: EnsembleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticlesConfig {
    pub species: Vec<SpeciesProperties>,
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    /// Index into `species` for each particle; same length as `positions`.
    pub species_of: Vec<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InteractionConfig {
    HardSphere { a: u16, b: u16, diameter: f64 },
    SquareWell { a: u16, b: u16, hard_core: f64, well_radius: f64, well_depth: f64 },
    Bonded { a: u16, b: u16, hard_core: f64, tether_radius: f64 },
    Compressing { a: u16, b: u16, initial_diameter: f64, growth_rate: f64 },
    Stepped {
        a: u16,
        b: u16,
        hard_core: f64,
        #[serde(default)]
        steps: Vec<StepConfig>,
    },
    LennardJones {
        a: u16,
        b: u16,
        sigma: f64,
        epsilon: f64,
        cut_off: f64,
        attractive_steps: usize,
        #[serde(default)]
        u_mode: UModeConfig,
        #[serde(default)]
        r_mode: RModeConfig,
        hard_core: f64,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepConfig {
    pub r: f64,
    pub e: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum UModeConfig {
    #[default]
    Midpoint,
    Left,
    Right,
    Volume,
    Virial {
        kt: f64,
    },
}

impl From<UModeConfig> for EnergyMode {
    fn from(value: UModeConfig) -> Self {
        match value {
            UModeConfig::Midpoint => EnergyMode::Midpoint,
            UModeConfig::Left => EnergyMode::Left,
            UModeConfig::Right => EnergyMode::Right,
            UModeConfig::Volume => EnergyMode::Volume,
            UModeConfig::Virial { kt } => EnergyMode::Virial { kt },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum RModeConfig {
    #[default]
    DeltaR,
    DeltaU {
        target_delta_u: f64,
    },
}

impl RModeConfig {
    pub fn into_radial_mode(self, n_att: usize) -> RadialMode {
        match self {
            RModeConfig::DeltaR => RadialMode::DeltaR { n_att },
            RModeConfig::DeltaU { target_delta_u } => RadialMode::DeltaU { target_delta_u },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemConfig {
    AndersenThermostat { rate: f64, temperature: f64 },
    Compression { growth_rate: f64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DynamicsConfig {
    pub kind: DynamicsKind,
    /// When true, a hard-core overlap detected at initialisation does not
    /// fail construction: a `Recalculate` event is scheduled instead to
    /// re-establish capture state for the overlapping pair once the run
    /// starts. Defaults to false (overlap at init is fatal).
    #[serde(default)]
    pub overlap_squash: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicsKind {
    Newtonian,
    NewtonianMC,
    Compression,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BoundaryConfig {
    None,
    Periodic { box_size: Vec3 },
    LeesEdwards { box_size: Vec3, shear_rate: f64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub sorter: SchedulerKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnsembleConfig {
    pub kind: EnsembleKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnsembleKind {
    #[serde(rename = "NVE")]
    Nve,
    #[serde(rename = "NVT")]
    Nvt,
    #[serde(rename = "NVShear")]
    NvShear,
    #[serde(rename = "NECompression")]
    NeCompression,
    #[serde(rename = "NTCompression")]
    NtCompression,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("Config always serialises")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.particles.positions.is_empty() {
            return Err(ConfigError::EmptyParticleSet);
        }
        if self.particles.positions.len() != self.particles.velocities.len()
            || self.particles.positions.len() != self.particles.species_of.len()
        {
            return Err(ConfigError::Malformed("positions/velocities/species_of length mismatch".into()));
        }
        for interaction in &self.interactions {
            if let InteractionConfig::LennardJones { sigma, cut_off, .. } = interaction {
                let minimum_r = 2f64.powf(1.0 / 6.0) * sigma;
                if *cut_off < minimum_r {
                    return Err(ConfigError::CutoffBelowMinimum { cutoff: *cut_off, minimum: minimum_r });
                }
            }
        }
        Ok(())
    }
}
