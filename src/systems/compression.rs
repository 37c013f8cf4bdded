//! Compression: a continuous parameter with no discrete
//! event of its own — every pair prediction simply reads the time-dependent
//! diameter (see `interaction::compressing::Compressing`). This module owns
//! the rescaling step applied after a compression run to restore `r/sigma`
//! invariants once particle diameters have grown.

use crate::vector::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Compression {
    pub growth_rate: f64,
}

impl Compression {
    pub fn new(growth_rate: f64) -> Self {
        Compression { growth_rate }
    }

    pub fn is_active(&self) -> bool {
        self.growth_rate != 0.0
    }

    /// Rescales a position and the box size by `factor`, preserving every
    /// `r/sigma` ratio when diameters have grown by the same factor. Used
    /// when a compression run reaches a target packing fraction and lengths
    /// are renormalised back to the original diameter scale.
    pub fn rescale_position(&self, position: Vec3, factor: f64) -> Vec3 {
        position * factor
    }

    pub fn rescale_box(&self, box_size: Vec3, factor: f64) -> Vec3 {
        box_size * factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_scales_uniformly() {
        let compression = Compression::new(0.1);
        let p = Vec3::new(1.0, 2.0, 3.0);
        let scaled = compression.rescale_position(p, 0.5);
        assert_eq!(scaled, Vec3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn zero_growth_rate_is_inactive() {
        assert!(!Compression::new(0.0).is_active());
    }
}
