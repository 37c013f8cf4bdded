//! Seeded RNG wrapper.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Constructs the simulation's RNG from an explicit seed. A thin wrapper
/// rather than a bare `StdRng::seed_from_u64` call at every use site, so the
/// algorithm choice lives in one place.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
