//! Persistence: binary snapshots via `bincode`, plus a `TrajectoryWriter`
//! that accumulates periodic snapshots of a running simulation.

pub mod snapshot;
pub mod trajectory;

pub use snapshot::Snapshot;
pub use trajectory::TrajectoryWriter;

use crate::error::EdmdError;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

pub fn save_binary<T: Serialize>(data: &T, path: &Path) -> Result<(), EdmdError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = bincode::serialize(data)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn load_binary<T: DeserializeOwned>(path: &Path) -> Result<T, EdmdError> {
    let bytes = std::fs::read(path)?;
    let data = bincode::deserialize(&bytes)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sample {
        value: u32,
    }

    #[test]
    fn round_trips_through_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bin");
        let sample = Sample { value: 42 };
        save_binary(&sample, &path).unwrap();
        let reloaded: Sample = load_binary(&path).unwrap();
        assert_eq!(sample, reloaded);
    }
}
