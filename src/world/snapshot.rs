//! # World Snapshots
//!
//! JSON save format for a finished maze:
//! `{version, width, height, map, meta, spawns}` where `map` holds one byte
//! per cell in row-major order.

use crate::config::SNAPSHOT_VERSION;
use crate::{GoalMeta, Grid, MapGenerator, MazeError, MazeResult, SpawnData};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// A serialisable copy of a grid with its goals and spawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: u32,
    pub width: usize,
    pub height: usize,
    /// Cell bytes; out-of-range numbers are clamped into 0..=255 on parse
    #[serde(deserialize_with = "deserialize_clamped_bytes")]
    pub map: Vec<u8>,
    #[serde(default)]
    pub meta: GoalMeta,
    #[serde(default)]
    pub spawns: SpawnData,
}

fn deserialize_clamped_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<f64>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|value| {
            if value.is_nan() {
                0
            } else {
                value.clamp(0.0, 255.0) as u8
            }
        })
        .collect())
}

impl WorldSnapshot {
    /// Captures a grid with its metadata and spawns.
    pub fn new(grid: &Grid, meta: GoalMeta, spawns: SpawnData) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            width: grid.width(),
            height: grid.height(),
            map: grid.cells().to_vec(),
            meta,
            spawns,
        }
    }

    /// Captures the current state of a generator.
    pub fn from_generator(generator: &MapGenerator, spawns: SpawnData) -> MazeResult<Self> {
        let grid = generator.grid().ok_or(MazeError::MazeNotGenerated)?;
        Ok(Self::new(grid, *generator.meta(), spawns))
    }

    /// Checks the map buffer matches the declared dimensions.
    pub fn validate(&self) -> MazeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MazeError::InvalidSnapshot(format!(
                "dimensions {}x{} are empty",
                self.width, self.height
            )));
        }
        let expected = self.width.checked_mul(self.height).ok_or_else(|| {
            MazeError::InvalidSnapshot(format!(
                "dimensions {}x{} overflow the cell count",
                self.width, self.height
            ))
        })?;
        if self.map.len() != expected {
            return Err(MazeError::InvalidSnapshot(format!(
                "map has {} cells, expected {}",
                self.map.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Rebuilds the grid held by the snapshot.
    pub fn to_grid(&self) -> MazeResult<Grid> {
        self.validate()?;
        Grid::from_cells(self.width, self.height, self.map.clone())
    }

    pub fn to_json(&self) -> MazeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and validates a snapshot.
    pub fn from_json(json: &str) -> MazeResult<Self> {
        let snapshot: WorldSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> MazeResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        debug!("Wrote snapshot to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> MazeResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
