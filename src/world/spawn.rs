//! # Spawn Placement
//!
//! Picks open cells for items and enemies. Sampling is without replacement
//! and takes any [`rand::Rng`], so a seeded [`crate::Mulberry32`] keeps spawns
//! reproducible.

use crate::{GoalMeta, Grid, Position};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How many entities of each kind to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub items: usize,
    pub enemies: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            items: 8,
            enemies: 4,
        }
    }
}

/// Spawn positions, as written into world snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnData {
    pub items: Vec<Position>,
    pub enemies: Vec<Position>,
}

/// Every non-wall cell not in `avoid`, in row-major order.
pub fn collect_open_cells(grid: &Grid, avoid: &HashSet<Position>) -> Vec<Position> {
    (0..grid.cells().len())
        .map(|idx| grid.position_of(idx))
        .filter(|pos| grid.is_open_at(*pos) && !avoid.contains(pos))
        .collect()
}

/// Samples up to `count` distinct cells.
pub fn pick_random_cells<R: Rng + ?Sized>(
    cells: &[Position],
    count: usize,
    rng: &mut R,
) -> Vec<Position> {
    let amount = count.min(cells.len());
    index::sample(rng, cells.len(), amount)
        .into_iter()
        .map(|idx| cells[idx])
        .collect()
}

/// Up to `count` distinct open cells outside `avoid`.
///
/// # Examples
///
/// ```
/// use mazeforge::{generate_spawn_points, Grid, Mulberry32};
/// use std::collections::HashSet;
///
/// let grid = Grid::from_ascii(&["#####", "#   #", "#####"]);
/// let mut rng = Mulberry32::new(1);
/// let spawns = generate_spawn_points(&grid, 5, &HashSet::new(), &mut rng);
/// assert_eq!(spawns.len(), 3);
/// ```
pub fn generate_spawn_points<R: Rng + ?Sized>(
    grid: &Grid,
    count: usize,
    avoid: &HashSet<Position>,
    rng: &mut R,
) -> Vec<Position> {
    let cells = collect_open_cells(grid, avoid);
    pick_random_cells(&cells, count, rng)
}

/// Places items, then enemies, on disjoint open cells away from every goal.
pub fn build_spawn_data<R: Rng + ?Sized>(
    grid: &Grid,
    meta: &GoalMeta,
    config: &SpawnConfig,
    rng: &mut R,
) -> SpawnData {
    let mut avoid = meta.goal_cells();
    let items = generate_spawn_points(grid, config.items, &avoid, rng);
    avoid.extend(items.iter().copied());
    let enemies = generate_spawn_points(grid, config.enemies, &avoid, rng);
    SpawnData { items, enemies }
}
