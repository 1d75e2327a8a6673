//! # Goal Placement
//!
//! Chooses the four goal cells of a finite maze:
//!
//! - **Entrance / exit** sit on the outer border, picked among border cells
//!   that open onto the maze, exit as far (Manhattan) from the entrance as
//!   possible.
//! - **Start / end** sit inside, spread along an approximate graph diameter
//!   found with a double BFS sweep. Huge ("titanic") grids sample several
//!   sweep origins with capped searches instead of one exhaustive pair.

use crate::config::TITANIC_CELL_THRESHOLD;
use crate::{
    relocate_start, spiral_search, BfsEngine, CellKind, Direction, GoalOptions, Grid, MazeError,
    MazeResult, Mulberry32, Position, Seed, SeedSource,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Goal coordinates and seed provenance of a generated maze.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMeta {
    pub entrance: Option<Position>,
    pub exit: Option<Position>,
    pub start: Option<Position>,
    pub end: Option<Position>,
    #[serde(default)]
    pub seed: i32,
    #[serde(default)]
    pub seed_source: SeedSource,
}

impl GoalMeta {
    /// Empty metadata carrying only the seed.
    pub fn new(seed: Seed) -> Self {
        Self {
            seed: seed.value,
            seed_source: seed.source,
            ..Self::default()
        }
    }

    /// Forgets all four goal cells, keeping the seed.
    pub fn clear_goals(&mut self) {
        self.entrance = None;
        self.exit = None;
        self.start = None;
        self.end = None;
    }

    /// The goal cells that are set, paired with the marker each one gets.
    pub fn markers(&self) -> Vec<(Position, CellKind)> {
        [
            (self.entrance, CellKind::Entrance),
            (self.exit, CellKind::Exit),
            (self.start, CellKind::Start),
            (self.end, CellKind::End),
        ]
        .into_iter()
        .filter_map(|(pos, kind)| pos.map(|pos| (pos, kind)))
        .collect()
    }

    /// Set of all assigned goal cells.
    pub fn goal_cells(&self) -> HashSet<Position> {
        self.markers().into_iter().map(|(pos, _)| pos).collect()
    }
}

/// A manual goal assignment; `None` leaves that goal unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalAssignment {
    pub entrance: Option<Position>,
    pub exit: Option<Position>,
    pub start: Option<Position>,
    pub end: Option<Position>,
}

impl GoalAssignment {
    /// Checks every supplied cell is in bounds and entrance/exit are on the border.
    pub fn validate(&self, grid: &Grid) -> MazeResult<()> {
        for pos in [self.entrance, self.exit, self.start, self.end]
            .into_iter()
            .flatten()
        {
            if !grid.in_bounds(pos.x, pos.y) {
                return Err(MazeError::OutOfBounds {
                    x: pos.x,
                    y: pos.y,
                    width: grid.width(),
                    height: grid.height(),
                });
            }
        }
        for (role, pos) in [("entrance", self.entrance), ("exit", self.exit)] {
            if let Some(pos) = pos {
                if !grid.is_border(pos.x, pos.y) {
                    return Err(MazeError::NotOnBorder {
                        role,
                        x: pos.x,
                        y: pos.y,
                    });
                }
            }
        }
        Ok(())
    }

    /// Copies the supplied cells into `meta`.
    pub fn apply(&self, meta: &mut GoalMeta) {
        if self.entrance.is_some() {
            meta.entrance = self.entrance;
        }
        if self.exit.is_some() {
            meta.exit = self.exit;
        }
        if self.start.is_some() {
            meta.start = self.start;
        }
        if self.end.is_some() {
            meta.end = self.end;
        }
    }
}

/// Entrance and exit picked on the border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntranceExit {
    pub entrance: Position,
    pub exit: Position,
    /// Fixed fallback cells were used
    pub fallback: bool,
}

/// Start and end picked inside the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartEnd {
    pub start: Position,
    pub end: Position,
    /// BFS distance between them, 0 for the degenerate fallback
    pub dist: u32,
}

/// Direction pointing from a border cell into the grid. Corners have none.
pub fn inward_direction(grid: &Grid, pos: Position) -> Option<Direction> {
    let (right, bottom) = (grid.width() as i32 - 1, grid.height() as i32 - 1);
    let on_x_edge = pos.x == 0 || pos.x == right;
    let on_y_edge = pos.y == 0 || pos.y == bottom;
    if !grid.in_bounds(pos.x, pos.y) || on_x_edge == on_y_edge {
        return None;
    }
    Some(if pos.y == 0 {
        Direction::South
    } else if pos.y == bottom {
        Direction::North
    } else if pos.x == 0 {
        Direction::East
    } else {
        Direction::West
    })
}

fn border_cells(grid: &Grid) -> impl Iterator<Item = Position> + '_ {
    (0..grid.cells().len())
        .map(|idx| grid.position_of(idx))
        .filter(|&pos| inward_direction(grid, pos).is_some())
}

/// Border cells (corners excluded) that can serve as entrance or exit.
///
/// Preferred are cells whose inward neighbour is already open. When there are
/// none, cells with any open cell next to their inward neighbour qualify.
pub fn border_candidates(grid: &Grid) -> Vec<Position> {
    let direct: Vec<Position> = border_cells(grid)
        .filter(|&pos| {
            inward_direction(grid, pos)
                .map(|direction| grid.is_open_at(pos.step(direction, 1)))
                .unwrap_or(false)
        })
        .collect();
    if !direct.is_empty() {
        return direct;
    }

    border_cells(grid)
        .filter(|&pos| {
            inward_direction(grid, pos)
                .map(|direction| {
                    let inward = pos.step(direction, 1);
                    inward
                        .cardinal_adjacent_positions()
                        .iter()
                        .any(|&next| next != pos && grid.is_open_at(next))
                })
                .unwrap_or(false)
        })
        .collect()
}

/// Opens a border cell and the cell just inside it.
///
/// An inward cell that is already open keeps its value, so markers placed
/// there survive.
pub fn open_border_goal(grid: &mut Grid, pos: Position) {
    grid.set_at(pos, CellKind::Path);
    if let Some(direction) = inward_direction(grid, pos) {
        let inward = pos.step(direction, 1);
        if grid.is_wall(inward.x, inward.y) {
            grid.set_at(inward, CellKind::Path);
        }
    }
}

/// Picks entrance and exit and opens both in the grid.
///
/// The entrance is a uniformly random candidate; the exit is the candidate
/// Manhattan-farthest from it, first in scan order on ties. With fewer than
/// two candidates the fixed cells `(1, 0)` and `(width - 2, height - 1)` are
/// forced open instead.
pub fn place_entrance_exit(grid: &mut Grid, rng: &mut Mulberry32) -> EntranceExit {
    let candidates = border_candidates(grid);

    let placed = if candidates.len() >= 2 {
        let entrance = candidates[rng.below(candidates.len())];
        let mut exit = entrance;
        let mut best = 0;
        for &candidate in &candidates {
            let dist = entrance.manhattan_distance(candidate);
            if dist > best {
                best = dist;
                exit = candidate;
            }
        }
        EntranceExit {
            entrance,
            exit,
            fallback: false,
        }
    } else {
        warn!(
            "Only {} border candidates, forcing fallback entrance and exit",
            candidates.len()
        );
        EntranceExit {
            entrance: Position::new(1, 0),
            exit: Position::new(grid.width() as i32 - 2, grid.height() as i32 - 1),
            fallback: true,
        }
    };

    open_border_goal(grid, placed.entrance);
    open_border_goal(grid, placed.exit);
    debug!("Entrance {} exit {}", placed.entrance, placed.exit);
    placed
}

/// Whether the sampled search should be used for this grid.
pub fn use_titanic(grid: &Grid, options: &GoalOptions) -> bool {
    options
        .titanic
        .unwrap_or(grid.width() * grid.height() >= TITANIC_CELL_THRESHOLD)
}

/// Spreads up to `count` sweep origins over a coarse lattice of the grid,
/// snapping each jittered lattice point to the nearest usable cell.
pub fn titanic_samples(
    grid: &Grid,
    avoid: &HashSet<Position>,
    count: usize,
    rng: &mut Mulberry32,
) -> Vec<Position> {
    let per_side = ((count as f64).sqrt().ceil() as usize).max(1);
    let cell_w = (grid.width() / per_side).max(1);
    let cell_h = (grid.height() / per_side).max(1);
    let radius = cell_w.max(cell_h) as i32;
    let mut samples: Vec<Position> = Vec::with_capacity(count);

    'lattice: for gy in 0..per_side {
        for gx in 0..per_side {
            if samples.len() >= count {
                break 'lattice;
            }
            let probe = Position::new(
                (gx * cell_w + rng.below(cell_w)) as i32,
                (gy * cell_h + rng.below(cell_h)) as i32,
            );
            if let Some(pos) = spiral_search(grid, probe, avoid, true, Some(radius)) {
                if !samples.contains(&pos) {
                    samples.push(pos);
                }
            }
        }
    }

    if samples.is_empty() {
        samples.extend(relocate_start(grid, avoid, rng));
    }
    samples
}

/// Picks start and end along an approximate diameter of the open cells.
///
/// Cells in `avoid` are never entered or chosen. Results off the interior are
/// moved to the nearest usable interior cell by spiral search.
pub fn place_start_end(
    grid: &Grid,
    engine: &mut BfsEngine,
    avoid: &HashSet<Position>,
    options: &GoalOptions,
    rng: &mut Mulberry32,
) -> StartEnd {
    let origins = if use_titanic(grid, options) {
        let samples = titanic_samples(grid, avoid, options.titanic_samples, rng);
        debug!("Titanic goal search over {} samples", samples.len());
        samples
    } else {
        relocate_start(grid, avoid, rng).into_iter().collect()
    };
    let cap = use_titanic(grid, options).then_some(options.max_bfs_steps_titanic);

    let mut best: Option<StartEnd> = None;
    for origin in origins {
        let first = engine.farthest(grid, origin, avoid, cap, rng);
        let second = engine.farthest(grid, first.cell, avoid, cap, rng);
        if best.map_or(true, |found| second.dist > found.dist) {
            best = Some(StartEnd {
                start: first.cell,
                end: second.cell,
                dist: second.dist,
            });
        }
    }

    let Some(mut found) = best else {
        warn!("No open cell for start/end, using fixed fallback cells");
        return StartEnd {
            start: Position::new(1, 1),
            end: Position::new(grid.width() as i32 - 2, grid.height() as i32 - 2),
            dist: 0,
        };
    };

    found.start = settle(grid, found.start, avoid);
    let mut avoid_start = avoid.clone();
    avoid_start.insert(found.start);
    found.end = settle(grid, found.end, &avoid_start);
    found
}

/// Keeps `pos` if it is a usable interior cell, otherwise spirals outward.
fn settle(grid: &Grid, pos: Position, avoid: &HashSet<Position>) -> Position {
    if grid.is_interior(pos.x, pos.y) && grid.is_open_at(pos) && !avoid.contains(&pos) {
        return pos;
    }
    match spiral_search(grid, pos, avoid, true, None) {
        Some(moved) => {
            debug!("Goal cell {} relocated to {}", pos, moved);
            moved
        }
        None => pos,
    }
}

/// Writes the marker of every assigned goal into the grid.
pub fn stamp_goal_markers(grid: &mut Grid, meta: &GoalMeta) {
    for (pos, kind) in meta.markers() {
        grid.set_at(pos, kind);
    }
}

/// Resets every goal marker cell to PATH. Returns the number of cells reset.
pub fn clear_goal_markers(grid: &mut Grid) -> usize {
    let markers: Vec<Position> = (0..grid.cells().len())
        .map(|idx| grid.position_of(idx))
        .filter(|&pos| grid.kind_at(pos).is_some_and(CellKind::is_goal_marker))
        .collect();
    for &pos in &markers {
        grid.set_at(pos, CellKind::Path);
    }
    markers.len()
}
