//! # Maze Carver
//!
//! Iterative depth-first "recursive backtracker" over the odd-indexed cells of
//! a wall-filled grid.
//!
//! The traversal keeps an explicit stack instead of recursing, so arbitrarily
//! large grids never exhaust the call stack. The stack is reserved up front for
//! the number of odd cells, which bounds its depth.

use crate::{CellKind, Direction, Grid, Mulberry32, Position};
use log::debug;

/// Picks a uniformly random odd interior cell to start carving from.
pub fn random_odd_cell(width: usize, height: usize, rng: &mut Mulberry32) -> Position {
    let columns = (width.saturating_sub(1) / 2).max(1);
    let rows = (height.saturating_sub(1) / 2).max(1);
    let x = 1 + 2 * rng.below(columns);
    let y = 1 + 2 * rng.below(rows);
    Position::new(x as i32, y as i32)
}

/// Carves a perfect maze into `grid` starting from `start`.
///
/// At each cell the four directions are shuffled and the first one whose
/// cell two steps away is an interior wall gets carved (the wall between
/// included). The current cell is pushed back so its remaining directions are
/// tried after the new branch dead-ends. Cells that are already open count as
/// visited, so pre-opened cells are never carved into.
///
/// Returns the number of cells opened.
///
/// # Examples
///
/// ```
/// use mazeforge::{carve_maze, CellKind, Grid, Mulberry32, Position};
///
/// let mut grid = Grid::new(9, 9);
/// let mut rng = Mulberry32::new(42);
/// carve_maze(&mut grid, Position::new(1, 1), &mut rng);
///
/// // Every odd cell of a 9x9 grid is carved
/// for y in (1..9).step_by(2) {
///     for x in (1..9).step_by(2) {
///         assert_eq!(grid.kind(x, y), Some(CellKind::Path));
///     }
/// }
/// ```
pub fn carve_maze(grid: &mut Grid, start: Position, rng: &mut Mulberry32) -> usize {
    if !grid.is_interior(start.x, start.y) {
        debug!("Carve start {} is not interior, nothing carved", start);
        return 0;
    }

    let odd_cells = grid.width().div_ceil(2) * grid.height().div_ceil(2);
    let mut stack: Vec<Position> = Vec::with_capacity(odd_cells);
    let mut opened = 0;

    if grid.is_wall(start.x, start.y) {
        grid.set_at(start, CellKind::Path);
        opened += 1;
    }
    stack.push(start);

    let mut directions = Direction::ALL;
    while let Some(current) = stack.pop() {
        rng.shuffle(&mut directions);
        for &direction in &directions {
            let next = current.step(direction, 2);
            if !grid.is_interior(next.x, next.y) || !grid.is_wall(next.x, next.y) {
                continue;
            }
            grid.set_at(current.step(direction, 1), CellKind::Path);
            grid.set_at(next, CellKind::Path);
            opened += 2;
            stack.push(current);
            stack.push(next);
            break;
        }
    }

    opened
}

/// Forces every border cell to WALL.
pub fn ensure_border_walls(grid: &mut Grid) {
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    for x in 0..width {
        grid.set(x, 0, CellKind::Wall);
        grid.set(x, height - 1, CellKind::Wall);
    }
    for y in 0..height {
        grid.set(0, y, CellKind::Wall);
        grid.set(width - 1, y, CellKind::Wall);
    }
}

/// Opens each border cell whose inward neighbour is open, letting corridors
/// run off the edge of the map. Corners are left alone.
///
/// Returns the number of border cells opened.
pub fn carve_to_border(grid: &mut Grid) -> usize {
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let mut openings = Vec::new();

    for x in 1..width - 1 {
        if grid.is_open(x, 1) {
            openings.push(Position::new(x, 0));
        }
        if grid.is_open(x, height - 2) {
            openings.push(Position::new(x, height - 1));
        }
    }
    for y in 1..height - 1 {
        if grid.is_open(1, y) {
            openings.push(Position::new(0, y));
        }
        if grid.is_open(width - 2, y) {
            openings.push(Position::new(width - 1, y));
        }
    }

    let mut opened = 0;
    for pos in openings {
        if grid.is_wall(pos.x, pos.y) {
            grid.set_at(pos, CellKind::Path);
            opened += 1;
        }
    }
    opened
}
