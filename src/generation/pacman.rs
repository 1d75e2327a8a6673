//! # Dead-End Removal
//!
//! "Pacmanizing" loosens a perfect maze into a loopy one by knocking through
//! walls at cul-de-sacs.
//!
//! The pass loop is a bounded fixpoint iteration. It stops when a full pass
//! opens nothing or when the pass limit is hit, so a report with
//! `converged == false` may still leave dead ends behind.

use crate::{CellKind, Direction, Grid, Mulberry32, Position};
use log::debug;
use serde::{Deserialize, Serialize};

/// Outcome of a dead-end removal run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadEndReport {
    /// Full-grid passes performed
    pub passes: u32,
    /// Wall cells turned into path
    pub opened: usize,
    /// Whether the last pass changed nothing
    pub converged: bool,
    /// Dead ends left when the run stopped
    pub remaining: usize,
}

/// Whether `pos` is an open interior cell with exactly one open neighbour.
///
/// Goal markers never count as dead ends while `protect_goals` is set.
pub fn is_dead_end(grid: &Grid, pos: Position, protect_goals: bool) -> bool {
    if !grid.is_interior(pos.x, pos.y) {
        return false;
    }
    match grid.kind_at(pos) {
        None | Some(CellKind::Wall) => false,
        Some(kind) if protect_goals && kind.is_goal_marker() => false,
        Some(_) => grid.open_neighbor_count(pos.x, pos.y) == 1,
    }
}

/// Counts the dead ends currently in the grid.
pub fn count_dead_ends(grid: &Grid, protect_goals: bool) -> usize {
    (0..grid.cells().len())
        .map(|idx| grid.position_of(idx))
        .filter(|&pos| is_dead_end(grid, pos, protect_goals))
        .count()
}

/// Interior walls next to `pos` with an open cell directly behind them.
fn breakable_walls(grid: &Grid, pos: Position) -> Vec<Position> {
    Direction::ALL
        .iter()
        .filter_map(|&direction| {
            let wall = pos.step(direction, 1);
            let beyond = pos.step(direction, 2);
            (grid.is_interior(wall.x, wall.y)
                && grid.is_wall(wall.x, wall.y)
                && grid.is_open_at(beyond))
            .then_some(wall)
        })
        .collect()
}

/// Opens walls at dead ends until none are left or `max_passes` is reached.
///
/// Each dead end opens one randomly chosen wall that leads straight into
/// another open cell, so the new opening never dead-ends itself. A dead end
/// with no such wall is left alone.
///
/// # Examples
///
/// ```
/// use mazeforge::{carve_maze, count_dead_ends, remove_dead_ends, Grid, Mulberry32, Position};
///
/// let mut grid = Grid::new(15, 15);
/// let mut rng = Mulberry32::new(11);
/// carve_maze(&mut grid, Position::new(1, 1), &mut rng);
///
/// let report = remove_dead_ends(&mut grid, &mut rng, true, 64);
/// assert!(report.converged);
/// assert_eq!(count_dead_ends(&grid, true), 0);
/// ```
pub fn remove_dead_ends(
    grid: &mut Grid,
    rng: &mut Mulberry32,
    protect_goals: bool,
    max_passes: u32,
) -> DeadEndReport {
    let mut report = DeadEndReport::default();
    let (width, height) = (grid.width() as i32, grid.height() as i32);

    while report.passes < max_passes {
        report.passes += 1;
        let mut changed = 0;

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let pos = Position::new(x, y);
                if !is_dead_end(grid, pos, protect_goals) {
                    continue;
                }
                let walls = breakable_walls(grid, pos);
                if walls.is_empty() {
                    continue;
                }
                let wall = walls[rng.below(walls.len())];
                grid.set_at(wall, CellKind::Path);
                changed += 1;
            }
        }

        report.opened += changed;
        debug!("Dead-end pass {} opened {} walls", report.passes, changed);
        if changed == 0 {
            report.converged = true;
            break;
        }
    }

    report.remaining = count_dead_ends(grid, protect_goals);
    report
}

/// Turns every border wall into path. Returns the number of cells opened.
pub fn open_border_paths(grid: &mut Grid) -> usize {
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let mut opened = 0;
    for y in 0..height {
        for x in 0..width {
            if grid.is_border(x, y) && grid.is_wall(x, y) {
                grid.set(x, y, CellKind::Path);
                opened += 1;
            }
        }
    }
    opened
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{carve_maze, flood_fill};

    fn carved(seed: i32, width: usize, height: usize) -> Grid {
        let mut grid = Grid::new(width, height);
        let mut rng = Mulberry32::new(seed);
        carve_maze(&mut grid, Position::new(1, 1), &mut rng);
        grid
    }

    #[test]
    fn test_dead_end_detection() {
        let grid = Grid::from_ascii(&[
            "#####",
            "#   #",
            "### #",
            "#   #",
            "#####",
        ]);
        assert!(is_dead_end(&grid, Position::new(1, 1), true));
        assert!(is_dead_end(&grid, Position::new(1, 3), true));
        assert!(!is_dead_end(&grid, Position::new(2, 1), true));
        assert!(!is_dead_end(&grid, Position::new(0, 0), true));
        assert_eq!(count_dead_ends(&grid, true), 2);
    }

    #[test]
    fn test_goal_markers_are_protected() {
        let mut grid = Grid::from_ascii(&[
            "#####",
            "#S  #",
            "#####",
        ]);
        assert!(!is_dead_end(&grid, Position::new(1, 1), true));
        assert!(is_dead_end(&grid, Position::new(1, 1), false));
        grid.set(1, 1, CellKind::Path);
        assert!(is_dead_end(&grid, Position::new(1, 1), true));
    }

    #[test]
    fn test_perfect_maze_loses_all_dead_ends() {
        let mut grid = carved(3, 21, 17);
        let before = count_dead_ends(&grid, true);
        assert!(before > 0);

        let mut rng = Mulberry32::new(99);
        let report = remove_dead_ends(&mut grid, &mut rng, true, 64);
        assert!(report.converged);
        assert_eq!(report.remaining, 0);
        assert!(report.opened >= before / 2);

        // Opening walls never disconnects anything or touches the border
        let reachable = flood_fill(&grid, Position::new(1, 1));
        assert_eq!(
            reachable.iter().filter(|&&seen| seen).count(),
            grid.count(CellKind::Path)
        );
        for x in 0..21 {
            assert!(grid.is_wall(x, 0) && grid.is_wall(x, 16));
        }
    }

    #[test]
    fn test_pass_limit_is_respected() {
        let mut grid = carved(8, 31, 31);
        let mut rng = Mulberry32::new(1);
        let report = remove_dead_ends(&mut grid, &mut rng, true, 1);
        assert_eq!(report.passes, 1);
        assert!(!report.converged);
        assert!(report.opened > 0);
    }

    #[test]
    fn test_unbreakable_dead_end_converges() {
        // Nothing behind the walls around the pocket
        let mut grid = Grid::from_ascii(&[
            "#######",
            "#  ####",
            "#######",
        ]);
        let mut rng = Mulberry32::new(1);
        let report = remove_dead_ends(&mut grid, &mut rng, true, 64);
        assert!(report.converged);
        assert_eq!(report.opened, 0);
        assert_eq!(report.remaining, 2);
    }

    #[test]
    fn test_open_border_paths() {
        let mut grid = carved(5, 9, 7);
        let opened = open_border_paths(&mut grid);
        assert_eq!(opened, 2 * 9 + 2 * 5);
        for x in 0..9 {
            assert!(grid.is_open(x, 0) && grid.is_open(x, 6));
        }
        assert_eq!(open_border_paths(&mut grid), 0);
    }
}
