//! # Pathfinding Algorithms
//!
//! Breadth-first search over 4-connected grids, used both for goal placement
//! (double sweeps toward the graph diameter) and for AI navigation.
//!
//! Two farthest-cell engines share one interface:
//!
//! - **Dense**: visited stamps and a flat queue sized to the whole grid. The
//!   buffers live in [`BfsEngine`] and are reused between searches, so repeated
//!   sweeps over the same map allocate nothing.
//! - **Sparse**: a hash set of visited cells and a queue sized to the step cap,
//!   for grids too large to mirror or searches capped far below the grid size.

use crate::config::{DENSE_BFS_CELL_LIMIT, RELOCATE_PROBES};
use crate::{CellKind, Direction, Grid, Mulberry32, Position};
use log::debug;
use std::collections::HashSet;

/// Extra queue slots reserved beyond the step cap in the sparse engine.
const SPARSE_QUEUE_SLACK: usize = 16;

/// Farthest cell reached by a breadth-first search and its hop distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BfsResult {
    pub cell: Position,
    pub dist: u32,
}

/// Which BFS implementation serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BfsStrategy {
    Dense,
    Sparse,
}

impl BfsStrategy {
    /// Picks an engine from the grid size and the optional step cap.
    pub fn select(cell_count: usize, max_steps: Option<usize>) -> BfsStrategy {
        if cell_count > DENSE_BFS_CELL_LIMIT {
            return BfsStrategy::Sparse;
        }
        match max_steps {
            Some(cap) if cap.saturating_mul(8) < cell_count => BfsStrategy::Sparse,
            _ => BfsStrategy::Dense,
        }
    }
}

/// Reusable BFS buffers.
#[derive(Debug, Default)]
pub struct BfsEngine {
    stamps: Vec<u32>,
    stamp: u32,
    queue: Vec<u32>,
    queue_dist: Vec<u32>,
    sparse_visited: HashSet<Position>,
    sparse_queue: Vec<(Position, u32)>,
}

impl BfsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the cell farthest (in BFS hops) from `start`.
    ///
    /// Cells in `avoid` are never entered. A start that is avoided, a wall, or
    /// outside the grid is first relocated to some open, non-avoided cell.
    /// `max_steps` caps the number of cells discovered. Ties at the maximal
    /// depth go to the cell discovered first.
    pub fn farthest(
        &mut self,
        grid: &Grid,
        start: Position,
        avoid: &HashSet<Position>,
        max_steps: Option<usize>,
        rng: &mut Mulberry32,
    ) -> BfsResult {
        let start = if grid.is_open_at(start) && !avoid.contains(&start) {
            start
        } else {
            match relocate_start(grid, avoid, rng) {
                Some(relocated) => {
                    debug!("BFS start {} unusable, relocated to {}", start, relocated);
                    relocated
                }
                None => return BfsResult { cell: start, dist: 0 },
            }
        };

        let cell_count = grid.width() * grid.height();
        match BfsStrategy::select(cell_count, max_steps) {
            BfsStrategy::Dense => self.farthest_dense(grid, start, avoid, max_steps),
            BfsStrategy::Sparse => self.farthest_sparse(grid, start, avoid, max_steps),
        }
    }

    fn next_stamp(&mut self, cell_count: usize) -> u32 {
        if self.stamps.len() != cell_count {
            self.stamps = vec![0; cell_count];
            self.queue = vec![0; cell_count];
            self.queue_dist = vec![0; cell_count];
            self.stamp = 0;
        }
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.stamps.fill(0);
            self.stamp = 1;
        }
        self.stamp
    }

    fn farthest_dense(
        &mut self,
        grid: &Grid,
        start: Position,
        avoid: &HashSet<Position>,
        max_steps: Option<usize>,
    ) -> BfsResult {
        let cell_count = grid.width() * grid.height();
        let stamp = self.next_stamp(cell_count);
        let limit = max_steps.unwrap_or(usize::MAX).max(1);
        let cells = grid.cells();

        let Some(start_idx) = grid.index(start.x, start.y) else {
            return BfsResult { cell: start, dist: 0 };
        };
        self.stamps[start_idx] = stamp;
        self.queue[0] = start_idx as u32;
        self.queue_dist[0] = 0;
        let mut head = 0;
        let mut tail = 1;
        let mut best = BfsResult { cell: start, dist: 0 };

        'search: while head < tail {
            let current = grid.position_of(self.queue[head] as usize);
            let dist = self.queue_dist[head];
            head += 1;

            for direction in Direction::ALL {
                let next = current.step(direction, 1);
                let Some(idx) = grid.index(next.x, next.y) else {
                    continue;
                };
                if self.stamps[idx] == stamp || !CellKind::from_byte(cells[idx]).is_open() {
                    continue;
                }
                if !avoid.is_empty() && avoid.contains(&next) {
                    continue;
                }
                if tail >= limit {
                    break 'search;
                }
                self.stamps[idx] = stamp;
                self.queue[tail] = idx as u32;
                self.queue_dist[tail] = dist + 1;
                tail += 1;
                if dist + 1 > best.dist {
                    best = BfsResult {
                        cell: next,
                        dist: dist + 1,
                    };
                }
            }
        }

        best
    }

    fn farthest_sparse(
        &mut self,
        grid: &Grid,
        start: Position,
        avoid: &HashSet<Position>,
        max_steps: Option<usize>,
    ) -> BfsResult {
        let limit = max_steps.unwrap_or(usize::MAX).max(1);
        self.sparse_visited.clear();
        self.sparse_queue.clear();
        if let Some(cap) = max_steps {
            self.sparse_queue.reserve(cap + SPARSE_QUEUE_SLACK);
        }

        self.sparse_visited.insert(start);
        self.sparse_queue.push((start, 0));
        let mut head = 0;
        let mut best = BfsResult { cell: start, dist: 0 };

        'search: while head < self.sparse_queue.len() {
            let (current, dist) = self.sparse_queue[head];
            head += 1;

            for next in current.cardinal_adjacent_positions() {
                if !grid.is_open_at(next) || self.sparse_visited.contains(&next) {
                    continue;
                }
                if avoid.contains(&next) {
                    continue;
                }
                if self.sparse_queue.len() >= limit {
                    break 'search;
                }
                self.sparse_visited.insert(next);
                self.sparse_queue.push((next, dist + 1));
                if dist + 1 > best.dist {
                    best = BfsResult {
                        cell: next,
                        dist: dist + 1,
                    };
                }
            }
        }

        best
    }
}

/// One-shot farthest-cell search with a throwaway engine.
pub fn bfs_farthest(
    grid: &Grid,
    start: Position,
    avoid: &HashSet<Position>,
    max_steps: Option<usize>,
    rng: &mut Mulberry32,
) -> BfsResult {
    BfsEngine::new().farthest(grid, start, avoid, max_steps, rng)
}

/// Marks every open cell 4-connected to `start`, indexed like the grid.
pub fn flood_fill(grid: &Grid, start: Position) -> Vec<bool> {
    let mut seen = vec![false; grid.cells().len()];
    let Some(start_idx) = grid.index(start.x, start.y) else {
        return seen;
    };
    if !grid.is_open_at(start) {
        return seen;
    }

    seen[start_idx] = true;
    let mut queue = Vec::with_capacity(grid.cells().len());
    queue.push(start);
    let mut head = 0;
    while head < queue.len() {
        let current = queue[head];
        head += 1;
        for next in current.cardinal_adjacent_positions() {
            if let Some(idx) = grid.index(next.x, next.y) {
                if !seen[idx] && grid.is_open_at(next) {
                    seen[idx] = true;
                    queue.push(next);
                }
            }
        }
    }
    seen
}

/// Finds some open, non-avoided cell: random probes first, then a linear scan.
pub fn relocate_start(
    grid: &Grid,
    avoid: &HashSet<Position>,
    rng: &mut Mulberry32,
) -> Option<Position> {
    let usable = |pos: Position| grid.is_open_at(pos) && !avoid.contains(&pos);

    for _ in 0..RELOCATE_PROBES {
        let pos = Position::new(
            rng.below(grid.width()) as i32,
            rng.below(grid.height()) as i32,
        );
        if usable(pos) {
            return Some(pos);
        }
    }

    (0..grid.cells().len())
        .map(|idx| grid.position_of(idx))
        .find(|&pos| usable(pos))
}

/// Searches concentric squares around `center` for the nearest open,
/// non-avoided cell. With `interior_only` the border ring is skipped.
///
/// Rings are scanned top row, bottom row, then left and right columns.
pub fn spiral_search(
    grid: &Grid,
    center: Position,
    avoid: &HashSet<Position>,
    interior_only: bool,
    max_radius: Option<i32>,
) -> Option<Position> {
    let usable = |pos: Position| {
        grid.is_open_at(pos)
            && !avoid.contains(&pos)
            && (!interior_only || grid.is_interior(pos.x, pos.y))
    };
    let max_radius = max_radius.unwrap_or(grid.width().max(grid.height()) as i32);

    if usable(center) {
        return Some(center);
    }
    for r in 1..=max_radius {
        for x in (center.x - r)..=(center.x + r) {
            for y in [center.y - r, center.y + r] {
                let pos = Position::new(x, y);
                if usable(pos) {
                    return Some(pos);
                }
            }
        }
        for y in (center.y - r + 1)..=(center.y + r - 1) {
            for x in [center.x - r, center.x + r] {
                let pos = Position::new(x, y);
                if usable(pos) {
                    return Some(pos);
                }
            }
        }
    }
    None
}

/// Shortest 4-connected path from `from` to `to`, both ends included.
///
/// Cells in `avoid` are not entered, except `to` itself.
pub fn shortest_path(
    grid: &Grid,
    from: Position,
    to: Position,
    avoid: &HashSet<Position>,
) -> Option<Vec<Position>> {
    if !grid.is_open_at(from) || !grid.is_open_at(to) {
        return None;
    }
    ::pathfinding::prelude::bfs(
        &from,
        |&pos: &Position| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|&next| grid.is_open_at(next) && (next == to || !avoid.contains(&next)))
                .collect::<Vec<_>>()
        },
        |&pos| pos == to,
    )
}

/// First step an agent at `from` should take to chase `to`.
///
/// Returns `None` when already there or when no route exists.
pub fn next_step_toward(
    grid: &Grid,
    from: Position,
    to: Position,
    avoid: &HashSet<Position>,
) -> Option<Direction> {
    let path = shortest_path(grid, from, to, avoid)?;
    let next = *path.get(1)?;
    Direction::from_delta(next - from)
}
