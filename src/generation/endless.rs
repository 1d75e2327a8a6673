//! # Endless Maze
//!
//! An unbounded maze built lazily from square chunks.
//!
//! Chunk origins sit `stride = chunk_size - 1` cells apart, so neighbouring
//! chunks overlap in one border row or column. Both chunks generate that
//! shared border independently; they agree because the door on a shared edge
//! is derived from a hash of the edge itself, keyed by the chunk below or to
//! the right of it. Every cell is therefore a pure function of the seed and
//! its global coordinate, whatever the cache holds.

use crate::config::{DEFAULT_CHUNK_CACHE_LIMIT, DEFAULT_CHUNK_SIZE};
use crate::{
    carve_maze, flood_fill, hash_ints, normalize_dimension, random_odd_cell, spiral_search,
    stamp_rectangular_rooms, stamp_template_rooms, CellKind, Direction, Grid, MazeResult,
    Mulberry32, Position, RoomConfig, Seed, SeedInput, Template, TemplateConfig,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Hash salt for doors on horizontal edges (north/south).
const HORIZONTAL_EDGE: i32 = 1;

/// Hash salt for doors on vertical edges (west/east).
const VERTICAL_EDGE: i32 = 2;

/// Configuration for the endless maze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndlessConfig {
    /// Side of each chunk, normalised to odd and at least 5
    pub chunk_size: usize,
    /// Seed input; `None` draws a random seed
    pub seed: Option<SeedInput>,
    /// Probability that an edge gets no door
    pub no_door_chance: f64,
    /// Give every edge a door regardless of `no_door_chance`
    pub ensure_doors: bool,
    /// Rectangular rooms stamped into each chunk
    pub rooms: Option<RoomConfig>,
    /// Template rooms stamped into each chunk; takes precedence over `rooms`
    pub template: Option<TemplateConfig>,
    /// Probability of opening a wall that separates two open cells
    pub loop_chance: f64,
    /// Maximum cached chunks; `None` keeps every chunk
    pub cache_limit: Option<usize>,
}

impl EndlessConfig {
    /// Creates a default configuration with the given chunk size and seed.
    pub fn new(chunk_size: usize, seed: impl Into<SeedInput>) -> Self {
        Self {
            chunk_size,
            seed: Some(seed.into()),
            ..Self::default()
        }
    }
}

impl Default for EndlessConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            seed: None,
            no_door_chance: 0.25,
            ensure_doors: false,
            rooms: None,
            template: None,
            loop_chance: 0.08,
            cache_limit: Some(DEFAULT_CHUNK_CACHE_LIMIT),
        }
    }
}

/// Integer address of a chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    /// Chunk containing a global cell, plus the cell's offset inside it.
    pub fn locate(x: i32, y: i32, stride: i32) -> (ChunkCoord, Position) {
        (
            ChunkCoord::new(x.div_euclid(stride), y.div_euclid(stride)),
            Position::new(x.rem_euclid(stride), y.rem_euclid(stride)),
        )
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.cx, self.cy)
    }
}

/// Door offsets along each edge of a chunk, `None` where the edge is closed.
///
/// Offsets are odd and lie in `[1, chunk_size - 2]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDoors {
    pub north: Option<i32>,
    pub east: Option<i32>,
    pub south: Option<i32>,
    pub west: Option<i32>,
}

impl ChunkDoors {
    /// Border cell and inward neighbour of every present door.
    pub fn openings(&self, size: usize) -> Vec<(Position, Position)> {
        let last = size as i32 - 1;
        [
            (self.north, Direction::North),
            (self.east, Direction::East),
            (self.south, Direction::South),
            (self.west, Direction::West),
        ]
        .into_iter()
        .filter_map(|(offset, side)| {
            let offset = offset?;
            let border = match side {
                Direction::North => Position::new(offset, 0),
                Direction::South => Position::new(offset, last),
                Direction::West => Position::new(0, offset),
                Direction::East => Position::new(last, offset),
            };
            Some((border, border.step(side.opposite(), 1)))
        })
        .collect()
    }
}

/// One generated chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub grid: Grid,
    pub doors: ChunkDoors,
    /// Open local cell every door connects to: the carve origin, or the
    /// nearest open cell when a forced template wall covered it
    pub anchor: Position,
}

/// Lazily generated, cached infinite maze.
///
/// # Examples
///
/// ```
/// use mazeforge::{EndlessConfig, EndlessMaze};
///
/// let mut a = EndlessMaze::new(EndlessConfig::new(9, 7)).unwrap();
/// let mut b = EndlessMaze::new(EndlessConfig::new(9, 7)).unwrap();
/// assert_eq!(a.get_cell(-20, 13), b.get_cell(-20, 13));
/// ```
#[derive(Debug)]
pub struct EndlessMaze {
    config: EndlessConfig,
    seed: Seed,
    chunk_size: usize,
    template: Option<Template>,
    cache: HashMap<ChunkCoord, Chunk>,
    order: VecDeque<ChunkCoord>,
}

impl EndlessMaze {
    /// Creates an endless maze. Fails only on an unusable room template.
    pub fn new(config: EndlessConfig) -> MazeResult<Self> {
        let seed = Seed::normalize(config.seed.as_ref());
        let template = match &config.template {
            Some(template) => Some(Template::from_rows(&template.rows)?),
            None => None,
        };
        Ok(Self {
            chunk_size: normalize_dimension(config.chunk_size),
            seed,
            template,
            config,
            cache: HashMap::new(),
            order: VecDeque::new(),
        })
    }

    pub fn config(&self) -> &EndlessConfig {
        &self.config
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Distance between neighbouring chunk origins.
    pub fn stride(&self) -> i32 {
        self.chunk_size as i32 - 1
    }

    /// Cell kind at a global coordinate.
    pub fn get_cell(&mut self, x: i32, y: i32) -> CellKind {
        let (coord, local) = ChunkCoord::locate(x, y, self.stride());
        self.chunk(coord.cx, coord.cy)
            .grid
            .kind_at(local)
            .unwrap_or(CellKind::Wall)
    }

    /// Copies a `width` x `height` window with top-left corner `(x0, y0)`.
    pub fn viewport(&mut self, x0: i32, y0: i32, width: usize, height: usize) -> Grid {
        let mut view = Grid::new(width, height);
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                let kind = self.get_cell(x0 + dx, y0 + dy);
                view.set(dx, dy, kind);
            }
        }
        view
    }

    /// Returns the chunk at `(cx, cy)`, generating and caching it if needed.
    pub fn chunk(&mut self, cx: i32, cy: i32) -> &Chunk {
        let coord = ChunkCoord::new(cx, cy);
        if self.cache.contains_key(&coord) {
            self.touch(coord);
        } else {
            let chunk = self.build_chunk(coord);
            self.make_room();
            self.order.push_back(coord);
            self.cache.insert(coord, chunk);
        }
        &self.cache[&coord]
    }

    /// Whether the chunk is currently cached.
    pub fn is_cached(&self, cx: i32, cy: i32) -> bool {
        self.cache.contains_key(&ChunkCoord::new(cx, cy))
    }

    /// Number of chunks in the cache.
    pub fn cached_chunks(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached chunk.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    /// Door layout of a chunk, computed without generating it.
    pub fn doors_for_chunk(&self, cx: i32, cy: i32) -> ChunkDoors {
        ChunkDoors {
            north: self.edge_door(cx, cy, HORIZONTAL_EDGE),
            south: self.edge_door(cx, cy + 1, HORIZONTAL_EDGE),
            west: self.edge_door(cx, cy, VERTICAL_EDGE),
            east: self.edge_door(cx + 1, cy, VERTICAL_EDGE),
        }
    }

    fn edge_door(&self, cx: i32, cy: i32, axis: i32) -> Option<i32> {
        let mut rng = Mulberry32::from_hash(hash_ints(&[self.seed.value, cx, cy, axis]));
        let roll = rng.next_f64();
        if !self.config.ensure_doors && roll < self.config.no_door_chance {
            return None;
        }
        let slots = (self.chunk_size - 1) / 2;
        Some(1 + 2 * rng.below(slots) as i32)
    }

    fn touch(&mut self, coord: ChunkCoord) {
        if self.config.cache_limit.is_none() {
            return;
        }
        if let Some(idx) = self.order.iter().position(|&cached| cached == coord) {
            self.order.remove(idx);
        }
        self.order.push_back(coord);
    }

    /// Evicts least recently used chunks until one more fits.
    fn make_room(&mut self) {
        let Some(limit) = self.config.cache_limit else {
            return;
        };
        while self.cache.len() >= limit.max(1) {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.cache.remove(&oldest);
            debug!("Evicted chunk {}", oldest);
        }
    }

    fn build_chunk(&self, coord: ChunkCoord) -> Chunk {
        let size = self.chunk_size;
        let mut grid = Grid::new(size, size);
        let doors = self.doors_for_chunk(coord.cx, coord.cy);
        let openings = doors.openings(size);
        for &(border, inward) in &openings {
            grid.set_at(border, CellKind::Path);
            grid.set_at(inward, CellKind::Path);
        }

        let mut rng = Mulberry32::from_hash(hash_ints(&[self.seed.value, coord.cx, coord.cy]));
        let carve_origin = random_odd_cell(size, size, &mut rng);
        carve_maze(&mut grid, carve_origin, &mut rng);

        if let (Some(template), Some(template_config)) = (&self.template, &self.config.template) {
            stamp_template_rooms(
                &mut grid,
                template,
                template_config.attempts,
                template_config.force_template,
                &mut rng,
            );
        } else if let Some(rooms) = &self.config.rooms {
            stamp_rectangular_rooms(&mut grid, rooms, &mut rng);
        }

        if self.config.loop_chance > 0.0 {
            add_loops(&mut grid, self.config.loop_chance, &mut rng);
        }
        let anchor = if grid.is_open_at(carve_origin) {
            carve_origin
        } else {
            spiral_search(&grid, carve_origin, &HashSet::new(), true, None).unwrap_or(carve_origin)
        };
        connect_doors(&mut grid, anchor, &openings);

        debug!("Built chunk {} with doors {:?}", coord, doors);
        Chunk {
            coord,
            grid,
            doors,
            anchor,
        }
    }
}

/// Opens interior walls that separate two open cells, each with probability
/// `chance`. Returns the number of walls opened.
pub fn add_loops(grid: &mut Grid, chance: f64, rng: &mut Mulberry32) -> usize {
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let mut opened = 0;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if !grid.is_wall(x, y) {
                continue;
            }
            let vertical = grid.is_open(x, y - 1) && grid.is_open(x, y + 1);
            let horizontal = grid.is_open(x - 1, y) && grid.is_open(x + 1, y);
            if (vertical || horizontal) && rng.chance(chance) {
                grid.set(x, y, CellKind::Path);
                opened += 1;
            }
        }
    }
    opened
}

/// Links every door to the component holding `origin` by opening the
/// shortest run of interior cells from the door's inward cell.
///
/// A door whose search finds nothing is left as it is.
pub fn connect_doors(grid: &mut Grid, origin: Position, openings: &[(Position, Position)]) {
    for &(border, inward) in openings {
        let reachable = flood_fill(grid, origin);
        let Some(inward_idx) = grid.index(inward.x, inward.y) else {
            continue;
        };
        if reachable[inward_idx] {
            continue;
        }

        let route = ::pathfinding::prelude::bfs(
            &inward,
            |&pos: &Position| {
                pos.cardinal_adjacent_positions()
                    .into_iter()
                    .filter(|next| grid.is_interior(next.x, next.y))
                    .collect::<Vec<_>>()
            },
            |pos| grid.index(pos.x, pos.y).is_some_and(|idx| reachable[idx]),
        );
        match route {
            Some(route) => {
                for pos in route {
                    grid.set_at(pos, CellKind::Path);
                }
            }
            None => debug!("Door at {} has nothing to connect to", border),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze(chunk_size: usize, seed: i32) -> EndlessMaze {
        EndlessMaze::new(EndlessConfig::new(chunk_size, seed)).unwrap()
    }

    #[test]
    fn test_locate_uses_floor_division() {
        assert_eq!(
            ChunkCoord::locate(0, 0, 8),
            (ChunkCoord::new(0, 0), Position::new(0, 0))
        );
        assert_eq!(
            ChunkCoord::locate(8, 17, 8),
            (ChunkCoord::new(1, 2), Position::new(0, 1))
        );
        assert_eq!(
            ChunkCoord::locate(-1, -8, 8),
            (ChunkCoord::new(-1, -1), Position::new(7, 0))
        );
        assert_eq!(
            ChunkCoord::locate(-9, 3, 8),
            (ChunkCoord::new(-2, 0), Position::new(7, 3))
        );
    }

    #[test]
    fn test_doors_agree_across_edges() {
        let maze = maze(11, 3);
        for cy in -4..4 {
            for cx in -4..4 {
                let here = maze.doors_for_chunk(cx, cy);
                assert_eq!(here.east, maze.doors_for_chunk(cx + 1, cy).west);
                assert_eq!(here.south, maze.doors_for_chunk(cx, cy + 1).north);
            }
        }
    }

    #[test]
    fn test_door_offsets_are_odd_and_inside() {
        let maze = maze(13, 21);
        for cy in -5..5 {
            for cx in -5..5 {
                let doors = maze.doors_for_chunk(cx, cy);
                for offset in [doors.north, doors.east, doors.south, doors.west]
                    .into_iter()
                    .flatten()
                {
                    assert_eq!(offset % 2, 1);
                    assert!((1..=11).contains(&offset));
                }
            }
        }
    }

    #[test]
    fn test_door_chance_extremes() {
        let mut config = EndlessConfig::new(9, 1);
        config.no_door_chance = 1.0;
        let closed = EndlessMaze::new(config.clone()).unwrap();
        assert_eq!(closed.doors_for_chunk(0, 0), ChunkDoors::default());

        config.ensure_doors = true;
        let open = EndlessMaze::new(config).unwrap();
        let doors = open.doors_for_chunk(0, 0);
        assert!(doors.north.is_some() && doors.east.is_some());
        assert!(doors.south.is_some() && doors.west.is_some());
    }

    #[test]
    fn test_shared_borders_match() {
        let mut maze = maze(9, 11);
        for cx in -2..2 {
            let left = maze.chunk(cx, 0).grid.clone();
            let right = maze.chunk(cx + 1, 0).grid.clone();
            for y in 0..9 {
                assert_eq!(left.get(8, y), right.get(0, y));
            }
            let below = maze.chunk(cx, 1).grid.clone();
            for x in 0..9 {
                assert_eq!(left.get(x, 8), below.get(x, 0));
            }
        }
    }

    #[test]
    fn test_doors_reach_the_carved_maze() {
        let mut config = EndlessConfig::new(15, 4);
        config.ensure_doors = true;
        config.template = Some(TemplateConfig {
            force_template: true,
            ..TemplateConfig::default()
        });
        let mut maze = EndlessMaze::new(config).unwrap();
        for cy in -2..2 {
            for cx in -2..2 {
                let chunk = maze.chunk(cx, cy);
                let reachable = flood_fill(&chunk.grid, chunk.anchor);
                for (border, inward) in chunk.doors.openings(15) {
                    assert!(reachable[chunk.grid.index(border.x, border.y).unwrap()]);
                    assert!(reachable[chunk.grid.index(inward.x, inward.y).unwrap()]);
                }
            }
        }
    }

    #[test]
    fn test_get_cell_independent_of_cache() {
        let mut a = maze(9, 7);
        let mut b = EndlessMaze::new(EndlessConfig {
            cache_limit: Some(1),
            ..EndlessConfig::new(9, 7)
        })
        .unwrap();
        let forward: Vec<CellKind> = (-20..20).map(|x| a.get_cell(x, x / 3)).collect();
        let backward: Vec<CellKind> = (-20..20).rev().map(|x| b.get_cell(x, x / 3)).collect();
        assert!(forward.iter().eq(backward.iter().rev()));
        a.clear_cache();
        assert_eq!(a.cached_chunks(), 0);
        assert_eq!(a.get_cell(5, 5), b.get_cell(5, 5));
    }

    #[test]
    fn test_lru_eviction() {
        let mut maze = EndlessMaze::new(EndlessConfig {
            cache_limit: Some(2),
            ..EndlessConfig::new(9, 2)
        })
        .unwrap();
        maze.chunk(0, 0);
        maze.chunk(1, 0);
        maze.chunk(0, 0);
        maze.chunk(2, 0);
        assert_eq!(maze.cached_chunks(), 2);
        assert!(maze.is_cached(0, 0));
        assert!(!maze.is_cached(1, 0));
        assert!(maze.is_cached(2, 0));
    }

    #[test]
    fn test_unbounded_cache_keeps_everything() {
        let mut maze = EndlessMaze::new(EndlessConfig {
            cache_limit: None,
            ..EndlessConfig::new(7, 2)
        })
        .unwrap();
        for cx in 0..20 {
            maze.chunk(cx, -cx);
        }
        assert_eq!(maze.cached_chunks(), 20);
    }

    #[test]
    fn test_viewport_matches_cells() {
        let mut maze = maze(9, 5);
        let view = maze.viewport(-6, -3, 12, 7);
        assert_eq!((view.width(), view.height()), (12, 7));
        for y in 0..7 {
            for x in 0..12 {
                assert_eq!(view.kind(x, y), Some(maze.get_cell(x - 6, y - 3)));
            }
        }
    }

    #[test]
    fn test_add_loops_only_bridges_open_cells() {
        let mut grid = Grid::from_ascii(&[
            "#######",
            "# # # #",
            "#######",
        ]);
        let mut rng = Mulberry32::new(1);
        assert_eq!(add_loops(&mut grid, 1.0, &mut rng), 2);
        assert!(grid.is_open(2, 1) && grid.is_open(4, 1));
        assert!(grid.is_wall(1, 0));
    }

    #[test]
    fn test_chunk_size_is_normalised() {
        assert_eq!(maze(10, 1).chunk_size(), 11);
        assert_eq!(maze(2, 1).stride(), 4);
    }
}
