//! # Map Module
//!
//! Grid coordinates, cardinal directions and the closed set of cell kinds.
//!
//! Every generator in the crate writes into a [`Grid`], a flat row-major byte
//! buffer whose values are the discriminants of [`CellKind`]. Downstream
//! consumers rely on those byte values staying stable.

pub mod grid;

pub use grid::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D cell coordinate on a grid.
///
/// # Examples
///
/// ```
/// use mazeforge::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.cardinal_adjacent_positions();
/// assert_eq!(adjacent.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazeforge::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// Moves `steps` cells in the given direction.
    pub fn step(self, direction: Direction, steps: i32) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx * steps, self.y + dy * steps)
    }

    /// Returns the 4 cardinal adjacent positions in N, E, S, W order.
    pub fn cardinal_adjacent_positions(self) -> [Position; 4] {
        Direction::ALL.map(|direction| self.step(direction, 1))
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal directions used by carving, BFS and neighbour masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in the fixed N, E, S, W order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Gets the (dx, dy) offset for this direction. North is negative y.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Gets the opposite direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Bit used for this direction in [`Grid::open_mask`].
    pub fn mask_bit(self) -> u8 {
        match self {
            Direction::North => 1,
            Direction::East => 2,
            Direction::South => 4,
            Direction::West => 8,
        }
    }

    /// Converts a unit delta back into a direction.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (1, 0) => Some(Direction::East),
            (0, 1) => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }
}

/// The closed set of values a grid cell may hold.
///
/// The discriminants are the byte values stored in [`Grid`] and written to
/// snapshots; they must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellKind {
    Path = 0,
    Wall = 1,
    Entrance = 2,
    Exit = 3,
    Start = 4,
    End = 5,
}

impl CellKind {
    /// Decodes a stored byte. Unknown values are treated as walls.
    pub fn from_byte(value: u8) -> CellKind {
        match value {
            0 => CellKind::Path,
            2 => CellKind::Entrance,
            3 => CellKind::Exit,
            4 => CellKind::Start,
            5 => CellKind::End,
            _ => CellKind::Wall,
        }
    }

    /// Gets the stored byte value.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Whether entities can stand on this cell.
    pub fn is_open(self) -> bool {
        self != CellKind::Wall
    }

    /// Whether this is one of the four goal markers.
    pub fn is_goal_marker(self) -> bool {
        matches!(
            self,
            CellKind::Entrance | CellKind::Exit | CellKind::Start | CellKind::End
        )
    }

    /// Single-character representation used by [`Grid::to_ascii`].
    pub fn glyph(self) -> char {
        match self {
            CellKind::Path => ' ',
            CellKind::Wall => '#',
            CellKind::Entrance => 'E',
            CellKind::Exit => 'X',
            CellKind::Start => 'S',
            CellKind::End => 'G',
        }
    }
}
