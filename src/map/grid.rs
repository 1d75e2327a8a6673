//! # Grid
//!
//! Flat row-major byte buffer holding [`CellKind`] values.

use crate::{CellKind, Direction, MazeError, MazeResult, Position};

/// A width x height grid of cells stored as bytes, index = y * width + x.
///
/// Coordinates are signed so that neighbour arithmetic never underflows;
/// anything outside the grid reads as `None` from the accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Creates a grid filled with walls.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazeforge::{CellKind, Grid};
    ///
    /// let grid = Grid::new(7, 5);
    /// assert_eq!(grid.cells().len(), 35);
    /// assert_eq!(grid.kind(3, 3), Some(CellKind::Wall));
    /// ```
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, CellKind::Wall)
    }

    /// Creates a grid where every cell has the given kind.
    pub fn filled(width: usize, height: usize, kind: CellKind) -> Self {
        Self {
            width,
            height,
            cells: vec![kind.as_byte(); width * height],
        }
    }

    /// Wraps an existing byte buffer.
    pub fn from_cells(width: usize, height: usize, cells: Vec<u8>) -> MazeResult<Self> {
        let Some(expected) = width.checked_mul(height) else {
            return Err(MazeError::InvalidSnapshot(format!(
                "a {}x{} grid does not fit in memory",
                width, height
            )));
        };
        if cells.len() != expected {
            return Err(MazeError::InvalidSnapshot(format!(
                "expected {} cells for a {}x{} grid, got {}",
                expected,
                width,
                height,
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Parses rows of glyphs as produced by [`Grid::to_ascii`].
    ///
    /// Rows shorter than the widest row are padded with walls.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let kind = match ch {
                    ' ' | '.' => CellKind::Path,
                    'E' => CellKind::Entrance,
                    'X' => CellKind::Exit,
                    'S' => CellKind::Start,
                    'G' => CellKind::End,
                    _ => CellKind::Wall,
                };
                grid.set(x as i32, y as i32, kind);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw row-major cell bytes.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Consumes the grid and returns its byte buffer.
    pub fn into_cells(self) -> Vec<u8> {
        self.cells
    }

    /// Checks whether a coordinate lies inside the grid.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Gets the flat index of a coordinate, if it is in bounds.
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Converts a flat index back into a position.
    pub fn position_of(&self, index: usize) -> Position {
        Position::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Gets the raw byte at a coordinate.
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Gets the decoded cell kind at a coordinate.
    pub fn kind(&self, x: i32, y: i32) -> Option<CellKind> {
        self.get(x, y).map(CellKind::from_byte)
    }

    pub fn kind_at(&self, pos: Position) -> Option<CellKind> {
        self.kind(pos.x, pos.y)
    }

    /// Sets a cell. Returns false (and does nothing) when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, kind: CellKind) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = kind.as_byte();
                true
            }
            None => false,
        }
    }

    pub fn set_at(&mut self, pos: Position, kind: CellKind) -> bool {
        self.set(pos.x, pos.y, kind)
    }

    /// Overwrites every cell.
    pub fn fill(&mut self, kind: CellKind) {
        self.cells.fill(kind.as_byte());
    }

    /// In bounds and not a wall. Unknown bytes decode as walls.
    pub fn is_open(&self, x: i32, y: i32) -> bool {
        self.kind(x, y).is_some_and(CellKind::is_open)
    }

    pub fn is_open_at(&self, pos: Position) -> bool {
        self.is_open(pos.x, pos.y)
    }

    /// In bounds and a wall.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.kind(x, y) == Some(CellKind::Wall)
    }

    /// Whether the coordinate is on the outermost ring of cells.
    pub fn is_border(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y)
            && (x == 0
                || y == 0
                || x as usize == self.width - 1
                || y as usize == self.height - 1)
    }

    /// Whether the coordinate is inside the grid and off the border.
    pub fn is_interior(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && !self.is_border(x, y)
    }

    /// Counts open cardinal neighbours of a cell.
    pub fn open_neighbor_count(&self, x: i32, y: i32) -> usize {
        Direction::ALL
            .iter()
            .filter(|direction| {
                let (dx, dy) = direction.delta();
                self.is_open(x + dx, y + dy)
            })
            .count()
    }

    /// Bitmask of open cardinal neighbours: N=1, E=2, S=4, W=8.
    ///
    /// Rendering adapters use this to pick wall pieces and orientations.
    pub fn open_mask(&self, x: i32, y: i32) -> u8 {
        Direction::ALL.iter().fold(0, |mask, direction| {
            let (dx, dy) = direction.delta();
            if self.is_open(x + dx, y + dy) {
                mask | direction.mask_bit()
            } else {
                mask
            }
        })
    }

    /// Counts cells of the given kind.
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells
            .iter()
            .filter(|&&value| CellKind::from_byte(value) == kind)
            .count()
    }

    /// Lists every position holding the given kind, in row-major order.
    pub fn positions_of(&self, kind: CellKind) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &value)| CellKind::from_byte(value) == kind)
            .map(|(idx, _)| self.position_of(idx))
            .collect()
    }

    /// Renders the grid one glyph per cell, rows separated by newlines.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.cells.chunks(self.width.max(1)) {
            out.extend(row.iter().map(|&value| CellKind::from_byte(value).glyph()));
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(5, 7);
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 7);
        assert_eq!(grid.count(CellKind::Wall), 35);
        assert_eq!(grid.index(4, 6), Some(34));
        assert_eq!(grid.index(5, 0), None);
        assert_eq!(grid.index(-1, 0), None);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new(5, 5);
        assert!(grid.set(2, 3, CellKind::Path));
        assert!(!grid.set(9, 9, CellKind::Path));
        assert_eq!(grid.get(2, 3), Some(0));
        assert!(grid.is_open(2, 3));
        assert!(!grid.is_open(-1, 3));
        assert!(grid.is_wall(1, 1));
        assert_eq!(grid.position_of(17), Position::new(2, 3));
    }

    #[test]
    fn test_border_and_interior() {
        let grid = Grid::new(5, 5);
        assert!(grid.is_border(0, 2));
        assert!(grid.is_border(4, 4));
        assert!(!grid.is_border(2, 2));
        assert!(grid.is_interior(1, 3));
        assert!(!grid.is_interior(5, 3));
    }

    #[test]
    fn test_open_mask() {
        let grid = Grid::from_ascii(&["#####", "## ##", "#   #", "#####"]);
        // Cell (2,2) has north, east and west open
        assert_eq!(grid.open_mask(2, 2), 1 | 2 | 8);
        assert_eq!(grid.open_neighbor_count(2, 2), 3);
        assert_eq!(grid.open_mask(0, 0), 0);
    }

    #[test]
    fn test_ascii_roundtrip() {
        let rows = ["#####", "#E S#", "#GX #", "#####"];
        let grid = Grid::from_ascii(&rows);
        assert_eq!(grid.to_ascii(), rows.join("\n") + "\n");
        assert_eq!(grid.positions_of(CellKind::Start), vec![Position::new(3, 1)]);
    }

    #[test]
    fn test_from_cells_rejects_bad_length() {
        assert!(Grid::from_cells(3, 3, vec![0; 8]).is_err());
        assert!(Grid::from_cells(3, 3, vec![0; 9]).is_ok());
    }

    #[test]
    fn test_from_cells_rejects_overflowing_dimensions() {
        let result = Grid::from_cells(usize::MAX / 2 + 2, 2, vec![0, 0]);
        assert!(matches!(result, Err(MazeError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_unknown_bytes_are_walls() {
        let grid = Grid::from_cells(3, 1, vec![0, 200, 5]).unwrap();
        assert!(grid.is_open(0, 0));
        assert!(!grid.is_open(1, 0));
        assert!(grid.is_wall(1, 0));
        assert!(grid.is_open(2, 0));
        assert_eq!(grid.count(CellKind::Wall), 1);
        assert_eq!(grid.positions_of(CellKind::Wall), vec![Position::new(1, 0)]);
        assert_eq!(grid.open_neighbor_count(0, 0), 0);
    }
}
