//! # Room Templates
//!
//! Square room blueprints normalised once and pre-rotated in the four
//! quarter turns, with identical rotations removed.

use crate::{Direction, MazeError, MazeResult};

/// What a template cell asks the stamper to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCode {
    /// Leave the grid alone
    Empty,
    /// Open the cell
    Path,
    /// Close the cell (only when the template is forced)
    Wall,
    /// Open the cell and punch one step out of the room
    Entrance,
}

impl TemplateCode {
    /// Decodes a raw code; anything above 3 is empty.
    pub fn from_code(code: u8) -> TemplateCode {
        match code {
            1 => TemplateCode::Path,
            2 => TemplateCode::Wall,
            3 => TemplateCode::Entrance,
            _ => TemplateCode::Empty,
        }
    }

    /// Decodes a template row character.
    pub fn from_char(ch: char) -> TemplateCode {
        match ch {
            '.' | '1' => TemplateCode::Path,
            '#' | '2' => TemplateCode::Wall,
            'E' | 'e' | '3' => TemplateCode::Entrance,
            _ => TemplateCode::Empty,
        }
    }
}

/// A non-empty cell of a rotation, relative to the rotation's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateCell {
    pub dx: usize,
    pub dy: usize,
    pub code: TemplateCode,
}

/// One orientation of a template, trimmed to its bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRotation {
    pub width: usize,
    pub height: usize,
    /// Non-empty cells sorted row-major
    pub cells: Vec<TemplateCell>,
}

impl TemplateRotation {
    /// Direction an entrance cell punches toward: the footprint edge it sits on.
    pub fn outward(&self, cell: &TemplateCell) -> Option<Direction> {
        if cell.dy == 0 {
            Some(Direction::North)
        } else if cell.dy + 1 == self.height {
            Some(Direction::South)
        } else if cell.dx == 0 {
            Some(Direction::West)
        } else if cell.dx + 1 == self.width {
            Some(Direction::East)
        } else {
            None
        }
    }
}

/// An immutable square room template with its distinct rotations.
///
/// # Examples
///
/// ```
/// use mazeforge::Template;
///
/// let template = Template::from_rows(&["###", "E..", "###"]).unwrap();
/// assert_eq!(template.size(), 3);
/// // Each quarter turn moves the entrance to another side
/// assert_eq!(template.rotations().len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    size: usize,
    codes: Vec<TemplateCode>,
    rotations: Vec<TemplateRotation>,
}

impl Template {
    /// Builds a template from text rows, padding to a square with empty cells.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> MazeResult<Self> {
        let decoded: Vec<Vec<TemplateCode>> = rows
            .iter()
            .map(|row| row.as_ref().chars().map(TemplateCode::from_char).collect())
            .collect();
        Self::from_decoded(decoded)
    }

    /// Builds a template from raw numeric codes (0 empty, 1 path, 2 wall, 3 entrance).
    pub fn from_codes(rows: &[Vec<u8>]) -> MazeResult<Self> {
        let decoded = rows
            .iter()
            .map(|row| row.iter().map(|&code| TemplateCode::from_code(code)).collect())
            .collect();
        Self::from_decoded(decoded)
    }

    fn from_decoded(rows: Vec<Vec<TemplateCode>>) -> MazeResult<Self> {
        let size = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(rows.len());
        let mut codes = vec![TemplateCode::Empty; size * size];
        for (y, row) in rows.iter().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                codes[y * size + x] = code;
            }
        }
        if codes.iter().all(|&code| code == TemplateCode::Empty) {
            return Err(MazeError::InvalidTemplate(
                "template has no non-empty cells".to_string(),
            ));
        }

        let mut rotations: Vec<TemplateRotation> = Vec::with_capacity(4);
        let mut current = codes.clone();
        for _ in 0..4 {
            let rotation = bounding_rotation(&current, size);
            if !rotations.contains(&rotation) {
                rotations.push(rotation);
            }
            current = rotate_clockwise(&current, size);
        }

        Ok(Self {
            size,
            codes,
            rotations,
        })
    }

    /// Side length of the normalised square.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Code at a position of the unrotated template.
    pub fn code(&self, x: usize, y: usize) -> TemplateCode {
        if x < self.size && y < self.size {
            self.codes[y * self.size + x]
        } else {
            TemplateCode::Empty
        }
    }

    /// Distinct orientations, at most four.
    pub fn rotations(&self) -> &[TemplateRotation] {
        &self.rotations
    }
}

fn rotate_clockwise(codes: &[TemplateCode], size: usize) -> Vec<TemplateCode> {
    let mut rotated = vec![TemplateCode::Empty; size * size];
    for y in 0..size {
        for x in 0..size {
            rotated[y * size + x] = codes[(size - 1 - x) * size + y];
        }
    }
    rotated
}

fn bounding_rotation(codes: &[TemplateCode], size: usize) -> TemplateRotation {
    let filled: Vec<(usize, usize, TemplateCode)> = codes
        .iter()
        .enumerate()
        .filter(|(_, &code)| code != TemplateCode::Empty)
        .map(|(idx, &code)| (idx % size, idx / size, code))
        .collect();

    let min_x = filled.iter().map(|c| c.0).min().unwrap_or(0);
    let max_x = filled.iter().map(|c| c.0).max().unwrap_or(0);
    let min_y = filled.iter().map(|c| c.1).min().unwrap_or(0);
    let max_y = filled.iter().map(|c| c.1).max().unwrap_or(0);

    TemplateRotation {
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
        cells: filled
            .into_iter()
            .map(|(x, y, code)| TemplateCell {
                dx: x - min_x,
                dy: y - min_y,
                code,
            })
            .collect(),
    }
}
