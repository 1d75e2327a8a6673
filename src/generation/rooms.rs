//! # Room Stamping
//!
//! Overlays open rooms onto a carved maze, either as plain rectangles or from
//! a rotated [`Template`].
//!
//! Positions come from a [`LowDiscrepancy`] sequence rather than independent
//! uniform draws, so successive rooms spread across the map instead of piling
//! up. An attempt that cannot fit is skipped; stamping never fails and never
//! writes outside the grid.

use crate::{
    scale_unit, CellKind, Grid, LowDiscrepancy, Mulberry32, Position, RoomConfig, Template,
    TemplateCode,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// The rectangle a stamped room occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomFootprint {
    /// Top-left corner of the room
    pub top_left: Position,
    pub width: usize,
    pub height: usize,
}

impl RoomFootprint {
    pub fn new(top_left: Position, width: usize, height: usize) -> Self {
        Self {
            top_left,
            width,
            height,
        }
    }

    /// Gets the bottom-right corner of the room.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 - 1,
            self.top_left.y + self.height as i32 - 1,
        )
    }

    /// Checks if a position is inside this room.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.top_left.x
            && pos.y >= self.top_left.y
            && pos.x < self.top_left.x + self.width as i32
            && pos.y < self.top_left.y + self.height as i32
    }
}

/// Picks an odd-ish side length in `[min, max]`, clamped to `limit`.
fn pick_room_side(min: usize, max: usize, limit: usize, rng: &mut Mulberry32) -> Option<usize> {
    let max = max.min(limit);
    let min = min.max(1);
    if min > max {
        return None;
    }
    let side = rng.range_inclusive(min, max);
    if side % 2 == 1 {
        Some(side)
    } else if side < max {
        Some(side + 1)
    } else {
        Some(side - 1)
    }
}

/// Maps a unit coordinate to an interior origin for a span of `span` cells.
///
/// The origin is nudged onto an odd coordinate so rooms line up with the
/// carved cell lattice. Returns `None` when the span does not fit.
fn place_origin(unit: f64, span: usize, side: usize) -> Option<i32> {
    if side < 3 || span == 0 || span > side - 2 {
        return None;
    }
    let slots = side - 1 - span;
    let mut origin = 1 + scale_unit(unit, slots) as i32;
    if origin % 2 == 0 {
        origin -= 1;
    }
    Some(origin)
}

/// Stamps `config.attempts` rectangular rooms filled with PATH.
///
/// Overlapping rooms simply merge. Returns the footprints that were stamped.
///
/// # Examples
///
/// ```
/// use mazeforge::{stamp_rectangular_rooms, Grid, Mulberry32, RoomConfig};
///
/// let mut grid = Grid::new(21, 21);
/// let mut rng = Mulberry32::new(3);
/// let rooms = stamp_rectangular_rooms(&mut grid, &RoomConfig::default(), &mut rng);
/// assert!(!rooms.is_empty());
/// ```
pub fn stamp_rectangular_rooms(
    grid: &mut Grid,
    config: &RoomConfig,
    rng: &mut Mulberry32,
) -> Vec<RoomFootprint> {
    let (width, height) = (grid.width(), grid.height());
    let sequence = LowDiscrepancy::new(rng.next_f64(), rng.next_f64());
    let mut rooms = Vec::new();

    for attempt in 0..config.attempts {
        let room_w = pick_room_side(config.min_size, config.max_size, width.saturating_sub(2), rng);
        let room_h = pick_room_side(config.min_size, config.max_size, height.saturating_sub(2), rng);
        let (Some(room_w), Some(room_h)) = (room_w, room_h) else {
            debug!("Room attempt {} skipped: no size fits", attempt);
            continue;
        };

        let (u, v) = sequence.point(attempt);
        let (Some(x0), Some(y0)) = (place_origin(u, room_w, width), place_origin(v, room_h, height))
        else {
            debug!("Room attempt {} skipped: {}x{} does not fit", attempt, room_w, room_h);
            continue;
        };

        for y in y0..y0 + room_h as i32 {
            for x in x0..x0 + room_w as i32 {
                grid.set(x, y, CellKind::Path);
            }
        }
        rooms.push(RoomFootprint::new(Position::new(x0, y0), room_w, room_h));
    }

    rooms
}

/// Stamps rooms from randomly chosen rotations of `template`.
///
/// Path cells open the grid, wall cells close it only when `force_template`
/// is set, and entrance cells open the grid and also punch one cell beyond
/// the footprint edge when that cell is interior.
pub fn stamp_template_rooms(
    grid: &mut Grid,
    template: &Template,
    attempts: u32,
    force_template: bool,
    rng: &mut Mulberry32,
) -> Vec<RoomFootprint> {
    let (width, height) = (grid.width(), grid.height());
    let sequence = LowDiscrepancy::new(rng.next_f64(), rng.next_f64());
    let rotations = template.rotations();
    let mut rooms = Vec::new();
    if rotations.is_empty() {
        return rooms;
    }

    for attempt in 0..attempts {
        let rotation = &rotations[rng.below(rotations.len())];
        let (u, v) = sequence.point(attempt);
        let (Some(x0), Some(y0)) = (
            place_origin(u, rotation.width, width),
            place_origin(v, rotation.height, height),
        ) else {
            debug!(
                "Template attempt {} skipped: {}x{} rotation does not fit",
                attempt, rotation.width, rotation.height
            );
            continue;
        };

        for cell in &rotation.cells {
            let pos = Position::new(x0 + cell.dx as i32, y0 + cell.dy as i32);
            match cell.code {
                TemplateCode::Empty => {}
                TemplateCode::Path => {
                    grid.set_at(pos, CellKind::Path);
                }
                TemplateCode::Wall => {
                    if force_template {
                        grid.set_at(pos, CellKind::Wall);
                    }
                }
                TemplateCode::Entrance => {
                    grid.set_at(pos, CellKind::Path);
                    if let Some(direction) = rotation.outward(cell) {
                        let outside = pos.step(direction, 1);
                        if grid.is_interior(outside.x, outside.y) {
                            grid.set_at(outside, CellKind::Path);
                        }
                    }
                }
            }
        }
        rooms.push(RoomFootprint::new(
            Position::new(x0, y0),
            rotation.width,
            rotation.height,
        ));
    }

    rooms
}
