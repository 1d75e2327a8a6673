//! # Wall Collision
//!
//! Axis-aligned boxes derived from wall cells, tested against an upright
//! entity approximated by its bounding box.
//!
//! Grid x maps to world x and grid y to world z; world y is up. Colliders
//! are derived data: rebuild them whenever the grid changes.

use crate::{CellKind, Grid, Position};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aabb {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Aabb {
    /// Strict overlap on all three axes; touching faces do not collide.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_z < other.max_z
            && other.min_z < self.max_z
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Box around an upright cylinder standing at `(x, base_y, z)`.
    pub fn around_cylinder(x: f32, z: f32, radius: f32, height: f32, base_y: f32) -> Aabb {
        Aabb {
            min_x: x - radius,
            max_x: x + radius,
            min_z: z - radius,
            max_z: z + radius,
            min_y: base_y,
            max_y: base_y + height,
        }
    }
}

/// How grid cells map into world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderLayout {
    pub cell_size: f32,
    pub wall_height: f32,
    pub origin_x: f32,
    pub origin_z: f32,
    pub base_y: f32,
}

impl Default for ColliderLayout {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            wall_height: 3.0,
            origin_x: 0.0,
            origin_z: 0.0,
            base_y: 0.0,
        }
    }
}

impl ColliderLayout {
    /// World-space centre of a cell on the floor plane.
    pub fn cell_center(&self, pos: Position) -> (f32, f32) {
        (
            self.origin_x + (pos.x as f32 + 0.5) * self.cell_size,
            self.origin_z + (pos.y as f32 + 0.5) * self.cell_size,
        )
    }

    /// Cell containing a world-space point.
    pub fn cell_at(&self, x: f32, z: f32) -> Position {
        Position::new(
            ((x - self.origin_x) / self.cell_size).floor() as i32,
            ((z - self.origin_z) / self.cell_size).floor() as i32,
        )
    }

    /// Full-height box covering one cell.
    pub fn cell_box(&self, pos: Position) -> Aabb {
        let min_x = self.origin_x + pos.x as f32 * self.cell_size;
        let min_z = self.origin_z + pos.y as f32 * self.cell_size;
        Aabb {
            min_x,
            max_x: min_x + self.cell_size,
            min_z,
            max_z: min_z + self.cell_size,
            min_y: self.base_y,
            max_y: self.base_y + self.wall_height,
        }
    }
}

/// One collider per wall cell.
pub fn build_colliders(grid: &Grid, layout: &ColliderLayout) -> Vec<Aabb> {
    grid.positions_of(CellKind::Wall)
        .into_iter()
        .map(|pos| layout.cell_box(pos))
        .collect()
}

/// Whether an upright cylinder overlaps any collider.
///
/// The cylinder is reduced to its bounding box, so corners of the box count
/// as contact.
///
/// # Examples
///
/// ```
/// use mazeforge::{build_colliders, collides_at, ColliderLayout, Grid};
///
/// let grid = Grid::from_ascii(&["###", "# #", "###"]);
/// let colliders = build_colliders(&grid, &ColliderLayout::default());
/// assert!(!collides_at(&colliders, 1.5, 1.5, 0.3, 1.8, 0.0));
/// assert!(collides_at(&colliders, 1.5, 1.5, 0.6, 1.8, 0.0));
/// ```
pub fn collides_at(
    colliders: &[Aabb],
    x: f32,
    z: f32,
    radius: f32,
    height: f32,
    base_y: f32,
) -> bool {
    let body = Aabb::around_cylinder(x, z, radius, height, base_y);
    colliders.iter().any(|collider| collider.overlaps(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hall() -> Grid {
        Grid::from_ascii(&[
            "#####",
            "#   #",
            "#####",
        ])
    }

    #[test]
    fn test_one_collider_per_wall() {
        let grid = hall();
        let colliders = build_colliders(&grid, &ColliderLayout::default());
        assert_eq!(colliders.len(), grid.count(CellKind::Wall));
        assert!(colliders
            .iter()
            .all(|c| c.min_y == 0.0 && c.max_y == 3.0 && c.max_x - c.min_x == 1.0));
    }

    #[test]
    fn test_layout_mapping() {
        let layout = ColliderLayout {
            cell_size: 2.0,
            origin_x: -10.0,
            origin_z: 4.0,
            ..ColliderLayout::default()
        };
        assert_eq!(layout.cell_center(Position::new(1, 2)), (-7.0, 9.0));
        assert_eq!(layout.cell_at(-7.0, 9.0), Position::new(1, 2));
        assert_eq!(layout.cell_at(-10.5, 3.9), Position::new(-1, -1));
    }

    #[test]
    fn test_collision_in_corridor() {
        let colliders = build_colliders(&hall(), &ColliderLayout::default());
        // Centre of the corridor, thin body
        assert!(!collides_at(&colliders, 2.5, 1.5, 0.4, 1.8, 0.0));
        // Wide body reaches the walls above and below
        assert!(collides_at(&colliders, 2.5, 1.5, 0.6, 1.8, 0.0));
        // Hugging the wall exactly is not a collision
        assert!(!collides_at(&colliders, 2.5, 1.5, 0.5, 1.8, 0.0));
    }

    #[test]
    fn test_vertical_axis_matters() {
        let colliders = build_colliders(&hall(), &ColliderLayout::default());
        // Flying over the walls
        assert!(!collides_at(&colliders, 2.5, 1.5, 0.8, 1.0, 3.0));
        assert!(collides_at(&colliders, 2.5, 1.5, 0.8, 1.0, 2.5));
    }
}
