//! # Generation Module
//!
//! Procedural maze generation: carving, room stamping, dead-end removal, goal
//! placement and the endless chunked world.
//!
//! The finite pipeline is driven by [`MapGenerator`]:
//!
//! seed → [`Mulberry32`] → [`carve_maze`] → rooms → [`remove_dead_ends`] →
//! goal placement (double BFS) → finished [`Grid`] plus [`GoalMeta`].
//!
//! [`EndlessMaze`] is an independent entry point that builds self-contained
//! chunks on demand.

pub mod carver;
pub mod endless;
pub mod goals;
pub mod maze;
pub mod pacman;
pub mod rooms;
pub mod template;

pub use carver::*;
pub use endless::*;
pub use goals::*;
pub use maze::*;
pub use pacman::*;
pub use rooms::*;
pub use template::*;

use crate::config::{
    DEFAULT_MAX_BFS_STEPS_TITANIC, DEFAULT_MAX_DEAD_END_PASSES, DEFAULT_TITANIC_SAMPLES,
};
use crate::SeedInput;
use serde::{Deserialize, Serialize};

/// Configuration for finite maze generation.
///
/// Controls border treatment, optional room stamping, dead-end removal and how
/// goals are placed. Every field has a default so partial JSON configs work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Seed input; `None` draws a random seed
    pub seed: Option<SeedInput>,
    /// Force the outer ring to walls after carving
    pub ensure_border_walls: bool,
    /// Extend interior paths onto the border (only without forced border walls)
    pub carve_to_border: bool,
    /// Turn every border wall into path after carving
    pub open_borders: bool,
    /// Rectangular room stamping
    pub rooms: Option<RoomConfig>,
    /// Template room stamping; takes precedence over `rooms`
    pub template: Option<TemplateConfig>,
    /// Dead-end removal
    pub pacman: Option<PacmanConfig>,
    /// Place entrance, exit, start and end right after carving
    pub auto_goals: bool,
    /// Goal placement options
    pub goals: GoalOptions,
}

impl GenerationConfig {
    /// Creates a default configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazeforge::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert!(config.ensure_border_walls);
    /// assert!(config.rooms.is_none());
    /// ```
    pub fn new(seed: impl Into<SeedInput>) -> Self {
        Self {
            seed: Some(seed.into()),
            ..Self::default()
        }
    }

    /// Creates a configuration for testing with small rooms and loops.
    pub fn for_testing(seed: impl Into<SeedInput>) -> Self {
        Self {
            seed: Some(seed.into()),
            rooms: Some(RoomConfig {
                attempts: 3,
                min_size: 3,
                max_size: 5,
            }),
            pacman: Some(PacmanConfig::default()),
            auto_goals: true,
            ..Self::default()
        }
    }

    /// Creates a configuration that forces the sampled goal search.
    pub fn for_titanic(seed: impl Into<SeedInput>) -> Self {
        Self {
            seed: Some(seed.into()),
            goals: GoalOptions {
                titanic: Some(true),
                ..GoalOptions::default()
            },
            ..Self::default()
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            ensure_border_walls: true,
            carve_to_border: false,
            open_borders: false,
            rooms: None,
            template: None,
            pacman: None,
            auto_goals: false,
            goals: GoalOptions::default(),
        }
    }
}

/// Rectangular room stamping parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Number of placement attempts
    pub attempts: u32,
    /// Minimum room side
    pub min_size: usize,
    /// Maximum room side
    pub max_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            attempts: 8,
            min_size: 3,
            max_size: 7,
        }
    }
}

/// Template room stamping parameters.
///
/// Rows use ` ` for empty, `.` for path, `#` for wall and `E` for an entrance
/// marker; digits `0`..`3` are accepted as raw codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Template rows
    pub rows: Vec<String>,
    /// Number of placement attempts
    pub attempts: u32,
    /// Also stamp the template's wall cells
    pub force_template: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_TEMPLATE_ROWS.iter().map(|row| row.to_string()).collect(),
            attempts: 6,
            force_template: false,
        }
    }
}

/// A diamond-shaped hall with an entrance on each side.
pub const DEFAULT_TEMPLATE_ROWS: [&str; 7] = [
    "  #E#  ",
    " ##.## ",
    "##...##",
    "E.....E",
    "##...##",
    " ##.## ",
    "  #E#  ",
];

/// Dead-end removal parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacmanConfig {
    /// Leave goal marker cells alone even when they are dead ends
    pub protect_goals: bool,
    /// Upper bound on full-grid passes
    pub max_passes: u32,
}

impl Default for PacmanConfig {
    fn default() -> Self {
        Self {
            protect_goals: true,
            max_passes: DEFAULT_MAX_DEAD_END_PASSES,
        }
    }
}

/// Goal placement options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalOptions {
    /// Re-force the border to walls before picking entrance and exit
    pub ensure_border_walls: bool,
    /// Write ENTRANCE/EXIT/START/END markers into the grid
    pub mark_cells: bool,
    /// Allow start/end to coincide with entrance/exit cells
    pub allow_same_as_entrance_exit: bool,
    /// Force (Some(true)) or forbid (Some(false)) the sampled search; `None` decides by size
    pub titanic: Option<bool>,
    /// Cell cap for each BFS sweep in titanic mode
    pub max_bfs_steps_titanic: usize,
    /// Number of sampled sweep origins in titanic mode
    pub titanic_samples: usize,
}

impl Default for GoalOptions {
    fn default() -> Self {
        Self {
            ensure_border_walls: true,
            mark_cells: true,
            allow_same_as_entrance_exit: false,
            titanic: None,
            max_bfs_steps_titanic: DEFAULT_MAX_BFS_STEPS_TITANIC,
            titanic_samples: DEFAULT_TITANIC_SAMPLES,
        }
    }
}
