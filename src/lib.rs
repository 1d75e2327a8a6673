//! # Mazeforge
//!
//! Deterministic procedural maze and dungeon generation with graph-aware goal placement.
//!
//! ## Architecture Overview
//!
//! Mazeforge is a pure generation core. It produces byte grids and metadata that
//! rendering, AI and persistence layers consume. The main building blocks are:
//!
//! - **Map Model**: flat row-major byte grid with a closed set of cell kinds
//! - **Generation System**: seeded DFS carving, room stamping, dead-end removal
//!   and double-BFS goal placement driven by [`MapGenerator`]
//! - **Endless System**: [`EndlessMaze`] builds an infinite maze chunk by chunk,
//!   with doors that neighbouring chunks agree on
//! - **World Support**: spawn sampling, axis-aligned collision and snapshots
//!
//! ## Determinism
//!
//! Every random decision flows through [`Mulberry32`] seeded from a normalised
//! [`Seed`], so the same seed and configuration always reproduce the same grid.

pub mod generation;
pub mod map;
pub mod utils;
pub mod world;

// Core module re-exports
pub use generation::*;
pub use map::*;
pub use utils::*;
pub use world::*;

/// Core error type for the Mazeforge generation engine.
#[derive(thiserror::Error, Debug)]
pub enum MazeError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Goal placement was requested before a maze was carved
    #[error("No maze has been generated yet; call generate_maze first")]
    MazeNotGenerated,

    /// A supplied cell lies outside the grid
    #[error("Cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// An entrance or exit was supplied away from the outer border
    #[error("{role} cell ({x}, {y}) must lie on the grid border")]
    NotOnBorder { role: &'static str, x: i32, y: i32 },

    /// Snapshot data does not describe a valid grid
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Room template could not be normalised
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),
}

/// Result type used throughout the Mazeforge codebase.
pub type MazeResult<T> = Result<T, MazeError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation constants shared across modules.
pub mod config {
    /// Smallest grid side the carver accepts
    pub const MIN_DIMENSION: usize = 5;

    /// Default finite maze width in cells
    pub const DEFAULT_MAZE_WIDTH: usize = 41;

    /// Default finite maze height in cells
    pub const DEFAULT_MAZE_HEIGHT: usize = 25;

    /// Grids with at least this many cells use the sampled goal search
    pub const TITANIC_CELL_THRESHOLD: usize = 1_000_000;

    /// Step cap for each BFS sweep in titanic mode
    pub const DEFAULT_MAX_BFS_STEPS_TITANIC: usize = 250_000;

    /// Number of seed cells sampled in titanic mode
    pub const DEFAULT_TITANIC_SAMPLES: usize = 24;

    /// Upper bound on dead-end removal passes
    pub const DEFAULT_MAX_DEAD_END_PASSES: u32 = 64;

    /// Random probes before falling back to a linear scan for an open cell
    pub const RELOCATE_PROBES: usize = 2000;

    /// Above this many cells BFS switches to the sparse engine
    pub const DENSE_BFS_CELL_LIMIT: usize = 16_000_000;

    /// Default side length of an endless maze chunk
    pub const DEFAULT_CHUNK_SIZE: usize = 17;

    /// Default number of cached endless chunks
    pub const DEFAULT_CHUNK_CACHE_LIMIT: usize = 256;

    /// Snapshot schema version written by this crate
    pub const SNAPSHOT_VERSION: u32 = 1;
}
