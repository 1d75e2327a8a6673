//! # World Support
//!
//! Helpers for the layers that consume a finished grid: entity spawn
//! placement, axis-aligned wall collision and JSON world snapshots.

pub mod collision;
pub mod snapshot;
pub mod spawn;

pub use collision::*;
pub use snapshot::*;
pub use spawn::*;
