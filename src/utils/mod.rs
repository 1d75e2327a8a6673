//! # Utilities Module
//!
//! Deterministic randomness, hashing math and grid pathfinding shared by the
//! finite and endless generators.

pub mod math;
pub mod pathfinding;
pub mod random;

pub use math::*;
pub use pathfinding::*;
pub use random::*;
