//! World module
//!
//! Grid data, tiles, navigation and procedural generation.

pub mod generation;
pub mod grid;
pub mod nav;
pub mod tile;

pub use generation::{generate_level, GeneratedMap, LevelGenerator, Phase};
pub use grid::GridState;
pub use nav::GridGraph;
pub use tile::Tile;
