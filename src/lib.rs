//! Walkergen - walker-carved procedural levels
//!
//! A population of random walkers carves connected floor out of an empty
//! grid. Obstacles and decor are swept in afterwards, spawn points are
//! picked and a navigation graph is rebuilt over the result.

pub mod config;
pub mod ecs;
pub mod entities;
pub mod error;
pub mod render;
pub mod ui;
pub mod world;

// Re-export commonly used types
pub use config::{FloorTally, GenerationConfig};
pub use ecs::{EnemyKind, Position, WorldPosition};
pub use error::{ConfigError, GenerationError};
pub use world::generation::{
    generate_level, CancelToken, EntityFactory, EntityHandle, GeneratedMap, GenerationStats,
    LevelGenerator, PathfindingGraph, Phase, RandomSource, SpawnPoints, TileRenderer,
};
pub use world::{GridState, Tile};
