//! ECS Components
//!
//! Coordinates shared by the generator and the components attached to
//! spawned entities.

use serde::{Deserialize, Serialize};

use crate::world::nav::CELL_WORLD_SIZE;

// ============================================================================
// Position
// ============================================================================

/// Integer cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World-space point this cell is centered on
    pub fn to_world(self) -> WorldPosition {
        WorldPosition::new(self.x as f32 * CELL_WORLD_SIZE, self.y as f32 * CELL_WORLD_SIZE)
    }
}

/// Continuous world-space coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
}

impl WorldPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Cell whose center is nearest to this point
    pub fn to_cell(self) -> Position {
        Position::new(
            (self.x / CELL_WORLD_SIZE).round() as i32,
            (self.y / CELL_WORLD_SIZE).round() as i32,
        )
    }
}

impl From<Position> for WorldPosition {
    fn from(pos: Position) -> Self {
        pos.to_world()
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Visual representation of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderable {
    /// Character to display
    pub glyph: char,
    /// Foreground color (RGB)
    pub fg: (u8, u8, u8),
}

impl Renderable {
    pub fn new(glyph: char, fg: (u8, u8, u8)) -> Self {
        Self { glyph, fg }
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Marker for the player entity
#[derive(Debug, Clone, Copy, Default)]
pub struct Player;

/// Placeable enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Contact,
    Ranged,
    Splitter,
    Stationary,
    MiniBoss,
    Boss,
}

impl EnemyKind {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Contact => "Slime",
            EnemyKind::Ranged => "Spitter",
            EnemyKind::Splitter => "Splitter",
            EnemyKind::Stationary => "Turret",
            EnemyKind::MiniBoss => "Brute",
            EnemyKind::Boss => "Warden",
        }
    }

    pub fn fg(&self) -> (u8, u8, u8) {
        match self {
            EnemyKind::Contact => (100, 200, 90),
            EnemyKind::Ranged => (200, 160, 60),
            EnemyKind::Splitter => (90, 160, 220),
            EnemyKind::Stationary => (160, 160, 160),
            EnemyKind::MiniBoss => (220, 90, 60),
            EnemyKind::Boss => (200, 40, 120),
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            EnemyKind::Contact => 's',
            EnemyKind::Ranged => 'r',
            EnemyKind::Splitter => 'x',
            EnemyKind::Stationary => 't',
            EnemyKind::MiniBoss => 'B',
            EnemyKind::Boss => 'W',
        }
    }
}

/// Enemy marker carrying its archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enemy {
    pub kind: EnemyKind,
}

/// Display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_world_round_trip() {
        for x in 0..64 {
            for y in 0..64 {
                let pos = Position::new(x, y);
                assert_eq!(pos.to_world().to_cell(), pos);
            }
        }
    }

    #[test]
    fn test_world_to_cell_rounds_to_nearest() {
        assert_eq!(WorldPosition::new(0.07, 0.09).to_cell(), Position::new(0, 1));
        assert_eq!(WorldPosition::new(0.33, 0.0).to_cell(), Position::new(2, 0));
    }
}
