//! Tile definitions
//!
//! The four classifications a grid cell can hold and how they look.

use serde::{Deserialize, Serialize};

/// Classification of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    /// Uncarved space, the initial state of every cell
    #[default]
    Empty,
    /// Walkable space carved by walkers
    Floor,
    /// Floor promoted to a blocking prop
    Obstacle,
    /// Empty space filled with scenery
    Decor,
}

impl Tile {
    pub const ALL: [Tile; 4] = [Tile::Empty, Tile::Floor, Tile::Obstacle, Tile::Decor];

    /// Dense index used by per-type counters
    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Tile::Empty => 0,
            Tile::Floor => 1,
            Tile::Obstacle => 2,
            Tile::Decor => 3,
        }
    }

    pub fn is_walkable(&self) -> bool {
        matches!(self, Tile::Floor)
    }

    pub fn glyph(&self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Floor => '.',
            Tile::Obstacle => '#',
            Tile::Decor => '"',
        }
    }

    pub fn fg_color(&self) -> (u8, u8, u8) {
        match self {
            Tile::Empty => (20, 20, 20),
            Tile::Floor => (120, 110, 90),
            Tile::Obstacle => (139, 90, 43),
            Tile::Decor => (60, 100, 50),
        }
    }

    pub fn bg_color(&self) -> (u8, u8, u8) {
        match self {
            Tile::Empty => (5, 5, 5),
            Tile::Floor => (30, 26, 20),
            Tile::Obstacle => (40, 30, 20),
            Tile::Decor => (15, 25, 15),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_floor_is_walkable() {
        assert!(Tile::Floor.is_walkable());
        assert!(!Tile::Empty.is_walkable());
        assert!(!Tile::Obstacle.is_walkable());
        assert!(!Tile::Decor.is_walkable());
    }

    #[test]
    fn test_indices_are_dense() {
        for (i, tile) in Tile::ALL.iter().enumerate() {
            assert_eq!(tile.index(), i);
        }
    }
}
