//! Collaborator seams
//!
//! The generator draws randomness, mirrors tiles, rebuilds navigation and
//! spawns entities through these traits so hosts can plug in their own.

use std::ops::Range;

use rand::{Rng, RngCore};

use crate::ecs::{EnemyKind, Position, WorldPosition};
use crate::world::grid::GridState;
use crate::world::tile::Tile;

/// Source of uniform random numbers
pub trait RandomSource {
    /// Uniform float in `[0, 1)`
    fn unit(&mut self) -> f32;

    /// Uniform integer in the half-open `range`
    fn range(&mut self, range: Range<usize>) -> usize;
}

impl<R: RngCore> RandomSource for R {
    fn unit(&mut self) -> f32 {
        self.gen::<f32>()
    }

    fn range(&mut self, range: Range<usize>) -> usize {
        self.gen_range(range)
    }
}

/// Visual tile layer the generator mirrors every write into
pub trait TileRenderer {
    fn set_tile(&mut self, pos: Position, tile: Tile);

    /// What the renderer currently shows at `pos`, if anything
    fn tile_kind(&self, pos: Position) -> Option<Tile>;
}

/// Grid-shaped pathfinding graph rebuilt from final map geometry
pub trait PathfindingGraph {
    fn set_dimensions(&mut self, nodes_x: usize, nodes_y: usize, node_size: f32);

    fn set_center(&mut self, center: WorldPosition);

    /// Full synchronous rebuild against the frozen grid
    fn rescan(&mut self, grid: &GridState);
}

/// Opaque handle to an instantiated entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(pub u64);

/// Creates enemies and places the player
pub trait EntityFactory {
    fn instantiate(&mut self, kind: EnemyKind, at: WorldPosition) -> EntityHandle;

    fn move_player(&mut self, to: WorldPosition);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rng_backed_source_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let u = RandomSource::unit(&mut rng);
            assert!((0.0..1.0).contains(&u));
            assert!(RandomSource::range(&mut rng, 3..9) < 9);
        }
    }
}
