//! Post-growth sweeps
//!
//! Obstacles are scattered over carved floor, then every untouched cell is
//! filled with decor. Both passes walk the interior row by row and never
//! touch the border ring.

use super::services::{RandomSource, TileRenderer};
use crate::error::Result;
use crate::world::grid::GridState;
use crate::world::tile::Tile;

/// Convert a per-cell probability into "one in n" odds
fn one_in(density: f32) -> Option<usize> {
    if density <= 0.0 {
        return None;
    }
    Some(((1.0 / density).round() as usize).max(1))
}

/// Promote roughly `density` of interior floor cells to obstacles.
/// Returns how many cells were promoted.
pub fn place_obstacles<R, T>(
    grid: &mut GridState,
    density: f32,
    rng: &mut R,
    renderer: &mut T,
) -> Result<usize>
where
    R: RandomSource + ?Sized,
    T: TileRenderer + ?Sized,
{
    let Some(odds) = one_in(density) else {
        return Ok(0);
    };

    let mut placed = 0;
    for pos in grid.interior_positions() {
        if grid.get_tile(pos)? != Tile::Floor {
            continue;
        }
        if rng.range(0..odds) == 0 {
            grid.set_tile(pos, Tile::Obstacle)?;
            renderer.set_tile(pos, Tile::Obstacle);
            placed += 1;
        }
    }

    log::debug!("Placed {} obstacles (1 in {})", placed, odds);
    Ok(placed)
}

/// Fill every interior empty cell with decor.
/// Returns how many cells were filled.
pub fn place_decor<T>(grid: &mut GridState, renderer: &mut T) -> Result<usize>
where
    T: TileRenderer + ?Sized,
{
    let mut placed = 0;
    for pos in grid.interior_positions() {
        if grid.get_tile(pos)? == Tile::Empty {
            grid.set_tile(pos, Tile::Decor)?;
            renderer.set_tile(pos, Tile::Decor);
            placed += 1;
        }
    }

    log::debug!("Placed {} decor tiles", placed);
    Ok(placed)
}
