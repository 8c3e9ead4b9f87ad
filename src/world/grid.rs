//! Grid state
//!
//! The authoritative 2D tile array. Every pass reads and writes tiles through
//! here, and per-type counts are kept current on each write.

use super::tile::Tile;
use crate::ecs::Position;
use crate::error::{GenerationError, Result};

/// Cell count of a `width` x `height` grid, or `None` if either side is
/// negative or the cell count overflows `i32` indexing
pub fn checked_area(width: i32, height: i32) -> Option<usize> {
    if width < 0 || height < 0 {
        return None;
    }
    width.checked_mul(height).map(|area| area as usize)
}

/// A fixed-size tile grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    counts: [usize; 4],
}

impl GridState {
    /// Create a grid with every cell Empty. Fails when the dimensions are
    /// negative or too large to index.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let area = checked_area(width, height).ok_or_else(|| {
            GenerationError::InvalidConfig(format!("{}x{} grid cannot be indexed", width, height))
        })?;
        let mut counts = [0; 4];
        counts[Tile::Empty.index()] = area;
        Ok(Self {
            width,
            height,
            tiles: vec![Tile::Empty; area],
            counts,
        })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Total number of cells
    #[inline]
    pub fn area(&self) -> usize {
        self.tiles.len()
    }

    /// Convert 2D coordinates to 1D index
    #[inline]
    fn xy_to_idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Whether the position sits on the outermost ring of cells
    pub fn is_border(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0 || pos.y == 0 || pos.x == self.width - 1 || pos.y == self.height - 1)
    }

    fn out_of_bounds(&self, pos: Position) -> GenerationError {
        GenerationError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Get tile at position
    pub fn get_tile(&self, pos: Position) -> Result<Tile> {
        if !self.in_bounds(pos) {
            return Err(self.out_of_bounds(pos));
        }
        Ok(self.tiles[self.xy_to_idx(pos.x, pos.y)])
    }

    /// Overwrite the tile at position, returning what was there before
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> Result<Tile> {
        if !self.in_bounds(pos) {
            return Err(self.out_of_bounds(pos));
        }
        let idx = self.xy_to_idx(pos.x, pos.y);
        let previous = std::mem::replace(&mut self.tiles[idx], tile);
        self.counts[previous.index()] -= 1;
        self.counts[tile.index()] += 1;
        Ok(previous)
    }

    /// Tile lookup that treats out-of-bounds as "no tile"
    pub fn tile_at(&self, pos: Position) -> Option<Tile> {
        self.get_tile(pos).ok()
    }

    /// Check if a position is walkable floor
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile_at(pos).is_some_and(|t| t.is_walkable())
    }

    /// Number of cells currently holding `tile`
    #[inline]
    pub fn count_by_type(&self, tile: Tile) -> usize {
        self.counts[tile.index()]
    }

    /// Every cell except the border ring, row by row
    pub fn interior_positions(&self) -> impl Iterator<Item = Position> {
        let (width, height) = (self.width, self.height);
        (1..height - 1).flat_map(move |y| (1..width - 1).map(move |x| Position::new(x, y)))
    }

    /// Render the grid as text, top row first
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.area() + self.height.max(0) as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(self.tiles[self.xy_to_idx(x, y)].glyph());
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = GridState::new(8, 5).unwrap();
        assert_eq!(grid.area(), 40);
        assert_eq!(grid.count_by_type(Tile::Empty), 40);
        assert_eq!(grid.count_by_type(Tile::Floor), 0);
        assert_eq!(grid.get_tile(Position::new(7, 4)), Ok(Tile::Empty));
    }

    #[test]
    fn test_out_of_bounds_access_fails() {
        let mut grid = GridState::new(4, 4).unwrap();
        let err = grid.get_tile(Position::new(4, 0)).unwrap_err();
        assert_eq!(
            err,
            GenerationError::OutOfBounds { x: 4, y: 0, width: 4, height: 4 }
        );
        assert!(grid.set_tile(Position::new(-1, 2), Tile::Floor).is_err());
        assert_eq!(grid.count_by_type(Tile::Empty), 16);
    }

    #[test]
    fn test_counts_follow_overwrites() {
        let mut grid = GridState::new(4, 4).unwrap();
        let pos = Position::new(1, 1);
        grid.set_tile(pos, Tile::Floor).unwrap();
        grid.set_tile(pos, Tile::Floor).unwrap();
        assert_eq!(grid.count_by_type(Tile::Floor), 1);

        let previous = grid.set_tile(pos, Tile::Obstacle).unwrap();
        assert_eq!(previous, Tile::Floor);
        assert_eq!(grid.count_by_type(Tile::Floor), 0);
        assert_eq!(grid.count_by_type(Tile::Obstacle), 1);
        assert_eq!(grid.count_by_type(Tile::Empty), 15);
    }

    #[test]
    fn test_interior_excludes_border() {
        let grid = GridState::new(5, 4).unwrap();
        let interior: Vec<Position> = grid.interior_positions().collect();
        assert_eq!(interior.len(), 3 * 2);
        assert_eq!(interior[0], Position::new(1, 1));
        assert_eq!(interior[1], Position::new(2, 1));
        assert!(interior.iter().all(|p| !grid.is_border(*p)));
    }

    #[test]
    fn test_new_rejects_unindexable_size() {
        assert!(matches!(
            GridState::new(70_000, 70_000),
            Err(GenerationError::InvalidConfig(_))
        ));
        assert!(GridState::new(-1, 4).is_err());
        assert_eq!(checked_area(70_000, 70_000), None);
        assert_eq!(checked_area(40, 25), Some(1000));
    }
}
