//! Tile canvas
//!
//! In-memory tile layer that mirrors every generator write and draws
//! itself into a ratatui buffer.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
};

use super::RenderMode;
use crate::ecs::Position;
use crate::world::generation::services::TileRenderer;
use crate::world::grid::checked_area;
use crate::world::Tile;

/// Tile layer backing the terminal viewer
#[derive(Debug, Clone)]
pub struct TileCanvas {
    width: i32,
    height: i32,
    tiles: Vec<Option<Tile>>,
    /// Total writes received, for redraw bookkeeping
    writes: u64,
}

impl TileCanvas {
    /// Create a blank canvas. Sizes that cannot be indexed give an empty
    /// canvas that ignores every write.
    pub fn new(width: i32, height: i32) -> Self {
        let Some(area) = checked_area(width, height) else {
            log::warn!("Tile canvas {}x{} cannot be indexed, drawing nothing", width, height);
            return Self {
                width: 0,
                height: 0,
                tiles: Vec::new(),
                writes: 0,
            };
        };
        Self {
            width,
            height,
            tiles: vec![None; area],
            writes: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn idx(&self, pos: Position) -> Option<usize> {
        if pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    /// Drop everything ahead of a regeneration
    pub fn clear(&mut self) {
        self.tiles.iter_mut().for_each(|t| *t = None);
        self.writes = 0;
    }

    /// Get the character representation for a tile
    pub fn tile_char(mode: RenderMode, tile: Tile) -> char {
        match mode {
            RenderMode::Ascii => tile.glyph(),
            RenderMode::Unicode => match tile {
                Tile::Empty => ' ',
                Tile::Floor => '·',
                Tile::Obstacle => '▓',
                Tile::Decor => '♣',
            },
        }
    }

    /// Draw the canvas into `area`, with grid row 0 at the bottom
    pub fn draw(&self, buf: &mut Buffer, area: Rect, mode: RenderMode) {
        draw_layer(self, self.height, buf, area, mode);
    }

    /// Screen cell a grid position lands on inside `area`, if visible
    pub fn screen_cell(&self, area: Rect, pos: Position) -> Option<(u16, u16)> {
        screen_cell(area, self.height, pos)
    }
}

/// Draw any tile layer into `area`. Cells the layer has never seen are
/// left untouched.
pub fn draw_layer(
    layer: &dyn TileRenderer,
    map_height: i32,
    buf: &mut Buffer,
    area: Rect,
    mode: RenderMode,
) {
    for screen_y in 0..area.height {
        for screen_x in 0..area.width {
            let pos = Position::new(screen_x as i32, map_height - 1 - screen_y as i32);
            let Some(tile) = layer.tile_kind(pos) else {
                continue;
            };

            let (fr, fg, fb) = tile.fg_color();
            let (br, bg, bb) = tile.bg_color();
            let cell = &mut buf[(area.x + screen_x, area.y + screen_y)];
            cell.set_char(TileCanvas::tile_char(mode, tile));
            cell.set_fg(Color::Rgb(fr, fg, fb));
            cell.set_bg(Color::Rgb(br, bg, bb));
        }
    }
}

/// Screen cell a grid position lands on inside `area`, flipping rows
pub fn screen_cell(area: Rect, map_height: i32, pos: Position) -> Option<(u16, u16)> {
    let sx = pos.x;
    let sy = map_height - 1 - pos.y;
    if sx < 0 || sy < 0 || sx >= area.width as i32 || sy >= area.height as i32 {
        return None;
    }
    Some((area.x + sx as u16, area.y + sy as u16))
}

impl TileRenderer for TileCanvas {
    fn set_tile(&mut self, pos: Position, tile: Tile) {
        if let Some(idx) = self.idx(pos) {
            self.tiles[idx] = Some(tile);
            self.writes += 1;
        }
    }

    fn tile_kind(&self, pos: Position) -> Option<Tile> {
        self.idx(pos).and_then(|idx| self.tiles[idx])
    }
}
