//! Rendering
//!
//! An in-memory tile layer the generator mirrors into, and the glyph sets
//! used to draw it in the terminal.

pub mod mode;
pub mod tilemap;

pub use mode::{RenderMode, detect_render_mode};
pub use tilemap::{draw_layer, screen_cell, TileCanvas};
