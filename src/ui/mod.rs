//! User Interface module
//!
//! Terminal viewer for watching levels generate.

pub mod viewer;

pub use viewer::{Viewer, ViewerAction};
