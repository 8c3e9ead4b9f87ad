//! Entity Component System module
//!
//! Components attached to the player and to spawned enemies.

pub mod components;

pub use components::*;
