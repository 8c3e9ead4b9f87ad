//! Player entity creation

use hecs::World;

use crate::ecs::{Name, Player, Position, Renderable, WorldPosition};

/// Spawn the player entity at the grid origin; generation moves it later
pub fn spawn_player(world: &mut World) -> hecs::Entity {
    world.spawn((
        Player,
        Name::new("Hero"),
        Position::ORIGIN,
        WorldPosition::default(),
        Renderable::new('@', (255, 255, 200)),
    ))
}

/// Teleport the player, keeping grid and world coordinates in sync
pub fn place_player(world: &mut World, player: hecs::Entity, to: WorldPosition) {
    if world.insert(player, (to, to.to_cell())).is_err() {
        log::warn!("Player entity {:?} no longer exists", player);
    }
}
