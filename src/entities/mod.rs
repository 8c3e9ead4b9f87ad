//! Entity definitions and spawning
//!
//! Backs the generator's entity factory with a hecs world.

pub mod enemies;
pub mod player;

pub use enemies::spawn_enemy;
pub use player::{place_player, spawn_player};

use hecs::{Entity, World};

use crate::ecs::{EnemyKind, Position, Renderable, WorldPosition};
use crate::world::generation::{EntityFactory, EntityHandle};

/// Entity factory that spawns into an owned hecs world
pub struct EcsSpawner {
    world: World,
    player: Entity,
}

impl EcsSpawner {
    /// Create a world holding just the player
    pub fn new() -> Self {
        let mut world = World::new();
        let player = spawn_player(&mut world);
        Self { world, player }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    /// Current grid position of the player
    pub fn player_position(&self) -> Option<Position> {
        self.world.get::<&Position>(self.player).ok().map(|p| *p)
    }

    /// Look up an entity from a handle returned by the factory
    pub fn entity(&self, handle: EntityHandle) -> Option<Entity> {
        Entity::from_bits(handle.0).filter(|e| self.world.contains(*e))
    }

    /// Every drawable entity with its grid position, player last
    pub fn drawables(&self) -> Vec<(Position, Renderable)> {
        let mut out: Vec<(Entity, Position, Renderable)> = self
            .world
            .query::<(&Position, &Renderable)>()
            .iter()
            .map(|(e, (pos, r))| (e, *pos, *r))
            .collect();
        out.sort_by_key(|(e, _, _)| *e == self.player);
        out.into_iter().map(|(_, pos, r)| (pos, r)).collect()
    }

    /// Despawn every enemy, keeping the player, ahead of a regeneration
    pub fn reset(&mut self) {
        let player = self.player;
        let stale: Vec<Entity> = self
            .world
            .iter()
            .map(|e| e.entity())
            .filter(|e| *e != player)
            .collect();
        for entity in stale {
            let _ = self.world.despawn(entity);
        }
        place_player(&mut self.world, player, WorldPosition::default());
    }
}

impl Default for EcsSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityFactory for EcsSpawner {
    fn instantiate(&mut self, kind: EnemyKind, at: WorldPosition) -> EntityHandle {
        let entity = spawn_enemy(&mut self.world, kind, at);
        EntityHandle(entity.to_bits().get())
    }

    fn move_player(&mut self, to: WorldPosition) {
        place_player(&mut self.world, self.player, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Enemy, Name};

    #[test]
    fn test_instantiate_spawns_enemy_components() {
        let mut spawner = EcsSpawner::new();
        let at = Position::new(3, 4).to_world();
        let handle = spawner.instantiate(EnemyKind::Splitter, at);

        let entity = spawner.entity(handle).expect("handle should resolve");
        let world = spawner.world();
        assert_eq!(*world.get::<&Position>(entity).unwrap(), Position::new(3, 4));
        assert_eq!(world.get::<&Enemy>(entity).unwrap().kind, EnemyKind::Splitter);
        assert_eq!(world.get::<&Name>(entity).unwrap().0, "Splitter");
    }

    #[test]
    fn test_move_player_updates_both_coordinates() {
        let mut spawner = EcsSpawner::new();
        assert_eq!(spawner.player_position(), Some(Position::ORIGIN));

        let to = Position::new(5, 2).to_world();
        spawner.move_player(to);
        assert_eq!(spawner.player_position(), Some(Position::new(5, 2)));
        let world_pos = *spawner.world().get::<&WorldPosition>(spawner.player()).unwrap();
        assert_eq!(world_pos, to);
    }

    #[test]
    fn test_reset_keeps_only_player() {
        let mut spawner = EcsSpawner::new();
        spawner.instantiate(EnemyKind::Boss, Position::new(1, 1).to_world());
        spawner.instantiate(EnemyKind::Contact, Position::new(2, 1).to_world());
        assert_eq!(spawner.world().len(), 3);

        spawner.reset();
        assert_eq!(spawner.world().len(), 1);
        assert_eq!(spawner.drawables().len(), 1);
        assert_eq!(spawner.drawables()[0].1.glyph, '@');
    }
}
