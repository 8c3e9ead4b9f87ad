//! Enemy entity creation

use hecs::{Entity, World};

use crate::ecs::{Enemy, EnemyKind, Name, Renderable, WorldPosition};

/// Spawn an enemy of `kind` centered on the cell under `at`
pub fn spawn_enemy(world: &mut World, kind: EnemyKind, at: WorldPosition) -> Entity {
    world.spawn((
        Name::new(kind.name()),
        at.to_cell(),
        at,
        Renderable::new(kind.glyph(), kind.fg()),
        Enemy { kind },
    ))
}
