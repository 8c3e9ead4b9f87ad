//! Spawn selection
//!
//! Enemies and the player are placed on cells sampled from the growth floor
//! log. Candidates are checked against the frozen grid, since obstacles may
//! have landed on logged floor after it was carved, and against whatever
//! the renderer shows there.

use serde::Serialize;

use super::growth::FloorLog;
use super::services::{EntityFactory, EntityHandle, RandomSource, TileRenderer};
use crate::ecs::{EnemyKind, Position};
use crate::error::{GenerationError, Result};
use crate::world::grid::GridState;

/// One placed enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub position: Position,
    pub handle: EntityHandle,
}

/// Where everything ended up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnPoints {
    pub player: Option<Position>,
    pub enemies: Vec<EnemySpawn>,
}

/// Spawn-selection counters for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpawnStats {
    pub attempts: usize,
    pub placed: usize,
}

/// Samples spawn cells from the floor log with a retry cap per entity
pub struct SpawnSelector<'a> {
    grid: &'a GridState,
    log: &'a FloorLog,
    renderer: Option<&'a dyn TileRenderer>,
    max_attempts: usize,
    stats: SpawnStats,
}

impl<'a> SpawnSelector<'a> {
    pub fn new(grid: &'a GridState, log: &'a FloorLog, max_attempts: usize) -> Self {
        Self {
            grid,
            log,
            renderer: None,
            max_attempts: max_attempts.max(1),
            stats: SpawnStats::default(),
        }
    }

    /// Also reject cells the renderer shows as anything but floor.
    /// Cells it has no record of are judged by the grid alone.
    pub fn with_renderer(mut self, renderer: &'a dyn TileRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn stats(&self) -> SpawnStats {
        self.stats
    }

    fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        self.log.get(rng.range(0..self.log.len()))
    }

    fn is_valid(&self, pos: Position) -> bool {
        let shown = self
            .renderer
            .and_then(|r| r.tile_kind(pos))
            .map_or(true, |tile| tile.is_walkable());
        self.grid.is_walkable(pos) && shown
    }

    /// Draw an (entity, player) pair until both land on floor
    fn pick_pair<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Option<(Position, Position)> {
        for _ in 0..self.max_attempts {
            self.stats.attempts += 1;
            let entity = self.sample(rng)?;
            let player = self.sample(rng)?;
            if self.is_valid(entity) && self.is_valid(player) {
                return Some((entity, player));
            }
        }
        None
    }

    fn pick_single<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Option<Position> {
        for _ in 0..self.max_attempts {
            self.stats.attempts += 1;
            let pos = self.sample(rng)?;
            if self.is_valid(pos) {
                return Some(pos);
            }
        }
        None
    }

    /// Place every enemy kind in order, moving the player alongside each.
    /// With no enemies configured the player is placed on its own.
    pub fn place_all<R, E>(
        &mut self,
        enemy_types: &[EnemyKind],
        rng: &mut R,
        entities: &mut E,
    ) -> Result<SpawnPoints>
    where
        R: RandomSource + ?Sized,
        E: EntityFactory + ?Sized,
    {
        if self.log.is_empty() {
            return Err(GenerationError::GenerationFailed(
                "no floor was carved to spawn on".into(),
            ));
        }

        let mut points = SpawnPoints::default();

        if enemy_types.is_empty() {
            let player = self.pick_single(rng).ok_or_else(|| self.exhausted("player"))?;
            entities.move_player(player.to_world());
            points.player = Some(player);
            self.stats.placed += 1;
            return Ok(points);
        }

        for &kind in enemy_types {
            let (at, player) = self
                .pick_pair(rng)
                .ok_or_else(|| self.exhausted(kind.name()))?;

            let handle = entities.instantiate(kind, at.to_world());
            entities.move_player(player.to_world());
            log::debug!(
                "Spawned {} at ({}, {}), player at ({}, {})",
                kind.name(),
                at.x,
                at.y,
                player.x,
                player.y
            );

            points.enemies.push(EnemySpawn { kind, position: at, handle });
            points.player = Some(player);
            self.stats.placed += 1;
        }

        Ok(points)
    }

    fn exhausted(&self, what: &str) -> GenerationError {
        log::warn!("Gave up placing {} after {} attempts", what, self.max_attempts);
        GenerationError::GenerationFailed(format!(
            "no valid spawn for {} after {} attempts",
            what, self.max_attempts
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::WorldPosition;
    use crate::render::TileCanvas;
    use crate::world::generation::walkers::tests::Scripted;
    use crate::world::tile::Tile;

    #[derive(Default)]
    struct Recorder {
        enemies: Vec<(EnemyKind, WorldPosition)>,
        player_moves: Vec<WorldPosition>,
    }

    impl EntityFactory for Recorder {
        fn instantiate(&mut self, kind: EnemyKind, at: WorldPosition) -> EntityHandle {
            self.enemies.push((kind, at));
            EntityHandle(self.enemies.len() as u64)
        }

        fn move_player(&mut self, to: WorldPosition) {
            self.player_moves.push(to);
        }
    }

    fn setup() -> (GridState, FloorLog) {
        let mut grid = GridState::new(6, 6).unwrap();
        let mut log = FloorLog::default();
        for pos in [Position::new(1, 1), Position::new(2, 1), Position::new(3, 1)] {
            grid.set_tile(pos, Tile::Floor).unwrap();
            log.push(pos);
        }
        // logged floor later covered by an obstacle
        grid.set_tile(Position::new(2, 1), Tile::Obstacle).unwrap();
        (grid, log)
    }

    #[test]
    fn test_rejects_pairs_touching_obstacles() {
        let (grid, log) = setup();
        let mut selector = SpawnSelector::new(&grid, &log, 10);
        let mut factory = Recorder::default();
        // attempt 1: entity hits the obstacle; attempt 2: both valid
        let mut rng = Scripted::new(&[], &[1, 0, 2, 0]);

        let points = selector
            .place_all(&[EnemyKind::Contact], &mut rng, &mut factory)
            .unwrap();

        assert_eq!(points.enemies.len(), 1);
        assert_eq!(points.enemies[0].position, Position::new(3, 1));
        assert_eq!(points.player, Some(Position::new(1, 1)));
        assert_eq!(selector.stats().attempts, 2);
        assert_eq!(factory.enemies[0].1, Position::new(3, 1).to_world());
        assert_eq!(factory.player_moves, vec![Position::new(1, 1).to_world()]);
    }

    #[test]
    fn test_renderer_read_back_vetoes_cells() {
        let (grid, log) = setup();
        let mut canvas = TileCanvas::new(6, 6);
        canvas.set_tile(Position::new(1, 1), Tile::Floor);
        // the grid still says floor here, the renderer disagrees
        canvas.set_tile(Position::new(3, 1), Tile::Decor);

        let mut selector = SpawnSelector::new(&grid, &log, 10).with_renderer(&canvas);
        let mut factory = Recorder::default();
        // attempt 1: entity on the vetoed cell; attempt 2: both on (1, 1)
        let mut rng = Scripted::new(&[], &[2, 0, 0, 0]);

        let points = selector
            .place_all(&[EnemyKind::Contact], &mut rng, &mut factory)
            .unwrap();

        assert_eq!(selector.stats().attempts, 2);
        assert_eq!(selector.stats().placed, 1);
        assert_eq!(points.enemies[0].position, Position::new(1, 1));
        assert_eq!(points.player, Some(Position::new(1, 1)));
    }

    #[test]
    fn test_player_follows_last_enemy_pair() {
        let (grid, log) = setup();
        let mut selector = SpawnSelector::new(&grid, &log, 10);
        let mut factory = Recorder::default();
        let mut rng = Scripted::new(&[], &[0, 2, 2, 0]);

        let points = selector
            .place_all(&[EnemyKind::Contact, EnemyKind::Ranged], &mut rng, &mut factory)
            .unwrap();

        assert_eq!(factory.player_moves.len(), 2);
        assert_eq!(points.player, Some(Position::new(1, 1)));
        assert_eq!(points.enemies[1].kind, EnemyKind::Ranged);
        assert_eq!(points.enemies[1].handle, EntityHandle(2));
    }

    #[test]
    fn test_retry_cap_fails_generation() {
        let (grid, log) = setup();
        let mut selector = SpawnSelector::new(&grid, &log, 3);
        let mut factory = Recorder::default();
        let mut rng = Scripted::new(&[], &[1, 1, 1, 1, 1, 1]);

        let err = selector
            .place_all(&[EnemyKind::Boss], &mut rng, &mut factory)
            .unwrap_err();
        assert!(matches!(err, GenerationError::GenerationFailed(_)));
        assert!(factory.enemies.is_empty());
    }

    #[test]
    fn test_player_alone_without_enemies() {
        let (grid, log) = setup();
        let mut selector = SpawnSelector::new(&grid, &log, 5);
        let mut factory = Recorder::default();
        let mut rng = Scripted::new(&[], &[1, 2]);

        let points = selector.place_all(&[], &mut rng, &mut factory).unwrap();
        assert_eq!(points.player, Some(Position::new(3, 1)));
        assert!(points.enemies.is_empty());
    }

    #[test]
    fn test_empty_log_fails() {
        let grid = GridState::new(4, 4).unwrap();
        let log = FloorLog::default();
        let mut selector = SpawnSelector::new(&grid, &log, 5);
        let mut factory = Recorder::default();
        let mut rng = Scripted::new(&[], &[]);
        assert!(selector.place_all(&[EnemyKind::Contact], &mut rng, &mut factory).is_err());
    }
}
