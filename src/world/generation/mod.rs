//! Procedural level generation
//!
//! Walkers carve floor until the fill target is met, then obstacles and
//! decor are swept in, spawns are chosen and the nav graph is rebuilt. Each
//! stage finishes before the next one starts.
//!
//! Hosts that want to watch the level grow call [`LevelGenerator::step`]
//! once per frame; everyone else calls [`LevelGenerator::run`] or
//! [`generate_level`].

pub mod growth;
pub mod passes;
pub mod services;
pub mod spawn;
pub mod walkers;

pub use growth::{FloorLog, GrowthScheduler};
pub use services::{EntityFactory, EntityHandle, PathfindingGraph, RandomSource, TileRenderer};
pub use spawn::{EnemySpawn, SpawnPoints, SpawnSelector};
pub use walkers::{Direction, Walker, WalkerPool};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::grid::GridState;
use super::nav;
use super::tile::Tile;
use crate::config::GenerationConfig;
use crate::ecs::WorldPosition;
use crate::error::{GenerationError, Result};

/// Shared flag a host flips to abort generation at the next step boundary
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Pipeline stage a generator is about to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Growing,
    Obstacles,
    Decor,
    Spawning,
    Navigation,
    Complete,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Growing => "Growing",
            Phase::Obstacles => "Obstacles",
            Phase::Decor => "Decor",
            Phase::Spawning => "Spawning",
            Phase::Navigation => "Navigation",
            Phase::Complete => "Complete",
        }
    }
}

/// Summary numbers for a finished (or in-progress) level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub width: i32,
    pub height: i32,
    pub growth_steps: u64,
    pub floor_tally: usize,
    pub floor_cells: usize,
    pub obstacle_cells: usize,
    pub decor_cells: usize,
    pub empty_cells: usize,
    pub peak_walkers: usize,
    pub spawn_attempts: usize,
    pub spawns_placed: usize,
    pub floor_log_len: usize,
}

/// A finished level. The grid is frozen: nothing hands out mutable access.
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    grid: GridState,
    floor_log: FloorLog,
    spawn_points: SpawnPoints,
    stats: GenerationStats,
}

impl GeneratedMap {
    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn floor_log(&self) -> &FloorLog {
        &self.floor_log
    }

    pub fn spawn_points(&self) -> &SpawnPoints {
        &self.spawn_points
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Whether a world position sits on walkable floor
    pub fn check_ground_tile(&self, at: WorldPosition) -> bool {
        self.grid.is_walkable(at.to_cell())
    }
}

/// Collects collaborators before any generation work starts
pub struct LevelGeneratorBuilder<'a> {
    config: GenerationConfig,
    rng: Option<&'a mut dyn RandomSource>,
    renderer: Option<&'a mut dyn TileRenderer>,
    graph: Option<&'a mut dyn PathfindingGraph>,
    entities: Option<&'a mut dyn EntityFactory>,
    cancel: CancelToken,
}

impl<'a> LevelGeneratorBuilder<'a> {
    pub fn random(mut self, rng: &'a mut dyn RandomSource) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn renderer(mut self, renderer: &'a mut dyn TileRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn graph(mut self, graph: &'a mut dyn PathfindingGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn entities(mut self, entities: &'a mut dyn EntityFactory) -> Self {
        self.entities = Some(entities);
        self
    }

    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Validate the config and collaborators, then seed the grid
    pub fn build(self) -> Result<LevelGenerator<'a>> {
        self.config.validate()?;
        let rng = self.rng.ok_or(GenerationError::MissingCollaborator("random source"))?;
        let renderer = self.renderer.ok_or(GenerationError::MissingCollaborator("tile renderer"))?;
        let graph = self.graph.ok_or(GenerationError::MissingCollaborator("pathfinding graph"))?;
        let entities = self.entities.ok_or(GenerationError::MissingCollaborator("entity factory"))?;

        let mut grid = GridState::new(self.config.width, self.config.height)?;
        let growth = GrowthScheduler::seed(&self.config, &mut grid, &mut *rng, &mut *renderer)?;

        log::info!(
            "Generating {}x{} level: fill {:.2}, up to {} walkers, {} enemies",
            self.config.width,
            self.config.height,
            self.config.fill_percentage,
            self.config.max_walkers,
            self.config.enemy_types.len()
        );

        Ok(LevelGenerator {
            config: self.config,
            grid,
            growth,
            phase: Phase::Growing,
            stats: GenerationStats::default(),
            spawn_points: SpawnPoints::default(),
            rng,
            renderer,
            graph,
            entities,
            cancel: self.cancel,
        })
    }
}

/// Step-driven level generation pipeline
pub struct LevelGenerator<'a> {
    config: GenerationConfig,
    grid: GridState,
    growth: GrowthScheduler,
    phase: Phase,
    stats: GenerationStats,
    spawn_points: SpawnPoints,
    rng: &'a mut dyn RandomSource,
    renderer: &'a mut dyn TileRenderer,
    graph: &'a mut dyn PathfindingGraph,
    entities: &'a mut dyn EntityFactory,
    cancel: CancelToken,
}

impl<'a> LevelGenerator<'a> {
    pub fn builder(config: GenerationConfig) -> LevelGeneratorBuilder<'a> {
        LevelGeneratorBuilder {
            config,
            rng: None,
            renderer: None,
            graph: None,
            entities: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn walkers(&self) -> &[Walker] {
        self.growth.walkers()
    }

    pub fn growth(&self) -> &GrowthScheduler {
        &self.growth
    }

    pub fn renderer(&self) -> &dyn TileRenderer {
        &*self.renderer
    }

    pub fn spawn_points(&self) -> &SpawnPoints {
        &self.spawn_points
    }

    /// Stats as of the current step
    pub fn stats(&self) -> GenerationStats {
        GenerationStats {
            width: self.grid.width(),
            height: self.grid.height(),
            growth_steps: self.growth.steps(),
            floor_tally: self.growth.tally(),
            floor_cells: self.grid.count_by_type(Tile::Floor),
            obstacle_cells: self.grid.count_by_type(Tile::Obstacle),
            decor_cells: self.grid.count_by_type(Tile::Decor),
            empty_cells: self.grid.count_by_type(Tile::Empty),
            peak_walkers: self.growth.peak_walkers(),
            floor_log_len: self.growth.floor_log().len(),
            ..self.stats.clone()
        }
    }

    /// Advance the pipeline by one unit of work: a single growth step while
    /// growing, otherwise one whole stage
    pub fn step(&mut self) -> Result<Phase> {
        if self.cancel.is_cancelled() {
            log::info!("Generation cancelled during {}", self.phase.name());
            return Err(GenerationError::Cancelled);
        }

        match self.phase {
            Phase::Growing => {
                if self.growth.is_filled(&self.grid) {
                    self.growth.clear_origin(&mut self.grid, &mut *self.renderer)?;
                    log::info!(
                        "Growth finished after {} steps (tally {}/{})",
                        self.growth.steps(),
                        self.growth.tally(),
                        self.grid.area()
                    );
                    self.phase = Phase::Obstacles;
                } else {
                    self.growth.step(&mut self.grid, &mut *self.rng, &mut *self.renderer)?;
                }
            }
            Phase::Obstacles => {
                let placed = passes::place_obstacles(
                    &mut self.grid,
                    self.config.obstacle_density,
                    &mut *self.rng,
                    &mut *self.renderer,
                )?;
                log::info!("Obstacle pass placed {}", placed);
                self.phase = Phase::Decor;
            }
            Phase::Decor => {
                let placed = passes::place_decor(&mut self.grid, &mut *self.renderer)?;
                self.growth.add_to_tally(placed);
                log::info!("Decor pass placed {}", placed);
                self.phase = Phase::Spawning;
            }
            Phase::Spawning => {
                let mut selector = SpawnSelector::new(
                    &self.grid,
                    self.growth.floor_log(),
                    self.config.max_spawn_attempts,
                )
                .with_renderer(&*self.renderer);
                let result = selector.place_all(
                    &self.config.enemy_types,
                    &mut *self.rng,
                    &mut *self.entities,
                );
                let spawn_stats = selector.stats();
                self.stats.spawn_attempts = spawn_stats.attempts;
                self.stats.spawns_placed = spawn_stats.placed;
                self.spawn_points = result?;
                log::info!(
                    "Placed {} enemies in {} attempts",
                    self.spawn_points.enemies.len(),
                    self.stats.spawn_attempts
                );
                self.phase = Phase::Navigation;
            }
            Phase::Navigation => {
                nav::rebuild(&mut *self.graph, &self.grid);
                self.phase = Phase::Complete;
            }
            Phase::Complete => {}
        }

        Ok(self.phase)
    }

    /// Step until complete and hand back the frozen map
    pub fn run(mut self) -> Result<GeneratedMap> {
        while !self.is_complete() {
            self.step()?;
        }
        Ok(self.finish())
    }

    /// Consume a completed generator. Call only once [`Self::is_complete`]
    /// is true; an unfinished pipeline yields a partial map.
    pub fn finish(self) -> GeneratedMap {
        let stats = self.stats();
        log::info!(
            "Level complete: {} floor, {} obstacles, {} decor",
            stats.floor_cells,
            stats.obstacle_cells,
            stats.decor_cells
        );
        GeneratedMap {
            grid: self.grid,
            floor_log: self.growth.into_floor_log(),
            spawn_points: self.spawn_points,
            stats,
        }
    }
}

/// Generate a complete level synchronously
pub fn generate_level(
    config: GenerationConfig,
    rng: &mut dyn RandomSource,
    renderer: &mut dyn TileRenderer,
    graph: &mut dyn PathfindingGraph,
    entities: &mut dyn EntityFactory,
) -> Result<GeneratedMap> {
    LevelGenerator::builder(config)
        .random(rng)
        .renderer(renderer)
        .graph(graph)
        .entities(entities)
        .build()?
        .run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{EnemyKind, Position};
    use crate::entities::EcsSpawner;
    use crate::render::TileCanvas;
    use crate::world::nav::GridGraph;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> GenerationConfig {
        GenerationConfig {
            width: 10,
            height: 10,
            fill_percentage: 0.3,
            max_walkers: 5,
            enemy_types: vec![EnemyKind::Contact, EnemyKind::Ranged],
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn test_missing_collaborator_reported_before_work() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut canvas = TileCanvas::new(10, 10);
        let mut spawner = EcsSpawner::new();

        let result = LevelGenerator::builder(small_config())
            .random(&mut rng)
            .renderer(&mut canvas)
            .entities(&mut spawner)
            .build();

        assert!(matches!(
            result.err(),
            Some(GenerationError::MissingCollaborator("pathfinding graph"))
        ));
        assert_eq!(canvas.writes(), 0);
    }

    #[test]
    fn test_invalid_config_rejected_by_builder() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut canvas = TileCanvas::new(10, 10);
        let mut graph = GridGraph::new();
        let mut spawner = EcsSpawner::new();
        let config = GenerationConfig {
            fill_percentage: 1.0,
            ..small_config()
        };

        let result = generate_level(config, &mut rng, &mut canvas, &mut graph, &mut spawner);
        assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
    }

    #[test]
    fn test_stages_run_in_order() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut canvas = TileCanvas::new(10, 10);
        let mut graph = GridGraph::new();
        let mut spawner = EcsSpawner::new();

        let mut generator = LevelGenerator::builder(small_config())
            .random(&mut rng)
            .renderer(&mut canvas)
            .graph(&mut graph)
            .entities(&mut spawner)
            .build()
            .unwrap();

        let mut seen = vec![generator.phase()];
        while !generator.is_complete() {
            let phase = generator.step().unwrap();
            if seen.last() != Some(&phase) {
                seen.push(phase);
            }
            assert!(generator.walkers().len() <= 5);
        }

        assert_eq!(
            seen,
            vec![
                Phase::Growing,
                Phase::Obstacles,
                Phase::Decor,
                Phase::Spawning,
                Phase::Navigation,
                Phase::Complete
            ]
        );
    }

    #[test]
    fn test_cancel_stops_at_next_step() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut canvas = TileCanvas::new(10, 10);
        let mut graph = GridGraph::new();
        let mut spawner = EcsSpawner::new();
        let cancel = CancelToken::new();

        let mut generator = LevelGenerator::builder(small_config())
            .random(&mut rng)
            .renderer(&mut canvas)
            .graph(&mut graph)
            .entities(&mut spawner)
            .cancel_token(cancel.clone())
            .build()
            .unwrap();

        generator.step().unwrap();
        cancel.cancel();
        assert_eq!(generator.step(), Err(GenerationError::Cancelled));
    }

    #[test]
    fn test_generated_map_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeneratedMap>();
    }

    #[test]
    fn test_renderer_mirrors_grid() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut canvas = TileCanvas::new(10, 10);
        let mut graph = GridGraph::new();
        let mut spawner = EcsSpawner::new();

        let map = generate_level(small_config(), &mut rng, &mut canvas, &mut graph, &mut spawner)
            .unwrap();

        for y in 0..10 {
            for x in 0..10 {
                let pos = Position::new(x, y);
                let tile = map.grid().get_tile(pos).unwrap();
                let shown = canvas.tile_kind(pos).unwrap_or(Tile::Empty);
                assert_eq!(shown, tile, "mismatch at {:?}", pos);
            }
        }
    }
}
