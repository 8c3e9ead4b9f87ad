//! Growth scheduler
//!
//! Runs the walker pool against the grid one discrete step at a time until
//! the floor tally reaches the configured fill ratio.

use super::services::{RandomSource, TileRenderer};
use super::walkers::{Direction, Walker, WalkerPool};
use crate::config::{FloorTally, GenerationConfig, LEGACY_CARVE_TALLY};
use crate::ecs::Position;
use crate::error::{GenerationError, Result};
use crate::world::grid::GridState;
use crate::world::tile::Tile;

/// How often progress is logged, in steps
const PROGRESS_LOG_INTERVAL: u64 = 1000;

/// Append-only record of every coordinate written as Floor during growth
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloorLog {
    entries: Vec<Position>,
}

impl FloorLog {
    pub fn push(&mut self, pos: Position) {
        self.entries.push(pos);
    }

    pub fn get(&self, idx: usize) -> Option<Position> {
        self.entries.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.entries.iter().copied()
    }
}

/// Drives walker growth and owns the fill tally
#[derive(Debug, Clone)]
pub struct GrowthScheduler {
    pool: WalkerPool,
    floor_log: FloorLog,
    tally: usize,
    steps: u64,
    peak_walkers: usize,
    fill_percentage: f32,
    tally_mode: FloorTally,
    max_steps: u64,
}

impl GrowthScheduler {
    /// Seed the origin as floor and place the first walker on it
    pub fn seed<R, T>(
        config: &GenerationConfig,
        grid: &mut GridState,
        rng: &mut R,
        renderer: &mut T,
    ) -> Result<Self>
    where
        R: RandomSource + ?Sized,
        T: TileRenderer + ?Sized,
    {
        let walker = Walker::new(Position::ORIGIN, Direction::random(rng), config.mutation_chance);
        grid.set_tile(Position::ORIGIN, Tile::Floor)?;
        renderer.set_tile(Position::ORIGIN, Tile::Floor);

        Ok(Self {
            pool: WalkerPool::new(walker, config.max_walkers),
            floor_log: FloorLog::default(),
            tally: 1,
            steps: 0,
            peak_walkers: 1,
            fill_percentage: config.fill_percentage,
            tally_mode: config.floor_tally,
            max_steps: config.max_growth_steps,
        })
    }

    pub fn walkers(&self) -> &[Walker] {
        self.pool.walkers()
    }

    pub fn floor_log(&self) -> &FloorLog {
        &self.floor_log
    }

    pub fn into_floor_log(self) -> FloorLog {
        self.floor_log
    }

    pub fn tally(&self) -> usize {
        self.tally
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn peak_walkers(&self) -> usize {
        self.peak_walkers
    }

    /// Whether the tally has reached the fill target for this grid
    pub fn is_filled(&self, grid: &GridState) -> bool {
        self.tally as f32 / grid.area() as f32 >= self.fill_percentage
    }

    /// Run one carve / remove / redirect / spawn / advance cycle
    pub fn step<R, T>(&mut self, grid: &mut GridState, rng: &mut R, renderer: &mut T) -> Result<()>
    where
        R: RandomSource + ?Sized,
        T: TileRenderer + ?Sized,
    {
        if self.steps >= self.max_steps {
            log::warn!(
                "Growth stalled at tally {}/{} after {} steps",
                self.tally,
                grid.area(),
                self.steps
            );
            return Err(GenerationError::GenerationTimedOut { steps: self.steps });
        }

        self.carve(grid, renderer)?;
        self.pool.chance_to_remove(rng);
        self.pool.chance_to_redirect(rng);
        self.pool.chance_to_spawn(rng);
        self.peak_walkers = self.peak_walkers.max(self.pool.len());
        self.pool.advance(grid.width(), grid.height());

        self.steps += 1;
        if self.steps % PROGRESS_LOG_INTERVAL == 0 {
            log::debug!(
                "Growth step {}: tally {}, {} walkers",
                self.steps,
                self.tally,
                self.pool.len()
            );
        }
        Ok(())
    }

    fn carve<T>(&mut self, grid: &mut GridState, renderer: &mut T) -> Result<()>
    where
        T: TileRenderer + ?Sized,
    {
        for walker in self.pool.walkers() {
            if grid.get_tile(walker.position)? == Tile::Floor {
                continue;
            }

            let mut fresh = 0;
            for cell in walker.footprint() {
                if !grid.in_bounds(cell) {
                    continue;
                }
                if grid.set_tile(cell, Tile::Floor)? != Tile::Floor {
                    fresh += 1;
                }
                renderer.set_tile(cell, Tile::Floor);
                self.floor_log.push(cell);
            }

            self.tally += match self.tally_mode {
                FloorTally::Legacy => LEGACY_CARVE_TALLY,
                FloorTally::Exact => fresh,
            };
        }
        Ok(())
    }

    /// Re-open the seed cell once growth is done
    pub fn clear_origin<T>(&mut self, grid: &mut GridState, renderer: &mut T) -> Result<()>
    where
        T: TileRenderer + ?Sized,
    {
        grid.set_tile(Position::ORIGIN, Tile::Empty)?;
        renderer.set_tile(Position::ORIGIN, Tile::Empty);
        self.tally = self.tally.saturating_sub(1);
        Ok(())
    }

    /// Count a cell filled in after growth toward the tally
    pub(crate) fn add_to_tally(&mut self, n: usize) {
        self.tally += n;
    }
}
