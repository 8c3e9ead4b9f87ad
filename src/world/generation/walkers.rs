//! Carving walkers
//!
//! A walker is a point agent with a heading and a mutation chance. The pool
//! applies the per-step mutation rules that grow, shrink and steer the
//! population.

use serde::{Deserialize, Serialize};

use super::services::RandomSource;
use crate::ecs::Position;

/// Unit cardinal heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Down,
    Left,
    Up,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Down,
        Direction::Left,
        Direction::Up,
        Direction::Right,
    ];

    /// Uniformly random cardinal
    pub fn random<R: RandomSource + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.range(0..Self::ALL.len())]
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, 1),
            Direction::Right => (1, 0),
        }
    }
}

/// A single carving agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Walker {
    pub position: Position,
    pub direction: Direction,
    pub mutation_chance: f32,
}

impl Walker {
    pub fn new(position: Position, direction: Direction, mutation_chance: f32) -> Self {
        Self {
            position,
            direction,
            mutation_chance,
        }
    }

    /// The 2x2 block this walker carves: its own cell and the cells
    /// to the left, below, and diagonally below-left
    pub fn footprint(&self) -> [Position; 4] {
        let Position { x, y } = self.position;
        [
            Position::new(x, y),
            Position::new(x - 1, y),
            Position::new(x, y - 1),
            Position::new(x - 1, y - 1),
        ]
    }

    fn mutates<R: RandomSource + ?Sized>(&self, rng: &mut R) -> bool {
        rng.unit() < self.mutation_chance
    }
}

/// The live walker population, kept in insertion order
#[derive(Debug, Clone)]
pub struct WalkerPool {
    walkers: Vec<Walker>,
    max_walkers: usize,
}

impl WalkerPool {
    /// Seed a pool with a single walker
    pub fn new(seed: Walker, max_walkers: usize) -> Self {
        Self {
            walkers: vec![seed],
            max_walkers: max_walkers.max(1),
        }
    }

    pub fn walkers(&self) -> &[Walker] {
        &self.walkers
    }

    pub(crate) fn len(&self) -> usize {
        self.walkers.len()
    }

    /// Remove at most one walker: the first whose draw lands under its
    /// chance, unless it is the last one alive
    pub fn chance_to_remove<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> bool {
        let count = self.walkers.len();
        for i in 0..count {
            if self.walkers[i].mutates(rng) && self.walkers.len() > 1 {
                self.walkers.remove(i);
                return true;
            }
        }
        false
    }

    /// Give every walker a chance to pick a new heading
    pub fn chance_to_redirect<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut redirected = 0;
        for walker in &mut self.walkers {
            if walker.mutates(rng) {
                walker.direction = Direction::random(rng);
                redirected += 1;
            }
        }
        redirected
    }

    /// Give every pre-existing walker a chance to clone itself in place
    /// with a fresh heading, up to the population cap
    pub fn chance_to_spawn<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> usize {
        let count = self.walkers.len();
        let mut spawned = 0;
        for i in 0..count {
            let parent = self.walkers[i];
            if parent.mutates(rng) && self.walkers.len() < self.max_walkers {
                let direction = Direction::random(rng);
                self.walkers
                    .push(Walker::new(parent.position, direction, parent.mutation_chance));
                spawned += 1;
            }
        }
        spawned
    }

    /// Step every walker along its heading, clamped inside the border ring
    pub fn advance(&mut self, width: i32, height: i32) {
        for walker in &mut self.walkers {
            let (dx, dy) = walker.direction.delta();
            walker.position.x = (walker.position.x + dx).clamp(1, width - 2);
            walker.position.y = (walker.position.y + dy).clamp(1, height - 2);
        }
    }
}
