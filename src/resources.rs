use rand::Rng;
use serde::Serialize;

use crate::params::ParameterSet;
use crate::terrain::{Cell, TerrainGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Food {
    pub cell: Cell,
}

/// Food items on the map, kept in insertion order so that foraging is first-found.
#[derive(Debug, Clone, Default)]
pub struct ResourcePool {
    items: Vec<Food>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `count` placement attempts at random cells; attempts that land on unwalkable
    /// terrain are dropped rather than retried.
    pub fn seed<R: Rng + ?Sized>(&mut self, terrain: &TerrainGrid, count: u32, rng: &mut R) -> usize {
        let before = self.items.len();
        for _ in 0..count {
            self.try_place_random(terrain, rng);
        }
        self.items.len() - before
    }

    /// One scheduled spawn attempt; returns whether an item was added.
    pub fn maybe_spawn<R: Rng + ?Sized>(
        &mut self,
        terrain: &TerrainGrid,
        params: &ParameterSet,
        rng: &mut R,
    ) -> bool {
        if self.items.len() >= params.max_food as usize {
            return false;
        }
        if rng.gen::<f64>() >= params.food_spawn_chance {
            return false;
        }
        self.try_place_random(terrain, rng)
    }

    fn try_place_random<R: Rng + ?Sized>(&mut self, terrain: &TerrainGrid, rng: &mut R) -> bool {
        let cell = terrain.random_cell(rng);
        if terrain.is_walkable(cell) {
            self.items.push(Food { cell });
            true
        } else {
            false
        }
    }

    /// Operator drop; no terrain check.
    pub fn place(&mut self, cell: Cell) {
        self.items.push(Food { cell });
    }

    /// Removes and returns the first item within `radius` (Chebyshev) of `cell`.
    pub fn take_within(&mut self, cell: Cell, radius: u32) -> Option<Food> {
        let idx = self
            .items
            .iter()
            .position(|food| food.cell.chebyshev(cell) <= radius)?;
        Some(self.items.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Food> {
        self.items.iter()
    }

    pub fn positions(&self) -> Vec<Cell> {
        self.items.iter().map(|food| food.cell).collect()
    }
}
