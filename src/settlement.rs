use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::faction::{Faction, FactionTable};
use crate::population::Population;
use crate::terrain::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SettlementId(u64);

impl SettlementId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

pub const MAX_LEVEL: u8 = 3;
const LEVEL_TWO_POPULATION: u32 = 5;
const LEVEL_THREE_POPULATION: u32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub cell: Cell,
    pub faction: Faction,
    pub population: u32,
    pub level: u8,
}

impl Settlement {
    /// Advances at most one level per call. Levels never go down.
    pub fn grow(&mut self) {
        if self.population > LEVEL_TWO_POPULATION && self.level < 2 {
            self.level = 2;
        } else if self.population > LEVEL_THREE_POPULATION && self.level < MAX_LEVEL {
            self.level = MAX_LEVEL;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettlementRegistry {
    next_id: u64,
    settlements: BTreeMap<SettlementId, Settlement>,
}

impl SettlementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found(&mut self, cell: Cell, faction: Faction) -> SettlementId {
        let id = SettlementId(self.next_id);
        self.next_id += 1;
        self.settlements.insert(
            id,
            Settlement {
                id,
                cell,
                faction,
                population: 1,
                level: 1,
            },
        );
        debug!(settlement = id.raw(), %faction, x = cell.x, y = cell.y, "settlement founded");
        id
    }

    /// True if any settlement lies strictly closer than `distance` (planar Euclidean).
    pub fn any_within(&self, cell: Cell, distance: f64) -> bool {
        self.settlements
            .values()
            .any(|settlement| settlement.cell.distance(cell) < distance)
    }

    /// Recounts members from scratch, drops empty settlements and grows the rest.
    /// Returns the ids that were removed.
    pub fn recompute_and_prune(&mut self, population: &Population) -> Vec<SettlementId> {
        let counts: HashMap<SettlementId, u32> = population.affiliation_counts();
        let mut abandoned = Vec::new();
        for (id, settlement) in self.settlements.iter_mut() {
            settlement.population = counts.get(id).copied().unwrap_or(0);
            if settlement.population == 0 {
                abandoned.push(*id);
            } else {
                settlement.grow();
            }
        }
        for id in &abandoned {
            if let Some(settlement) = self.settlements.remove(id) {
                debug!(settlement = id.raw(), faction = %settlement.faction, "settlement abandoned");
            }
        }
        abandoned
    }

    pub fn get(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.values()
    }

    pub fn len(&self) -> usize {
        self.settlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty()
    }

    pub fn counts_by_faction(&self) -> FactionTable<u32> {
        let mut counts = FactionTable::default();
        for settlement in self.settlements.values() {
            *counts.get_mut(settlement.faction) += 1;
        }
        counts
    }
}
