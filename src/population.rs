//! Agent lifecycle.
//!
//! [`Population`] is an arena keyed by monotonically allocated [`AgentId`]s, so iterating it
//! walks agents in the order they were created. Passes that mutate the population while walking
//! it take a snapshot of ids with [`Population::ids`] first and look each id up again before
//! touching it; an id that is gone by then is skipped.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use serde::Serialize;

use crate::faction::{whole_steps, Faction, FactionTable};
use crate::params::{ParameterSet, FIGHT_BONUS_MAX, NEARBY_RADIUS};
use crate::resources::ResourcePool;
use crate::settlement::{SettlementId, SettlementRegistry};
use crate::terrain::{Cell, TerrainGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AgentId(u64);

impl AgentId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agent {
    pub id: AgentId,
    pub cell: Cell,
    pub faction: Faction,
    pub energy: f64,
    pub age: u32,
    // Captured from the parameter set at spawn; later tuning does not touch them.
    pub max_age: u32,
    pub strength: u32,
    pub speed: f64,
    pub settlement: Option<SettlementId>,
}

impl Agent {
    pub fn steps_per_tick(&self) -> u32 {
        whole_steps(self.speed)
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        if self.energy <= 0.0 {
            Some(DeathCause::Starvation)
        } else if self.age >= self.max_age {
            Some(DeathCause::OldAge)
        } else {
            None
        }
    }

    pub fn in_reproductive_age(&self, params: &ParameterSet) -> bool {
        self.age > params.min_reproduction_age
            && (self.age as f64) < self.max_age as f64 * params.max_reproduction_age_ratio
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Starvation,
    OldAge,
}

/// What happened to one agent during its lifecycle step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentReport {
    pub ate: bool,
    pub offspring: Option<AgentId>,
    pub founded: Option<SettlementId>,
    pub death: Option<DeathCause>,
}

#[derive(Debug, Clone, Default)]
pub struct Population {
    next_id: u64,
    agents: BTreeMap<AgentId, Agent>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an agent with fresh energy and the faction's current stats. Terrain is not
    /// checked here; seeding and operator placement check walkability before calling.
    pub fn spawn(&mut self, params: &ParameterSet, faction: Faction, cell: Cell) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        let stats = params.faction(faction);
        self.agents.insert(
            id,
            Agent {
                id,
                cell,
                faction,
                energy: params.initial_energy,
                age: 0,
                max_age: stats.max_age,
                strength: stats.strength,
                speed: stats.speed,
                settlement: None,
            },
        );
        id
    }

    /// Removes an agent; the returned value no longer carries an affiliation.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let mut agent = self.agents.remove(&id)?;
        agent.settlement = None;
        Some(agent)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Stable copy of the live ids in creation order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agents of `faction` within a Chebyshev box of `radius` around `cell`, the caller included.
    pub fn count_nearby(&self, faction: Faction, cell: Cell, radius: u32) -> u32 {
        self.agents
            .values()
            .filter(|agent| agent.faction == faction && agent.cell.chebyshev(cell) <= radius)
            .count() as u32
    }

    pub fn first_at(&self, cell: Cell) -> Option<AgentId> {
        self.agents
            .values()
            .find(|agent| agent.cell == cell)
            .map(|agent| agent.id)
    }

    pub fn faction_counts(&self) -> FactionTable<u32> {
        let mut counts = FactionTable::default();
        for agent in self.agents.values() {
            *counts.get_mut(agent.faction) += 1;
        }
        counts
    }

    pub fn affiliation_counts(&self) -> HashMap<SettlementId, u32> {
        let mut counts = HashMap::new();
        for settlement in self.agents.values().filter_map(|agent| agent.settlement) {
            *counts.entry(settlement).or_insert(0) += 1;
        }
        counts
    }

    /// Every unordered pair of agents sharing a cell, in creation order.
    pub fn colocated_pairs(&self) -> Vec<(AgentId, AgentId)> {
        let mut by_cell: HashMap<Cell, Vec<AgentId>> = HashMap::new();
        for agent in self.agents.values() {
            by_cell.entry(agent.cell).or_default().push(agent.id);
        }
        let mut pairs = Vec::new();
        for occupants in by_cell.values().filter(|ids| ids.len() > 1) {
            for (i, first) in occupants.iter().enumerate() {
                for second in &occupants[i + 1..] {
                    pairs.push((*first, *second));
                }
            }
        }
        pairs.sort();
        pairs
    }

    /// Random king-move sub-steps with wraparound; blocked sub-steps stay in place. Drains
    /// `energy_loss` and ages the agent by one tick.
    pub fn move_agent<R: Rng + ?Sized>(
        &mut self,
        id: AgentId,
        terrain: &TerrainGrid,
        params: &ParameterSet,
        rng: &mut R,
    ) -> bool {
        let Some(agent) = self.agents.get_mut(&id) else {
            return false;
        };
        for _ in 0..agent.steps_per_tick() {
            let dx = rng.gen_range(-1..=1);
            let dy = rng.gen_range(-1..=1);
            let target = terrain.wrap(agent.cell.offset(dx, dy));
            if terrain.is_walkable(target) {
                agent.cell = target;
            }
        }
        agent.energy -= params.energy_loss;
        agent.age += 1;
        true
    }

    /// Eats the first food item in reach, if any.
    pub fn forage(&mut self, id: AgentId, food: &mut ResourcePool, params: &ParameterSet) -> bool {
        let Some(agent) = self.agents.get_mut(&id) else {
            return false;
        };
        if food.take_within(agent.cell, params.food_search_radius).is_none() {
            return false;
        }
        agent.energy = (agent.energy + params.energy_from_food).min(params.max_energy);
        true
    }

    pub fn try_reproduce<R: Rng + ?Sized>(
        &mut self,
        id: AgentId,
        params: &ParameterSet,
        rng: &mut R,
    ) -> Option<AgentId> {
        let parent = self.agents.get(&id)?;
        if parent.energy < params.reproduction_energy || !parent.in_reproductive_age(params) {
            return None;
        }
        let (faction, cell, settlement) = (parent.faction, parent.cell, parent.settlement);
        if self.count_nearby(faction, cell, NEARBY_RADIUS) >= params.max_nearby_agents {
            return None;
        }
        if rng.gen::<f64>() >= params.reproduction_chance {
            return None;
        }
        if let Some(parent) = self.agents.get_mut(&id) {
            parent.energy -= params.reproduction_cost;
        }
        let child = self.spawn(params, faction, cell);
        if let Some(child) = self.agents.get_mut(&child) {
            child.settlement = settlement;
        }
        Some(child)
    }

    /// Founding conditions only; the per-tick chance is rolled by the caller.
    pub fn try_found_settlement(
        &mut self,
        id: AgentId,
        terrain: &TerrainGrid,
        settlements: &mut SettlementRegistry,
        params: &ParameterSet,
    ) -> Option<SettlementId> {
        let agent = self.agents.get_mut(&id)?;
        if agent.energy < params.village_energy_cost
            || agent.settlement.is_some()
            || !terrain.is_walkable(agent.cell)
            || settlements.any_within(agent.cell, params.village_min_distance)
        {
            return None;
        }
        agent.energy -= params.village_build_cost;
        let settlement = settlements.found(agent.cell, agent.faction);
        agent.settlement = Some(settlement);
        Some(settlement)
    }

    /// Removes the agent if it starved or reached its max age.
    pub fn remove_if_dead(&mut self, id: AgentId) -> Option<DeathCause> {
        let cause = self.agents.get(&id)?.death_cause()?;
        self.remove(id);
        Some(cause)
    }

    /// Advances one agent by a tick: move, forage, reproduce, maybe found a settlement, then
    /// the death check. Returns `None` if the agent is no longer alive.
    pub fn step_agent<R: Rng + ?Sized>(
        &mut self,
        id: AgentId,
        terrain: &TerrainGrid,
        food: &mut ResourcePool,
        settlements: &mut SettlementRegistry,
        params: &ParameterSet,
        rng: &mut R,
    ) -> Option<AgentReport> {
        if !self.move_agent(id, terrain, params, rng) {
            return None;
        }
        let mut report = AgentReport {
            ate: self.forage(id, food, params),
            offspring: self.try_reproduce(id, params, rng),
            ..AgentReport::default()
        };
        if rng.gen::<f64>() < params.village_build_chance {
            report.founded = self.try_found_settlement(id, terrain, settlements, params);
        }
        report.death = self.remove_if_dead(id);
        Some(report)
    }

    /// Settles an encounter between two agents. Same-faction pairs never fight; otherwise a
    /// lethality roll decides whether anyone dies, and the stronger roll wins. Ties spare both.
    /// Returns the agent that was removed.
    pub fn resolve_combat<R: Rng + ?Sized>(
        &mut self,
        a: AgentId,
        b: AgentId,
        params: &ParameterSet,
        rng: &mut R,
    ) -> Option<AgentId> {
        let first = self.agents.get(&a)?;
        let second = self.agents.get(&b)?;
        if first.faction == second.faction {
            return None;
        }
        if rng.gen::<f64>() >= params.fight_death_chance {
            return None;
        }
        let first_power = first.strength.saturating_add(rng.gen_range(0..=FIGHT_BONUS_MAX));
        let second_power = second.strength.saturating_add(rng.gen_range(0..=FIGHT_BONUS_MAX));
        let loser = match first_power.cmp(&second_power) {
            std::cmp::Ordering::Greater => b,
            std::cmp::Ordering::Less => a,
            std::cmp::Ordering::Equal => return None,
        };
        self.remove(loser);
        Some(loser)
    }
}
