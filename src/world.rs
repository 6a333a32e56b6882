use serde::Serialize;

use crate::faction::Faction;
use crate::params::ParameterSet;
use crate::population::{AgentId, Population};
use crate::resources::ResourcePool;
use crate::settlement::SettlementRegistry;
use crate::terrain::{Cell, Terrain, TerrainGrid};

#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub faction: Faction,
    pub energy: f64,
    pub age: u32,
    pub strength: u32,
    pub speed: f64,
    pub settlement: Option<u64>,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct SettlementView {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub faction: Faction,
    pub level: u8,
    pub population: u32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactionCount {
    pub faction: Faction,
    pub agents: u32,
    pub settlements: u32,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub paused: bool,
    pub width: u32,
    pub height: u32,
    pub terrain: Vec<Terrain>,
    pub agents: Vec<AgentView>,
    pub food: Vec<Cell>,
    pub settlements: Vec<SettlementView>,
    pub factions: Vec<FactionCount>,
    pub total_agents: usize,
    pub total_settlements: usize,
    pub total_food: usize,
}

impl WorldSnapshot {
    pub fn faction(&self, faction: Faction) -> Option<&FactionCount> {
        self.factions.iter().find(|count| count.faction == faction)
    }
}

/// The authoritative simulation state.
#[derive(Debug, Clone)]
pub struct World {
    tick: u64,
    pub(crate) terrain: TerrainGrid,
    pub(crate) population: Population,
    pub(crate) food: ResourcePool,
    pub(crate) settlements: SettlementRegistry,
}

impl World {
    pub fn new(terrain: TerrainGrid) -> Self {
        Self {
            tick: 0,
            terrain,
            population: Population::new(),
            food: ResourcePool::new(),
            settlements: SettlementRegistry::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_time(&mut self) {
        self.tick += 1;
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn food(&self) -> &ResourcePool {
        &self.food
    }

    pub fn settlements(&self) -> &SettlementRegistry {
        &self.settlements
    }

    /// Adds an agent without a terrain check.
    pub fn spawn_agent(&mut self, params: &ParameterSet, faction: Faction, cell: Cell) -> AgentId {
        self.population.spawn(params, faction, cell)
    }

    pub fn place_food(&mut self, cell: Cell) {
        self.food.place(cell);
    }

    pub fn total_population(&self) -> usize {
        self.population.len()
    }

    pub fn snapshot(&self, paused: bool) -> WorldSnapshot {
        let agents = self
            .population
            .iter()
            .map(|agent| AgentView {
                id: agent.id.raw(),
                x: agent.cell.x,
                y: agent.cell.y,
                faction: agent.faction,
                energy: agent.energy,
                age: agent.age,
                strength: agent.strength,
                speed: agent.speed,
                settlement: agent.settlement.map(|id| id.raw()),
                color: agent.faction.agent_color(),
            })
            .collect();
        let settlements = self
            .settlements
            .iter()
            .map(|settlement| SettlementView {
                id: settlement.id.raw(),
                x: settlement.cell.x,
                y: settlement.cell.y,
                faction: settlement.faction,
                level: settlement.level,
                population: settlement.population,
                color: settlement.faction.settlement_color(),
            })
            .collect();
        let agent_counts = self.population.faction_counts();
        let settlement_counts = self.settlements.counts_by_faction();
        let factions = Faction::ALL
            .into_iter()
            .map(|faction| FactionCount {
                faction,
                agents: *agent_counts.get(faction),
                settlements: *settlement_counts.get(faction),
            })
            .collect();

        WorldSnapshot {
            tick: self.tick,
            paused,
            width: self.terrain.width(),
            height: self.terrain.height(),
            terrain: self.terrain.cells().to_vec(),
            agents,
            food: self.food.positions(),
            settlements,
            factions,
            total_agents: self.population.len(),
            total_settlements: self.settlements.len(),
            total_food: self.food.len(),
        }
    }
}
