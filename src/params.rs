//! Tunable simulation knobs.
//!
//! A single [`ParameterSet`] is owned by the engine and handed to systems by reference. The tuning
//! collaborator addresses knobs by name (`energy_loss`, `orc.strength`, ...) through
//! [`ParameterSet::set`], which is also how scenario files apply their overrides.

use crate::error::WorldError;
use crate::faction::{Faction, FactionStats, FactionTable};

/// Side of the Chebyshev box used when counting same-faction neighbours for reproduction.
pub const NEARBY_RADIUS: u32 = 5;
/// Upper bound (inclusive) of the random bonus added to strength in a lethal encounter.
pub const FIGHT_BONUS_MAX: u32 = 3;

/// Names of the scalar knobs, in display order.
pub const SCALAR_NAMES: [&str; 21] = [
    "initial_energy",
    "energy_loss",
    "energy_from_food",
    "max_energy",
    "food_search_radius",
    "reproduction_energy",
    "reproduction_cost",
    "reproduction_chance",
    "min_reproduction_age",
    "max_reproduction_age_ratio",
    "max_nearby_agents",
    "fight_chance",
    "fight_death_chance",
    "village_build_chance",
    "village_energy_cost",
    "village_build_cost",
    "village_min_distance",
    "max_food",
    "food_spawn_chance",
    "disaster_chance",
    "meteor_radius",
];

const FACTION_FIELDS: [&str; 3] = ["max_age", "strength", "speed"];

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub initial_energy: f64,
    pub energy_loss: f64,
    pub energy_from_food: f64,
    pub max_energy: f64,
    pub food_search_radius: u32,
    pub reproduction_energy: f64,
    pub reproduction_cost: f64,
    pub reproduction_chance: f64,
    pub min_reproduction_age: u32,
    pub max_reproduction_age_ratio: f64,
    pub max_nearby_agents: u32,
    pub fight_chance: f64,
    pub fight_death_chance: f64,
    pub village_build_chance: f64,
    pub village_energy_cost: f64,
    pub village_build_cost: f64,
    pub village_min_distance: f64,
    pub max_food: u32,
    pub food_spawn_chance: f64,
    pub disaster_chance: f64,
    pub meteor_radius: u32,
    pub factions: FactionTable<FactionStats>,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            initial_energy: 100.0,
            energy_loss: 1.6,
            energy_from_food: 35.0,
            max_energy: 120.0,
            food_search_radius: 3,
            reproduction_energy: 40.0,
            reproduction_cost: 15.0,
            reproduction_chance: 0.08,
            min_reproduction_age: 20,
            max_reproduction_age_ratio: 0.9,
            max_nearby_agents: 15,
            fight_chance: 0.3,
            fight_death_chance: 0.3,
            village_build_chance: 0.005,
            village_energy_cost: 30.0,
            village_build_cost: 15.0,
            village_min_distance: 6.0,
            max_food: 500,
            food_spawn_chance: 0.7,
            disaster_chance: 0.0001,
            meteor_radius: 3,
            factions: FactionTable::from_fn(FactionStats::base),
        }
    }
}

impl ParameterSet {
    pub fn faction(&self, faction: Faction) -> FactionStats {
        *self.factions.get(faction)
    }

    /// Reads a knob by name.
    pub fn get(&self, name: &str) -> Result<f64, WorldError> {
        if let Some((faction, field)) = split_faction_key(name)? {
            let stats = self.factions.get(faction);
            return match field {
                "max_age" => Ok(stats.max_age as f64),
                "strength" => Ok(stats.strength as f64),
                "speed" => Ok(stats.speed),
                _ => Err(WorldError::UnknownParameter(name.to_string())),
            };
        }
        let value = match name {
            "initial_energy" => self.initial_energy,
            "energy_loss" => self.energy_loss,
            "energy_from_food" => self.energy_from_food,
            "max_energy" => self.max_energy,
            "food_search_radius" => self.food_search_radius as f64,
            "reproduction_energy" => self.reproduction_energy,
            "reproduction_cost" => self.reproduction_cost,
            "reproduction_chance" => self.reproduction_chance,
            "min_reproduction_age" => self.min_reproduction_age as f64,
            "max_reproduction_age_ratio" => self.max_reproduction_age_ratio,
            "max_nearby_agents" => self.max_nearby_agents as f64,
            "fight_chance" => self.fight_chance,
            "fight_death_chance" => self.fight_death_chance,
            "village_build_chance" => self.village_build_chance,
            "village_energy_cost" => self.village_energy_cost,
            "village_build_cost" => self.village_build_cost,
            "village_min_distance" => self.village_min_distance,
            "max_food" => self.max_food as f64,
            "food_spawn_chance" => self.food_spawn_chance,
            "disaster_chance" => self.disaster_chance,
            "meteor_radius" => self.meteor_radius as f64,
            _ => return Err(WorldError::UnknownParameter(name.to_string())),
        };
        Ok(value)
    }

    /// Writes a knob by name. Integer knobs round the value and saturate at their bounds; range
    /// clamping beyond that is the caller's job.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), WorldError> {
        if !value.is_finite() {
            return Err(WorldError::InvalidParameter {
                name: name.to_string(),
                value,
            });
        }
        if let Some((faction, field)) = split_faction_key(name)? {
            let stats = self.factions.get_mut(faction);
            match field {
                "max_age" => stats.max_age = as_count(value),
                "strength" => stats.strength = as_count(value),
                "speed" => stats.speed = value,
                _ => return Err(WorldError::UnknownParameter(name.to_string())),
            }
            return Ok(());
        }
        match name {
            "initial_energy" => self.initial_energy = value,
            "energy_loss" => self.energy_loss = value,
            "energy_from_food" => self.energy_from_food = value,
            "max_energy" => self.max_energy = value,
            "food_search_radius" => self.food_search_radius = as_count(value),
            "reproduction_energy" => self.reproduction_energy = value,
            "reproduction_cost" => self.reproduction_cost = value,
            "reproduction_chance" => self.reproduction_chance = value,
            "min_reproduction_age" => self.min_reproduction_age = as_count(value),
            "max_reproduction_age_ratio" => self.max_reproduction_age_ratio = value,
            "max_nearby_agents" => self.max_nearby_agents = as_count(value),
            "fight_chance" => self.fight_chance = value,
            "fight_death_chance" => self.fight_death_chance = value,
            "village_build_chance" => self.village_build_chance = value,
            "village_energy_cost" => self.village_energy_cost = value,
            "village_build_cost" => self.village_build_cost = value,
            "village_min_distance" => self.village_min_distance = value,
            "max_food" => self.max_food = as_count(value),
            "food_spawn_chance" => self.food_spawn_chance = value,
            "disaster_chance" => self.disaster_chance = value,
            "meteor_radius" => self.meteor_radius = as_count(value),
            _ => return Err(WorldError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }

    /// Every knob with its current value, for tuning widgets.
    pub fn entries(&self) -> Vec<(String, f64)> {
        let mut entries = Vec::with_capacity(SCALAR_NAMES.len() + FACTION_FIELDS.len() * 4);
        for name in SCALAR_NAMES {
            if let Ok(value) = self.get(name) {
                entries.push((name.to_string(), value));
            }
        }
        for faction in Faction::ALL {
            for field in FACTION_FIELDS {
                let key = format!("{}.{}", faction.name(), field);
                if let Ok(value) = self.get(&key) {
                    entries.push((key, value));
                }
            }
        }
        entries
    }
}

fn split_faction_key(name: &str) -> Result<Option<(Faction, &str)>, WorldError> {
    match name.split_once('.') {
        Some((faction, field)) => {
            let faction = faction
                .parse::<Faction>()
                .map_err(|_| WorldError::UnknownParameter(name.to_string()))?;
            Ok(Some((faction, field)))
        }
        None => Ok(None),
    }
}

fn as_count(value: f64) -> u32 {
    value.round() as u32
}
