use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::{
    command::Command,
    faction::Faction,
    params::ParameterSet,
    rng::RngManager,
    terrain::{Cell, TerrainConfig, TerrainGrid},
    world::World,
};

fn default_ticks() -> u64 {
    1_000
}

fn default_agents_per_faction() -> u32 {
    12
}

fn default_corner_inset() -> i32 {
    5
}

fn default_spread() -> i32 {
    3
}

fn default_initial_food() -> u32 {
    400
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub seeding: SeedingConfig,
    /// Overrides applied on top of the default parameter set, keyed by parameter name.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    #[serde(default)]
    pub interventions: Vec<Intervention>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedingConfig {
    #[serde(default = "default_agents_per_faction")]
    pub agents_per_faction: u32,
    /// Distance of each faction's home point from its corner.
    #[serde(default = "default_corner_inset")]
    pub corner_inset: i32,
    /// Maximum jitter per axis around the home point.
    #[serde(default = "default_spread")]
    pub spread: i32,
    #[serde(default = "default_initial_food")]
    pub initial_food: u32,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            agents_per_faction: default_agents_per_faction(),
            corner_inset: default_corner_inset(),
            spread: default_spread(),
            initial_food: default_initial_food(),
        }
    }
}

/// An operator command replayed at a given host frame.
#[derive(Debug, Clone, Deserialize)]
pub struct Intervention {
    pub frame: u64,
    pub command: Command,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Default parameters with the scenario's overrides applied in name order.
    pub fn parameters(&self) -> Result<ParameterSet> {
        let mut params = ParameterSet::default();
        for (name, value) in &self.parameters {
            params
                .set(name, *value)
                .with_context(|| format!("Invalid parameter override in scenario '{}'", self.name))?;
        }
        Ok(params)
    }

    /// Generates terrain, places each faction around its corner and scatters the initial food.
    pub fn build_world(&self, params: &ParameterSet) -> World {
        let mut rng = RngManager::new(self.seed);
        let terrain = TerrainGrid::generate(&self.terrain, &mut rng.stream("terrain"));
        let mut world = World::new(terrain);
        let placed = seed_factions(&mut world, params, &self.seeding, &mut rng.stream("seeding"));
        let food = world
            .food
            .seed(&world.terrain, self.seeding.initial_food, &mut rng.stream("food"));
        debug!(agents = placed, food, "world seeded");
        world
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.unwrap_or(self.ticks)
    }

    pub fn interventions_at(&self, frame: u64) -> impl Iterator<Item = &Command> + '_ {
        self.interventions
            .iter()
            .filter(move |intervention| intervention.frame == frame)
            .map(|intervention| &intervention.command)
    }
}

/// Home point of each faction, `inset` cells in from its corner.
pub fn home_corner(faction: Faction, width: u32, height: u32, inset: i32) -> Cell {
    let right = width as i32 - 1 - inset;
    let bottom = height as i32 - 1 - inset;
    match faction {
        Faction::Human => Cell::new(inset, inset),
        Faction::Elf => Cell::new(right, inset),
        Faction::Dwarf => Cell::new(inset, bottom),
        Faction::Orc => Cell::new(right, bottom),
    }
}

/// Jittered placement around each faction's corner. Attempts that land on unwalkable cells are
/// dropped. Returns the number of agents placed.
pub fn seed_factions<R: Rng + ?Sized>(
    world: &mut World,
    params: &ParameterSet,
    seeding: &SeedingConfig,
    rng: &mut R,
) -> usize {
    let width = world.terrain.width();
    let height = world.terrain.height();
    let spread = seeding.spread.max(0);
    let mut placed = 0;
    for faction in Faction::ALL {
        let home = home_corner(faction, width, height, seeding.corner_inset);
        for _ in 0..seeding.agents_per_faction {
            let x = (home.x + rng.gen_range(-spread..=spread)).clamp(0, width as i32 - 1);
            let y = (home.y + rng.gen_range(-spread..=spread)).clamp(0, height as i32 - 1);
            let cell = Cell::new(x, y);
            if world.terrain.is_walkable(cell) {
                world.spawn_agent(params, faction, cell);
                placed += 1;
            }
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::Terrain;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
name: minimal
seed: 3
terrain:
  width: 40
  height: 30
  flat: true
"#;

    #[test]
    fn defaults_fill_missing_sections() {
        let scenario: Scenario = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(scenario.ticks, 1_000);
        assert_eq!(scenario.seeding.agents_per_faction, 12);
        assert_eq!(scenario.seeding.initial_food, 400);
        assert_eq!(scenario.logging.level, "info");
        assert_eq!(scenario.terrain.water_basins, 9);
        assert!(scenario.interventions.is_empty());
    }

    #[test]
    fn flat_world_places_every_agent_near_its_corner() {
        let scenario: Scenario = serde_yaml::from_str(MINIMAL).unwrap();
        let params = scenario.parameters().unwrap();
        let world = scenario.build_world(&params);
        assert_eq!(world.terrain().count(Terrain::Grass), 40 * 30);
        assert_eq!(world.population().len(), 48);
        assert_eq!(world.food().len(), 400);
        for agent in world.population().iter() {
            let home = home_corner(agent.faction, 40, 30, 5);
            assert!(agent.cell.chebyshev(home) <= 3);
        }
    }

    #[test]
    fn same_seed_builds_same_world() {
        let scenario = Scenario {
            terrain: TerrainConfig::default(),
            ..serde_yaml::from_str::<Scenario>(MINIMAL).unwrap()
        };
        let params = ParameterSet::default();
        let a = scenario.build_world(&params);
        let b = scenario.build_world(&params);
        assert_eq!(a.terrain(), b.terrain());
        assert_eq!(a.food().positions(), b.food().positions());
        let cells_a: Vec<_> = a.population().iter().map(|agent| agent.cell).collect();
        let cells_b: Vec<_> = b.population().iter().map(|agent| agent.cell).collect();
        assert_eq!(cells_a, cells_b);
    }

    #[test]
    fn bad_parameter_override_is_reported() {
        let yaml = format!("{MINIMAL}parameters:\n  warp_speed: 2.0\n");
        let scenario: Scenario = serde_yaml::from_str(&yaml).unwrap();
        let err = scenario.parameters().unwrap_err();
        assert!(format!("{err:#}").contains("warp_speed"));
    }

    #[test]
    fn loader_reads_interventions_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "{MINIMAL}interventions:\n  - frame: 4\n    command:\n      type: lightning\n      x: 1\n      y: 2\n"
        )
        .unwrap();
        let loader = ScenarioLoader::new(file.path().parent().unwrap());
        let scenario = loader.load(file.path().file_name().unwrap()).unwrap();
        assert_eq!(scenario.interventions_at(4).count(), 1);
        assert_eq!(scenario.interventions_at(3).count(), 0);
        assert_eq!(
            scenario.interventions_at(4).next(),
            Some(&Command::Lightning { x: 1, y: 2 })
        );
    }

    #[test]
    fn missing_file_has_context() {
        let loader = ScenarioLoader::new("/nonexistent");
        let err = loader.load("nope.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read scenario file"));
    }
}
