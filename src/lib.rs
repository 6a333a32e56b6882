pub mod command;
pub mod disaster;
pub mod engine;
pub mod error;
pub mod faction;
pub mod params;
pub mod population;
pub mod resources;
pub mod rng;
pub mod scenario;
pub mod settlement;
pub mod systems;
pub mod terrain;
pub mod world;

pub use command::{Command, CommandOutcome};
pub use engine::{Engine, EngineBuilder, EngineSettings, TickSummary};
pub use error::WorldError;
pub use faction::Faction;
pub use params::ParameterSet;
pub use scenario::{Scenario, ScenarioLoader};
pub use world::{World, WorldSnapshot};
