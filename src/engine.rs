use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    command::{Command, CommandOutcome, CommandQueue},
    disaster::{self, DisasterKind, DisasterOutcome},
    error::WorldError,
    faction::Faction,
    params::ParameterSet,
    population::{AgentId, AgentReport, DeathCause},
    rng::{RngManager, SystemRng},
    systems::{CombatSystem, DisasterSystem, LifecycleSystem, ResourceSystem, SettlementSystem},
    terrain::Cell,
    world::{World, WorldSnapshot},
};

pub struct EngineSettings {
    pub seed: u64,
    pub params: ParameterSet,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            params: ParameterSet::default(),
        }
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Installs the per-tick pipeline: lifecycle, combat, resources, settlements, disasters.
    pub fn with_standard_systems(self) -> Self {
        self.with_system(LifecycleSystem::new())
            .with_system(CombatSystem::new())
            .with_system(ResourceSystem::new())
            .with_system(SettlementSystem::new())
            .with_system(DisasterSystem::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            params: self.settings.params,
            commands: CommandQueue::new(),
            paused: false,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    params: ParameterSet,
    commands: CommandQueue,
    paused: bool,
}

impl Engine {
    /// Advances the world by one tick regardless of the pause flag.
    pub fn step(&mut self, world: &mut World) -> Result<TickSummary> {
        let mut summary = TickSummary {
            tick: world.tick() + 1,
            ..TickSummary::default()
        };
        let ctx = SystemContext {
            tick: summary.tick,
            params: &self.params,
        };
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            system.run(&ctx, world, &mut rng_stream, &mut summary)?;
        }
        world.advance_time();
        Ok(summary)
    }

    /// One host-loop frame: apply queued operator commands, then step unless paused.
    pub fn frame(&mut self, world: &mut World) -> Result<Option<TickSummary>> {
        let pending: Vec<Command> = self.commands.drain().collect();
        for command in pending {
            debug!(?command, "applying operator command");
            if let Err(err) = self.apply(world, command) {
                warn!(%err, "operator command rejected");
            }
        }
        if self.paused {
            return Ok(None);
        }
        self.step(world).map(Some)
    }

    pub fn run(&mut self, world: &mut World, frames: u64) -> Result<RunTotals> {
        self.run_with_hook(world, frames, |_, _| {})
    }

    pub fn run_with_hook<F>(&mut self, world: &mut World, frames: u64, mut hook: F) -> Result<RunTotals>
    where
        F: FnMut(&TickSummary, &World),
    {
        let mut totals = RunTotals::default();
        for _ in 0..frames {
            if let Some(summary) = self.frame(world)? {
                totals.absorb(&summary);
                hook(&summary, world);
            }
        }
        Ok(totals)
    }

    pub fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Applies an operator command immediately. Map-directed commands aimed at unwalkable or
    /// out-of-range cells are dropped, matching how the input layer treats such clicks.
    pub fn apply(&mut self, world: &mut World, command: Command) -> Result<CommandOutcome, WorldError> {
        if let Some(cell) = command.cell() {
            if !world.terrain().is_walkable(cell) {
                return Ok(CommandOutcome::Ignored);
            }
        }
        let outcome = match command {
            Command::Spawn { faction, x, y } => {
                CommandOutcome::Spawned(self.spawn(world, faction, Cell::new(x, y)))
            }
            Command::PlaceFood { x, y } => {
                self.place_food(world, Cell::new(x, y));
                CommandOutcome::FoodPlaced
            }
            Command::Meteor { x, y } => {
                CommandOutcome::Disaster(self.trigger_meteor(world, Cell::new(x, y)))
            }
            Command::Lightning { x, y } => {
                CommandOutcome::Disaster(self.trigger_lightning(world, Cell::new(x, y)))
            }
            Command::SetPaused { paused } => {
                self.set_paused(paused);
                CommandOutcome::Paused(paused)
            }
            Command::TogglePause => {
                self.set_paused(!self.paused);
                CommandOutcome::Paused(self.paused)
            }
            Command::SetParameter { name, value } => {
                self.set_parameter(&name, value)?;
                CommandOutcome::ParameterChanged { name, value }
            }
        };
        Ok(outcome)
    }

    /// Places an agent without checking terrain; callers validate the cell.
    pub fn spawn(&mut self, world: &mut World, faction: Faction, cell: Cell) -> AgentId {
        world.spawn_agent(&self.params, faction, cell)
    }

    pub fn place_food(&mut self, world: &mut World, cell: Cell) {
        world.place_food(cell);
    }

    pub fn trigger_meteor(&mut self, world: &mut World, cell: Cell) -> DisasterOutcome {
        let outcome = disaster::strike(
            DisasterKind::Meteor,
            &mut world.population,
            &mut world.terrain,
            cell,
            &self.params,
        );
        info!(x = cell.x, y = cell.y, casualties = outcome.casualties, "meteor triggered");
        outcome
    }

    pub fn trigger_lightning(&mut self, world: &mut World, cell: Cell) -> DisasterOutcome {
        let outcome = disaster::strike(
            DisasterKind::Lightning,
            &mut world.population,
            &mut world.terrain,
            cell,
            &self.params,
        );
        info!(x = cell.x, y = cell.y, casualties = outcome.casualties, "lightning triggered");
        outcome
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!(paused, "simulation pause toggled");
        }
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), WorldError> {
        self.params.set(name, value)?;
        info!(parameter = name, value, "parameter changed");
        Ok(())
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn snapshot(&self, world: &World) -> WorldSnapshot {
        world.snapshot(self.paused)
    }
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub params: &'a ParameterSet,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
        summary: &mut TickSummary,
    ) -> Result<()>;
}

/// What one tick did to the world.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub births: u32,
    pub starvation_deaths: u32,
    pub old_age_deaths: u32,
    pub food_eaten: u32,
    pub settlements_founded: u32,
    pub combat_round: bool,
    pub combat_deaths: u32,
    pub food_spawned: u32,
    pub settlements_abandoned: u32,
    pub disasters: Vec<DisasterOutcome>,
}

impl TickSummary {
    pub fn record_agent(&mut self, report: &AgentReport) {
        if report.ate {
            self.food_eaten += 1;
        }
        if report.offspring.is_some() {
            self.births += 1;
        }
        if report.founded.is_some() {
            self.settlements_founded += 1;
        }
        match report.death {
            Some(DeathCause::Starvation) => self.starvation_deaths += 1,
            Some(DeathCause::OldAge) => self.old_age_deaths += 1,
            None => {}
        }
    }

    pub fn disaster_casualties(&self) -> usize {
        self.disasters.iter().map(|d| d.casualties).sum()
    }
}

/// Running totals over a batch of ticks.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunTotals {
    pub ticks: u64,
    pub births: u64,
    pub deaths: u64,
    pub combat_deaths: u64,
    pub disaster_casualties: u64,
    pub settlements_founded: u64,
    pub settlements_abandoned: u64,
}

impl RunTotals {
    pub fn absorb(&mut self, summary: &TickSummary) {
        self.ticks += 1;
        self.births += summary.births as u64;
        self.deaths += (summary.starvation_deaths + summary.old_age_deaths) as u64;
        self.combat_deaths += summary.combat_deaths as u64;
        self.disaster_casualties += summary.disaster_casualties() as u64;
        self.settlements_founded += summary.settlements_founded as u64;
        self.settlements_abandoned += summary.settlements_abandoned as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{Terrain, TerrainGrid};

    struct CountingSystem {
        calls: u32,
    }

    impl System for CountingSystem {
        fn name(&self) -> &str {
            "counting"
        }

        fn run(
            &mut self,
            ctx: &SystemContext,
            _world: &mut World,
            _rng: &mut SystemRng<'_>,
            _summary: &mut TickSummary,
        ) -> Result<()> {
            self.calls += 1;
            assert_eq!(ctx.tick, self.calls as u64);
            Ok(())
        }
    }

    fn quiet_engine() -> Engine {
        EngineBuilder::new(EngineSettings::default())
            .with_system(CountingSystem { calls: 0 })
            .build()
    }

    #[test]
    fn step_advances_tick() {
        let mut engine = quiet_engine();
        let mut world = World::new(TerrainGrid::flat(5, 5));
        let summary = engine.step(&mut world).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(world.tick(), 1);
    }

    #[test]
    fn paused_frames_do_not_advance() {
        let mut engine = quiet_engine();
        let mut world = World::new(TerrainGrid::flat(5, 5));
        engine.submit(Command::SetPaused { paused: true });
        assert!(engine.frame(&mut world).unwrap().is_none());
        assert_eq!(world.tick(), 0);

        engine.submit(Command::TogglePause);
        assert!(engine.frame(&mut world).unwrap().is_some());
        assert_eq!(world.tick(), 1);
    }

    #[test]
    fn run_counts_only_unpaused_frames() {
        let mut engine = quiet_engine();
        let mut world = World::new(TerrainGrid::flat(5, 5));
        let mut seen = Vec::new();
        let totals = engine
            .run_with_hook(&mut world, 3, |summary, _| seen.push(summary.tick))
            .unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(totals.ticks, 3);
    }

    #[test]
    fn commands_on_unwalkable_cells_are_ignored() {
        let mut engine = quiet_engine();
        let mut terrain = TerrainGrid::flat(5, 5);
        terrain.set(Cell::new(1, 1), Terrain::Water);
        let mut world = World::new(terrain);

        let outcome = engine
            .apply(
                &mut world,
                Command::Spawn {
                    faction: Faction::Elf,
                    x: 1,
                    y: 1,
                },
            )
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Ignored);
        let outcome = engine
            .apply(&mut world, Command::PlaceFood { x: 9, y: 9 })
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Ignored);
        assert!(world.population().is_empty());
        assert!(world.food().is_empty());
    }

    #[test]
    fn set_parameter_through_commands() {
        let mut engine = quiet_engine();
        let mut world = World::new(TerrainGrid::flat(5, 5));
        engine
            .apply(
                &mut world,
                Command::SetParameter {
                    name: "fight_chance".into(),
                    value: 0.9,
                },
            )
            .unwrap();
        assert_eq!(engine.params().fight_chance, 0.9);

        let err = engine
            .apply(
                &mut world,
                Command::SetParameter {
                    name: "nonsense".into(),
                    value: 1.0,
                },
            )
            .unwrap_err();
        assert_eq!(err, WorldError::UnknownParameter("nonsense".into()));
    }

    #[test]
    fn rejected_commands_do_not_stop_the_frame() {
        let mut engine = quiet_engine();
        let mut world = World::new(TerrainGrid::flat(5, 5));
        engine.submit(Command::SetParameter {
            name: "nonsense".into(),
            value: 1.0,
        });
        engine.submit(Command::Spawn {
            faction: Faction::Dwarf,
            x: 2,
            y: 2,
        });
        assert!(engine.frame(&mut world).unwrap().is_some());
        assert_eq!(world.population().len(), 1);
        assert_eq!(engine.pending_commands(), 0);
    }
}
