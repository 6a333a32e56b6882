use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use worldbox::{
    engine::{EngineBuilder, EngineSettings, RunTotals},
    scenario::ScenarioLoader,
    Faction, World,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless four-faction world simulation")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/default.yaml")]
    scenario: PathBuf,

    /// Override frame count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, e.g. `debug` or `worldbox=trace`; RUST_LOG wins when set
    #[arg(long)]
    log_level: Option<String>,

    /// Log per-faction counts every N ticks (0 disables)
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Print the final world snapshot as JSON on stdout
    #[arg(long)]
    print_snapshot: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    init_tracing(cli.log_level.as_deref().unwrap_or(&scenario.logging.level));

    let params = scenario.parameters()?;
    let mut world = scenario.build_world(&params);
    let frames = scenario.ticks(cli.ticks);

    let mut engine = EngineBuilder::new(EngineSettings {
        seed: scenario.seed,
        params,
    })
    .with_standard_systems()
    .build();

    info!(
        scenario = %scenario.name,
        seed = scenario.seed,
        frames,
        agents = world.total_population(),
        food = world.food().len(),
        "starting simulation"
    );

    let mut totals = RunTotals::default();
    for frame in 0..frames {
        for command in scenario.interventions_at(frame) {
            engine.submit(command.clone());
        }
        let Some(summary) = engine.frame(&mut world)? else {
            continue;
        };
        totals.absorb(&summary);
        if cli.report_every > 0 && summary.tick % cli.report_every == 0 {
            report(&world);
        }
    }

    info!(
        ticks = totals.ticks,
        births = totals.births,
        deaths = totals.deaths,
        combat_deaths = totals.combat_deaths,
        disaster_casualties = totals.disaster_casualties,
        settlements_founded = totals.settlements_founded,
        settlements_abandoned = totals.settlements_abandoned,
        "simulation finished"
    );
    report(&world);

    if cli.print_snapshot {
        let snapshot = engine.snapshot(&world);
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;
        println!("{json}");
    }
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn report(world: &World) {
    let agents = world.population().faction_counts();
    let settlements = world.settlements().counts_by_faction();
    for faction in Faction::ALL {
        info!(
            tick = world.tick(),
            faction = %faction,
            agents = *agents.get(faction),
            settlements = *settlements.get(faction),
            "faction status"
        );
    }
}
