use worldbox::{
    engine::{EngineBuilder, EngineSettings, RunTotals},
    scenario::ScenarioLoader,
    terrain::Terrain,
    Command,
};

#[test]
fn default_scenario_loads_and_runs() {
    let loader = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"));
    let scenario = loader
        .load("scenarios/default.yaml")
        .expect("scenario should load");
    assert_eq!(scenario.name, "default");
    assert_eq!(scenario.terrain.width, 150);
    assert_eq!(scenario.terrain.height, 100);
    assert!(matches!(
        scenario.interventions_at(1200).next(),
        Some(Command::Meteor { .. })
    ));

    let params = scenario.parameters().expect("overrides are valid");
    let mut world = scenario.build_world(&params);
    assert!(world.terrain().count(Terrain::Water) > 0);
    assert!(!world.population().is_empty());
    assert!(world.population().len() <= 48);
    assert!(world.food().len() <= 400);
    for agent in world.population().iter() {
        assert!(world.terrain().is_walkable(agent.cell));
    }

    let mut engine = EngineBuilder::new(EngineSettings {
        seed: scenario.seed,
        params,
    })
    .with_standard_systems()
    .build();
    let mut totals = RunTotals::default();
    for frame in 0..50 {
        for command in scenario.interventions_at(frame) {
            engine.submit(command.clone());
        }
        if let Some(summary) = engine.frame(&mut world).expect("frame runs") {
            totals.absorb(&summary);
        }
    }
    assert_eq!(totals.ticks, 50);
    assert_eq!(world.tick(), 50);
}

#[test]
fn scripted_interventions_replay_by_frame() {
    let dir = tempfile::tempdir().expect("tempdir");
    let yaml = r#"
name: scripted
seed: 11
ticks: 5
terrain:
  width: 20
  height: 20
  flat: true
seeding:
  agents_per_faction: 0
  initial_food: 0
parameters:
  food_spawn_chance: 0.0
  disaster_chance: 0.0
interventions:
  - frame: 0
    command:
      type: set_paused
      paused: true
  - frame: 1
    command:
      type: spawn
      faction: orc
      x: 10
      y: 10
  - frame: 2
    command:
      type: toggle_pause
"#;
    std::fs::write(dir.path().join("scripted.yaml"), yaml).expect("write scenario");
    let scenario = ScenarioLoader::new(dir.path())
        .load("scripted.yaml")
        .expect("scenario should load");
    let params = scenario.parameters().expect("overrides are valid");
    assert_eq!(params.food_spawn_chance, 0.0);
    let mut world = scenario.build_world(&params);
    assert!(world.population().is_empty());

    let mut engine = EngineBuilder::new(EngineSettings {
        seed: scenario.seed,
        params,
    })
    .with_standard_systems()
    .build();
    let mut stepped = Vec::new();
    for frame in 0..scenario.ticks(None) {
        for command in scenario.interventions_at(frame) {
            engine.submit(command.clone());
        }
        stepped.push(engine.frame(&mut world).expect("frame runs").is_some());
    }
    assert_eq!(stepped, vec![false, false, true, true, true]);
    assert_eq!(world.tick(), 3);
    assert_eq!(world.population().len(), 1);
}
