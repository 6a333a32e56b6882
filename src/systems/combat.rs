use anyhow::Result;
use rand::Rng;
use tracing::debug;

use crate::{
    engine::{System, SystemContext, TickSummary},
    rng::SystemRng,
    world::World,
};

pub struct CombatSystem;

impl CombatSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CombatSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CombatSystem {
    fn name(&self) -> &str {
        "combat"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
        summary: &mut TickSummary,
    ) -> Result<()> {
        if rng.gen::<f64>() >= ctx.params.fight_chance {
            return Ok(());
        }
        summary.combat_round = true;
        for (a, b) in world.population.colocated_pairs() {
            if let Some(loser) = world.population.resolve_combat(a, b, ctx.params, rng) {
                debug!(tick = ctx.tick, agent = loser.raw(), "agent killed in combat");
                summary.combat_deaths += 1;
            }
        }
        Ok(())
    }
}
