use anyhow::Result;

use crate::{
    engine::{System, SystemContext, TickSummary},
    rng::SystemRng,
    world::World,
};

pub struct ResourceSystem;

impl ResourceSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResourceSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ResourceSystem {
    fn name(&self) -> &str {
        "resources"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
        summary: &mut TickSummary,
    ) -> Result<()> {
        if world.food.maybe_spawn(&world.terrain, ctx.params, rng) {
            summary.food_spawned += 1;
        }
        Ok(())
    }
}
