use anyhow::Result;

use crate::{
    engine::{System, SystemContext, TickSummary},
    rng::SystemRng,
    world::World,
};

/// Moves, feeds, breeds and retires every agent alive at the start of the tick.
pub struct LifecycleSystem;

impl LifecycleSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LifecycleSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for LifecycleSystem {
    fn name(&self) -> &str {
        "lifecycle"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
        summary: &mut TickSummary,
    ) -> Result<()> {
        // Offspring born this tick are not in the snapshot and wait for the next one.
        for id in world.population.ids() {
            let report = world.population.step_agent(
                id,
                &world.terrain,
                &mut world.food,
                &mut world.settlements,
                ctx.params,
                rng,
            );
            if let Some(report) = report {
                summary.record_agent(&report);
            }
        }
        Ok(())
    }
}
