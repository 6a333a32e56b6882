use anyhow::Result;
use tracing::info;

use crate::{
    disaster,
    engine::{System, SystemContext, TickSummary},
    rng::SystemRng,
    world::World,
};

pub struct DisasterSystem;

impl DisasterSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DisasterSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DisasterSystem {
    fn name(&self) -> &str {
        "disasters"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
        summary: &mut TickSummary,
    ) -> Result<()> {
        let outcome = disaster::roll_ambient(
            &mut world.population,
            &mut world.terrain,
            ctx.params,
            rng,
        );
        if let Some(outcome) = outcome {
            info!(
                tick = ctx.tick,
                kind = ?outcome.kind,
                x = outcome.cell.x,
                y = outcome.cell.y,
                casualties = outcome.casualties,
                "ambient disaster"
            );
            summary.disasters.push(outcome);
        }
        Ok(())
    }
}
