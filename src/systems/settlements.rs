use anyhow::Result;

use crate::{
    engine::{System, SystemContext, TickSummary},
    rng::SystemRng,
    world::World,
};

/// Recounts settlement members, drops the empty ones and grows the rest.
pub struct SettlementSystem;

impl SettlementSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SettlementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for SettlementSystem {
    fn name(&self) -> &str {
        "settlements"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
        summary: &mut TickSummary,
    ) -> Result<()> {
        let abandoned = world.settlements.recompute_and_prune(&world.population);
        summary.settlements_abandoned += abandoned.len() as u32;
        Ok(())
    }
}
