mod combat;
mod disasters;
mod lifecycle;
mod resources;
mod settlements;

pub use combat::CombatSystem;
pub use disasters::DisasterSystem;
pub use lifecycle::LifecycleSystem;
pub use resources::ResourceSystem;
pub use settlements::SettlementSystem;
