//! Sub-builders owned by the orchestrator

pub mod production;
pub mod village;

pub use production::ProductionBuilder;
pub use village::{PlanEntry, Purpose, VillageBuilder};
