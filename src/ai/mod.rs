//! Autonomous settlement building
//!
//! A `BuildOrchestrator` takes control of one settlement and grows it tick
//! by tick: mandatory startup tasks first, then a fixed priority ladder of
//! storage, food, housing and the clay economy.

pub mod balance;
pub mod builders;
pub mod orchestrator;
pub mod persistence;
pub mod production_control;
pub mod task_queue;

pub use balance::{enough_food, ResourceBalanceTracker, ResourceFlow};
pub use orchestrator::{choose_action, BuildOrchestrator, Decision, LadderInputs, TickContext, TickReport};
pub use persistence::{OrchestratorRecord, PersistenceAdapter};
pub use production_control::{manage_production, ProductionController, ProductionToggle};
pub use task_queue::{BuildTaskQueue, TaskKind};
