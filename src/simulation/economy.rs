//! Economic commands agents may issue against the world

use crate::core::error::Result;
use crate::core::types::{BuildingId, SettlementId};

/// Commands that change a settlement's economy without building anything
pub trait EconomyCommands {
    fn set_tax_rate(&mut self, settlement: SettlementId, rate: f32) -> Result<()>;

    /// Pause a running process or resume a paused one
    fn toggle_production_active(&mut self, building: BuildingId, process: usize) -> Result<()>;
}
