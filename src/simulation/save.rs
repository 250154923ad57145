//! Save game document

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai::persistence::OrchestratorRecord;
use crate::core::types::Tick;
use crate::simulation::world::World;

/// Format version written into every save
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveHeader {
    pub game_id: Uuid,
    pub version: u32,
    /// Scheduler clock at save time
    pub tick: Tick,
}

/// Everything needed to resume a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    pub header: SaveHeader,
    pub world: World,
    pub orchestrators: Vec<OrchestratorRecord>,
}
