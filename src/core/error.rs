use thiserror::Error;

use crate::city::blueprint::BlueprintLoadError;
use crate::core::types::{BuildingId, LandId, OrchestratorId, PlayerId, SettlementId};

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Unknown task kind code: {0}")]
    UnknownTaskKind(u8),

    #[error("Orchestrator {id} has {count} pending tick registrations, expected exactly one")]
    DuplicateRegistration { id: OrchestratorId, count: usize },

    #[error("Orchestrator {0} has no pending tick registration")]
    MissingRegistration(OrchestratorId),

    #[error("Land allocation not found: {0:?}")]
    LandNotFound(LandId),

    #[error("No settlement owned by {owner} on the island of land allocation {land:?}")]
    SettlementUnresolved { land: LandId, owner: PlayerId },

    #[error("Settlement not found: {0:?}")]
    SettlementNotFound(SettlementId),

    #[error("Building not found: {0}")]
    BuildingNotFound(BuildingId),

    #[error("Building {building} has no production process {process}")]
    ProcessNotFound { building: BuildingId, process: usize },

    #[error("Scheduled call targets unknown orchestrator {0}")]
    OrchestratorNotFound(OrchestratorId),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unsupported save format version: {0}")]
    UnsupportedVersion(u32),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error("Blueprint error: {0}")]
    Blueprint(#[from] BlueprintLoadError),
}

pub type Result<T> = std::result::Result<T, AiError>;
