//! Buildings placed in a settlement

use serde::{Deserialize, Serialize};

use crate::city::production::Production;
use crate::city::resource::ResourceType;
use crate::core::types::{BuildingId, Coord};

/// Type of building
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    TradePost,
    Storage,
    Road,
    MainSquare,
    Tent,
    Pavilion,
    VillageSchool,
    Lumberjack,
    Fisher,
    PotatoField,
    ClayPit,
    Brickyard,
    ClayDeposit,
    FishDeposit,
}

impl BuildingType {
    pub const ALL: [BuildingType; 14] = [
        BuildingType::TradePost,
        BuildingType::Storage,
        BuildingType::Road,
        BuildingType::MainSquare,
        BuildingType::Tent,
        BuildingType::Pavilion,
        BuildingType::VillageSchool,
        BuildingType::Lumberjack,
        BuildingType::Fisher,
        BuildingType::PotatoField,
        BuildingType::ClayPit,
        BuildingType::Brickyard,
        BuildingType::ClayDeposit,
        BuildingType::FishDeposit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuildingType::TradePost => "trade post",
            BuildingType::Storage => "storage",
            BuildingType::Road => "road",
            BuildingType::MainSquare => "main square",
            BuildingType::Tent => "tent",
            BuildingType::Pavilion => "pavilion",
            BuildingType::VillageSchool => "village school",
            BuildingType::Lumberjack => "lumberjack",
            BuildingType::Fisher => "fisher",
            BuildingType::PotatoField => "potato field",
            BuildingType::ClayPit => "clay pit",
            BuildingType::Brickyard => "brickyard",
            BuildingType::ClayDeposit => "clay deposit",
            BuildingType::FishDeposit => "fish deposit",
        }
    }

    /// Parse a building name as used in catalog files ("clay_pit" or "clay pit")
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.to_lowercase().replace('_', " ");
        Self::ALL.iter().copied().find(|t| t.name() == wanted)
    }

    /// Capability of this building type, fixed for the building's lifetime
    pub fn role(&self) -> BuildingRole {
        match self {
            BuildingType::TradePost | BuildingType::Storage => BuildingRole::Storage,
            BuildingType::Road | BuildingType::MainSquare => BuildingRole::Infrastructure,
            BuildingType::Tent => BuildingRole::Residential,
            BuildingType::Pavilion | BuildingType::VillageSchool => BuildingRole::Civic,
            BuildingType::Lumberjack
            | BuildingType::Fisher
            | BuildingType::PotatoField
            | BuildingType::ClayPit
            | BuildingType::Brickyard => BuildingRole::Production,
            BuildingType::ClayDeposit | BuildingType::FishDeposit => BuildingRole::Deposit,
        }
    }
}

/// What a building contributes to its settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingRole {
    /// Houses residents who consume goods
    Residential,
    /// Runs production lines whose output is collected into storage
    Production,
    /// Collects goods and raises the settlement's storage limits
    Storage,
    /// Natural resource occurrence, never built by a player
    Deposit,
    /// Amenities
    Civic,
    /// Roads and squares
    Infrastructure,
}

/// A building standing on one plot of a settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub building_type: BuildingType,
    /// Resolved from `building_type` at spawn
    pub role: BuildingRole,
    pub position: Coord,
    /// Concurrent production processes
    pub productions: Vec<Production>,
}

impl Building {
    pub fn new(
        id: BuildingId,
        building_type: BuildingType,
        position: Coord,
        productions: Vec<Production>,
    ) -> Self {
        Self {
            id,
            building_type,
            role: building_type.role(),
            position,
            productions,
        }
    }

    pub fn name(&self) -> &'static str {
        self.building_type.name()
    }

    /// Whether any process of this building outputs the resource
    pub fn produces(&self, resource: ResourceType) -> bool {
        self.productions.iter().any(|p| p.line.produces(resource))
    }

    /// Number of output samples recorded for the resource, `None` if the
    /// building keeps no history for it
    pub fn history_length(&self, resource: ResourceType) -> Option<usize> {
        self.productions
            .iter()
            .filter_map(|p| p.history.length(resource))
            .max()
    }

    /// Modelled output per tick, assuming every process runs continuously
    pub fn expected_production_level(&self, resource: ResourceType) -> f32 {
        self.productions
            .iter()
            .map(|p| p.line.production_rate(resource))
            .sum()
    }

    /// Measured output per tick, averaged over the recorded history
    pub fn absolute_production_level(&self, resource: ResourceType) -> f32 {
        self.productions
            .iter()
            .map(|p| p.history.average(resource))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::production::ProductionLine;
    use crate::core::types::SettlementId;

    fn id(index: u32) -> BuildingId {
        BuildingId { settlement: SettlementId(1), index }
    }

    fn fisher() -> Building {
        let line = ProductionLine::new("fish", vec![], vec![(ResourceType::Food, 1)], 16);
        Building::new(
            id(0),
            BuildingType::Fisher,
            Coord::new(0, 0),
            vec![Production::new(line, 8, 64)],
        )
    }

    #[test]
    fn test_role_resolved_at_spawn() {
        let building = fisher();
        assert_eq!(building.role, BuildingRole::Production);

        let tent = Building::new(id(1), BuildingType::Tent, Coord::new(1, 0), vec![]);
        assert_eq!(tent.role, BuildingRole::Residential);
    }

    #[test]
    fn test_building_type_from_name() {
        assert_eq!(BuildingType::from_name("clay_pit"), Some(BuildingType::ClayPit));
        assert_eq!(BuildingType::from_name("Village School"), Some(BuildingType::VillageSchool));
        assert_eq!(BuildingType::from_name("castle"), None);
    }

    #[test]
    fn test_history_length_none_for_unproduced_resource() {
        let building = fisher();
        assert_eq!(building.history_length(ResourceType::Food), Some(0));
        assert_eq!(building.history_length(ResourceType::Boards), None);
    }

    #[test]
    fn test_expected_level_from_line() {
        let building = fisher();
        assert!((building.expected_production_level(ResourceType::Food) - 1.0 / 16.0).abs() < 1e-6);
        assert_eq!(building.expected_production_level(ResourceType::Clay), 0.0);
    }
}
