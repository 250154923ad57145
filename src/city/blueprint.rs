//! Blueprints - what each building type costs and produces
//!
//! A blueprint specifies the construction cost, the production lines a
//! finished building runs, and the size of each line's output buffer.

use serde::Deserialize;

use crate::city::building::{Building, BuildingType};
use crate::city::production::{Production, ProductionLine};
use crate::city::resource::ResourceType;
use crate::core::types::{BuildingId, Coord};

/// Construction and production data for one building type
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub building_type: BuildingType,
    /// Materials consumed on construction
    pub cost: Vec<(ResourceType, u32)>,
    /// Production lines started when the building is placed
    pub lines: Vec<ProductionLine>,
    /// Capacity of each line's output buffer per produced resource
    pub buffer_size: u32,
}

impl Blueprint {
    /// Instantiate a building from this blueprint
    pub fn instantiate(&self, id: BuildingId, position: Coord, history_window: usize) -> Building {
        let productions = self
            .lines
            .iter()
            .map(|line| Production::new(line.clone(), self.buffer_size, history_window))
            .collect();
        Building::new(id, self.building_type, position, productions)
    }
}

/// Catalog of all available blueprints
#[derive(Debug, Clone, Default)]
pub struct BlueprintCatalog {
    blueprints: Vec<Blueprint>,
}

impl BlueprintCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default blueprints for every building type
    pub fn with_defaults() -> Self {
        use BuildingType::*;
        use ResourceType::*;

        let mut catalog = Self::new();
        let mut plain = |building_type, cost: Vec<(ResourceType, u32)>| {
            catalog.add(Blueprint {
                building_type,
                cost,
                lines: vec![],
                buffer_size: 0,
            });
        };

        plain(TradePost, vec![(Boards, 20), (Tools, 5)]);
        plain(Storage, vec![(Boards, 8)]);
        plain(Road, vec![]);
        plain(MainSquare, vec![(Boards, 10), (Tools, 2)]);
        plain(Pavilion, vec![(Boards, 10), (Tools, 2)]);
        plain(VillageSchool, vec![(Boards, 12), (Tools, 2), (Bricks, 6)]);
        plain(ClayDeposit, vec![]);
        plain(FishDeposit, vec![]);

        catalog.add(Blueprint {
            building_type: Tent,
            cost: vec![(Boards, 4)],
            lines: vec![ProductionLine::new("residents_eat", vec![(Food, 1)], vec![], 48)],
            buffer_size: 0,
        });
        catalog.add(Blueprint {
            building_type: Lumberjack,
            cost: vec![(Boards, 4), (Tools, 1)],
            lines: vec![ProductionLine::new("chop_wood", vec![], vec![(Boards, 1)], 12)],
            buffer_size: 8,
        });
        catalog.add(Blueprint {
            building_type: Fisher,
            cost: vec![(Boards, 4), (Tools, 1)],
            lines: vec![ProductionLine::new("catch_fish", vec![], vec![(Food, 1)], 16)],
            buffer_size: 8,
        });
        catalog.add(Blueprint {
            building_type: PotatoField,
            cost: vec![(Boards, 3)],
            lines: vec![ProductionLine::new("grow_potatoes", vec![], vec![(Food, 1)], 24)],
            buffer_size: 8,
        });
        catalog.add(Blueprint {
            building_type: ClayPit,
            cost: vec![(Boards, 6), (Tools, 1)],
            lines: vec![ProductionLine::new("dig_clay", vec![], vec![(Clay, 1)], 20)],
            buffer_size: 8,
        });
        catalog.add(Blueprint {
            building_type: Brickyard,
            cost: vec![(Boards, 8), (Tools, 2)],
            lines: vec![ProductionLine::new("burn_bricks", vec![(Clay, 2)], vec![(Bricks, 1)], 30)],
            buffer_size: 8,
        });

        catalog
    }

    /// Add a blueprint, replacing an existing one for the same building type
    pub fn add(&mut self, blueprint: Blueprint) {
        self.blueprints
            .retain(|b| b.building_type != blueprint.building_type);
        self.blueprints.push(blueprint);
    }

    /// Get the blueprint for a building type
    pub fn get(&self, building_type: BuildingType) -> Option<&Blueprint> {
        self.blueprints.iter().find(|b| b.building_type == building_type)
    }

    /// Get all blueprints
    pub fn all(&self) -> &[Blueprint] {
        &self.blueprints
    }

    /// Load blueprints from a TOML file, on top of the defaults
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, BlueprintLoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BlueprintLoadError::IoError(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse blueprints from a TOML string, on top of the defaults
    pub fn parse_toml(content: &str) -> Result<Self, BlueprintLoadError> {
        let toml_data: TomlBlueprints = toml::from_str(content)
            .map_err(|e| BlueprintLoadError::ParseError(e.to_string()))?;

        let mut catalog = Self::with_defaults();
        for blueprint in toml_data.blueprints {
            catalog.add(blueprint.into_blueprint()?);
        }
        Ok(catalog)
    }
}

/// Error type for blueprint loading
#[derive(Debug, Clone)]
pub enum BlueprintLoadError {
    IoError(String),
    ParseError(String),
    InvalidBuildingType(String),
    InvalidResourceType(String),
}

impl std::fmt::Display for BlueprintLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlueprintLoadError::IoError(e) => write!(f, "IO error: {}", e),
            BlueprintLoadError::ParseError(e) => write!(f, "Parse error: {}", e),
            BlueprintLoadError::InvalidBuildingType(e) => write!(f, "Invalid building type: {}", e),
            BlueprintLoadError::InvalidResourceType(e) => write!(f, "Invalid resource type: {}", e),
        }
    }
}

impl std::error::Error for BlueprintLoadError {}

/// TOML representation of a blueprints file
#[derive(Debug, Deserialize)]
struct TomlBlueprints {
    blueprints: Vec<TomlBlueprint>,
}

#[derive(Debug, Deserialize)]
struct TomlBlueprint {
    building_type: String,
    #[serde(default)]
    cost: Vec<TomlResourceAmount>,
    #[serde(default)]
    lines: Vec<TomlLine>,
    #[serde(default)]
    buffer_size: u32,
}

#[derive(Debug, Deserialize)]
struct TomlLine {
    id: String,
    #[serde(default)]
    consumed: Vec<TomlResourceAmount>,
    #[serde(default)]
    produced: Vec<TomlResourceAmount>,
    cycle_ticks: u32,
}

#[derive(Debug, Deserialize)]
struct TomlResourceAmount {
    resource: String,
    amount: u32,
}

impl TomlBlueprint {
    fn into_blueprint(self) -> Result<Blueprint, BlueprintLoadError> {
        let building_type = BuildingType::from_name(&self.building_type)
            .ok_or(BlueprintLoadError::InvalidBuildingType(self.building_type))?;

        let cost = resource_amounts(self.cost)?;
        let lines = self
            .lines
            .into_iter()
            .map(|line| -> Result<ProductionLine, BlueprintLoadError> {
                Ok(ProductionLine::new(
                    line.id,
                    resource_amounts(line.consumed)?,
                    resource_amounts(line.produced)?,
                    line.cycle_ticks,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Blueprint {
            building_type,
            cost,
            lines,
            buffer_size: self.buffer_size,
        })
    }
}

fn resource_amounts(
    amounts: Vec<TomlResourceAmount>,
) -> Result<Vec<(ResourceType, u32)>, BlueprintLoadError> {
    amounts
        .into_iter()
        .map(|ra| {
            ResourceType::from_name(&ra.resource)
                .map(|r| (r, ra.amount))
                .ok_or(BlueprintLoadError::InvalidResourceType(ra.resource))
        })
        .collect()
}
