//! City layer - buildings, blueprints, construction, and production

pub mod blueprint;
pub mod building;
pub mod construction;
pub mod production;
pub mod resource;
pub mod stockpile;

pub use blueprint::{Blueprint, BlueprintCatalog, BlueprintLoadError};
pub use building::{Building, BuildingRole, BuildingType};
pub use construction::{BuildCommand, BuildResult, PlacementHint};
pub use production::{collect_goods, tick_production, Production, ProductionLine};
pub use resource::ResourceType;
pub use stockpile::Stockpile;
