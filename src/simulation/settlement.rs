//! Settlement - buildings, inventory, and ground map of one colony

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::city::blueprint::Blueprint;
use crate::city::building::{Building, BuildingRole, BuildingType};
use crate::city::production::{collect_goods, tick_production, ProductionResult};
use crate::city::resource::ResourceType;
use crate::city::stockpile::Stockpile;
use crate::core::types::{BuildingId, Coord, IslandId, PlayerId, SettlementId};

/// Stockpile capacity each storage building adds per resource
pub const STORAGE_PER_DEPOT: u32 = 30;

/// A settlement owned by one player on one island
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub owner: PlayerId,
    pub island: IslandId,
    pub name: String,
    pub stockpile: Stockpile,
    pub tax_rate: f32,
    history_window: usize,
    /// Buildings in spawn order; ids are ascending
    buildings: Vec<Building>,
    next_index: u32,
    /// Plot -> position in `buildings`, rebuilt after loading
    #[serde(skip)]
    ground: BTreeMap<Coord, usize>,
}

impl Settlement {
    pub fn new(
        id: SettlementId,
        owner: PlayerId,
        island: IslandId,
        name: impl Into<String>,
        history_window: usize,
    ) -> Self {
        Self {
            id,
            owner,
            island,
            name: name.into(),
            stockpile: Stockpile::new(),
            tax_rate: 0.0,
            history_window,
            buildings: Vec::new(),
            next_index: 0,
            ground: BTreeMap::new(),
        }
    }

    /// Place a building from a blueprint without charging its cost
    pub fn spawn_building(&mut self, blueprint: &Blueprint, position: Coord) -> BuildingId {
        let id = BuildingId {
            settlement: self.id,
            index: self.next_index,
        };
        self.next_index += 1;

        let building = blueprint.instantiate(id, position, self.history_window);
        let is_storage = building.role == BuildingRole::Storage;
        self.ground.insert(position, self.buildings.len());
        self.buildings.push(building);

        if is_storage {
            self.recompute_storage_limits();
        }
        id
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        if id.settlement != self.id {
            return None;
        }
        self.buildings
            .binary_search_by_key(&id.index, |b| b.id.index)
            .ok()
            .map(|i| &self.buildings[i])
    }

    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        if id.settlement != self.id {
            return None;
        }
        match self.buildings.binary_search_by_key(&id.index, |b| b.id.index) {
            Ok(i) => Some(&mut self.buildings[i]),
            Err(_) => None,
        }
    }

    pub fn building_at(&self, plot: Coord) -> Option<&Building> {
        self.ground.get(&plot).map(|&i| &self.buildings[i])
    }

    pub fn is_occupied(&self, plot: Coord) -> bool {
        self.ground.contains_key(&plot)
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn buildings_with_role(&self, role: BuildingRole) -> impl Iterator<Item = &Building> + '_ {
        self.buildings.iter().filter(move |b| b.role == role)
    }

    pub fn buildings_by_type(
        &self,
        building_type: BuildingType,
    ) -> impl Iterator<Item = &Building> + '_ {
        self.buildings
            .iter()
            .filter(move |b| b.building_type == building_type)
    }

    pub fn count_buildings(&self, building_type: BuildingType) -> usize {
        self.buildings_by_type(building_type).count()
    }

    /// Production buildings the storage network can serve
    pub fn collector_slots(&self, collectors_per_storage: usize) -> usize {
        self.buildings_with_role(BuildingRole::Storage).count() * collectors_per_storage
    }

    /// Run one tick of production and collection
    pub fn step_production(&mut self, collectors_per_storage: usize) -> Vec<ProductionResult> {
        let slots = self.collector_slots(collectors_per_storage);
        let results = tick_production(&mut self.buildings, &mut self.stockpile);
        collect_goods(&mut self.buildings, &mut self.stockpile, slots);
        results
    }

    /// Rebuild the ground map from building positions
    pub fn rebuild_ground_map(&mut self) {
        self.ground = self
            .buildings
            .iter()
            .enumerate()
            .map(|(i, b)| (b.position, i))
            .collect();
    }

    fn recompute_storage_limits(&mut self) {
        let depots = self.buildings_with_role(BuildingRole::Storage).count() as u32;
        for res in ResourceType::ALL {
            self.stockpile.set_capacity(res, depots * STORAGE_PER_DEPOT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::blueprint::BlueprintCatalog;

    fn settlement() -> Settlement {
        Settlement::new(SettlementId(4), PlayerId(1), IslandId(2), "Northwick", 64)
    }

    #[test]
    fn test_spawn_assigns_ascending_ids() {
        let catalog = BlueprintCatalog::with_defaults();
        let mut settlement = settlement();
        let a = settlement.spawn_building(catalog.get(BuildingType::Road).unwrap(), Coord::new(0, 0));
        let b = settlement.spawn_building(catalog.get(BuildingType::Tent).unwrap(), Coord::new(1, 0));

        assert!(a < b);
        assert_eq!(settlement.building(b).map(|b| b.building_type), Some(BuildingType::Tent));
        assert!(settlement.building(BuildingId { settlement: SettlementId(9), index: 0 }).is_none());
    }

    #[test]
    fn test_storage_raises_limits() {
        let catalog = BlueprintCatalog::with_defaults();
        let mut settlement = settlement();
        assert_eq!(settlement.stockpile.capacity(ResourceType::Food), 0);

        settlement.spawn_building(catalog.get(BuildingType::TradePost).unwrap(), Coord::new(0, 0));
        assert_eq!(settlement.stockpile.capacity(ResourceType::Food), STORAGE_PER_DEPOT);

        settlement.spawn_building(catalog.get(BuildingType::Storage).unwrap(), Coord::new(5, 0));
        assert_eq!(settlement.stockpile.capacity(ResourceType::Bricks), 2 * STORAGE_PER_DEPOT);
        assert_eq!(settlement.collector_slots(6), 12);
    }

    #[test]
    fn test_ground_map_rebuilt_after_roundtrip() {
        let catalog = BlueprintCatalog::with_defaults();
        let mut settlement = settlement();
        settlement.spawn_building(catalog.get(BuildingType::Fisher).unwrap(), Coord::new(3, 3));

        let json = serde_json::to_string(&settlement).unwrap();
        let mut restored: Settlement = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_occupied(Coord::new(3, 3)));

        restored.rebuild_ground_map();
        assert_eq!(
            restored.building_at(Coord::new(3, 3)).map(|b| b.building_type),
            Some(BuildingType::Fisher)
        );
    }

    #[test]
    fn test_step_production_collects_into_stockpile() {
        let catalog = BlueprintCatalog::with_defaults();
        let mut settlement = settlement();
        settlement.spawn_building(catalog.get(BuildingType::TradePost).unwrap(), Coord::new(0, 0));
        settlement.spawn_building(catalog.get(BuildingType::Lumberjack).unwrap(), Coord::new(1, 0));

        // chop_wood cycles every 12 ticks
        for _ in 0..24 {
            settlement.step_production(6);
        }

        assert_eq!(settlement.stockpile.get(ResourceType::Boards), 2);
    }
}
