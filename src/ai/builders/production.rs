//! Production area builder
//!
//! Hands out the land allocation's production plots first come first served
//! and remembers what it put on them.

use serde::{Deserialize, Serialize};

use crate::city::blueprint::BlueprintCatalog;
use crate::city::building::{BuildingRole, BuildingType};
use crate::city::construction::{BuildCommand, BuildResult, PlacementHint};
use crate::core::types::{BuildingId, Coord};
use crate::simulation::settlement::Settlement;
use crate::simulation::world::LandAllocation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionBuilder {
    plots: Vec<Coord>,
    /// Everything this builder placed, in build order
    buildings: Vec<(BuildingId, BuildingType)>,
}

impl ProductionBuilder {
    pub fn new(land: &LandAllocation) -> Self {
        Self {
            plots: land.production_plots.clone(),
            buildings: Vec::new(),
        }
    }

    pub fn buildings(&self) -> &[(BuildingId, BuildingType)] {
        &self.buildings
    }

    pub fn count(&self, building_type: BuildingType) -> usize {
        self.buildings
            .iter()
            .filter(|(_, t)| *t == building_type)
            .count()
    }

    pub fn count_fishers(&self) -> usize {
        self.count(BuildingType::Fisher)
    }

    pub fn count_potato_fields(&self) -> usize {
        self.count(BuildingType::PotatoField)
    }

    /// Whether every production building of the settlement is within reach
    /// of a collector
    pub fn enough_collectors(&self, settlement: &Settlement, collectors_per_storage: usize) -> bool {
        let producers = settlement.buildings_with_role(BuildingRole::Production).count();
        producers <= settlement.collector_slots(collectors_per_storage)
    }

    pub fn improve_collector_coverage(&mut self, settlement: &mut Settlement, catalog: &BlueprintCatalog) -> BuildResult {
        self.build(BuildingType::Storage, settlement, catalog)
    }

    /// Fisher while fish deposits outnumber fishers, potato field otherwise
    pub fn build_food_producer(
        &mut self,
        settlement: &mut Settlement,
        catalog: &BlueprintCatalog,
    ) -> (BuildingType, BuildResult) {
        let deposits = settlement.count_buildings(BuildingType::FishDeposit);
        let fishers = settlement.count_buildings(BuildingType::Fisher);
        let producer = if deposits > fishers {
            BuildingType::Fisher
        } else {
            BuildingType::PotatoField
        };
        (producer, self.build(producer, settlement, catalog))
    }

    pub fn build_lumberjack(&mut self, settlement: &mut Settlement, catalog: &BlueprintCatalog) -> BuildResult {
        self.build(BuildingType::Lumberjack, settlement, catalog)
    }

    pub fn build_clay_pit(&mut self, settlement: &mut Settlement, catalog: &BlueprintCatalog) -> BuildResult {
        self.build(BuildingType::ClayPit, settlement, catalog)
    }

    pub fn build_brickyard(&mut self, settlement: &mut Settlement, catalog: &BlueprintCatalog) -> BuildResult {
        self.build(BuildingType::Brickyard, settlement, catalog)
    }

    fn build(
        &mut self,
        building_type: BuildingType,
        settlement: &mut Settlement,
        catalog: &BlueprintCatalog,
    ) -> BuildResult {
        let Some(plot) = self
            .plots
            .iter()
            .copied()
            .find(|plot| !settlement.is_occupied(*plot))
        else {
            return BuildResult::Failed;
        };
        let Some(blueprint) = catalog.get(building_type) else {
            return BuildResult::Failed;
        };

        let result = blueprint.attempt_build(settlement, PlacementHint::at(plot));
        if result == BuildResult::Ok {
            if let Some(building) = settlement.building_at(plot) {
                self.buildings.push((building.id, building_type));
            }
        }
        result
    }
}
