//! Village layout builder
//!
//! Lays the village out once, on the land allocation's village plots, and
//! then builds the planned structures one call at a time. The plan records
//! which entries are built, which makes it the authoritative source for the
//! housing count after a reload.

use serde::{Deserialize, Serialize};

use crate::city::blueprint::BlueprintCatalog;
use crate::city::building::BuildingType;
use crate::city::construction::{BuildCommand, BuildResult, PlacementHint};
use crate::core::config::AiConfig;
use crate::core::types::{BuildingId, Coord};
use crate::simulation::settlement::Settlement;
use crate::simulation::world::LandAllocation;

/// What a village plot is reserved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purpose {
    Road,
    MainSquare,
    Tent,
    Pavilion,
    VillageSchool,
}

impl Purpose {
    pub fn building_type(self) -> BuildingType {
        match self {
            Purpose::Road => BuildingType::Road,
            Purpose::MainSquare => BuildingType::MainSquare,
            Purpose::Tent => BuildingType::Tent,
            Purpose::Pavilion => BuildingType::Pavilion,
            Purpose::VillageSchool => BuildingType::VillageSchool,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub plot: Coord,
    pub purpose: Purpose,
    pub built: Option<BuildingId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillageBuilder {
    plan: Vec<PlanEntry>,
}

impl VillageBuilder {
    /// Lay out roads, main square, school, pavilions, then tents.
    ///
    /// Tents come last so a small allocation loses housing before it loses
    /// the central buildings.
    pub fn new(land: &LandAllocation, config: &AiConfig) -> Self {
        let layout = [
            (Purpose::Road, config.road_plots),
            (Purpose::MainSquare, 1),
            (Purpose::VillageSchool, 1),
            (Purpose::Pavilion, config.pavilions_to_build),
            (Purpose::Tent, config.tents_to_build),
        ];

        let mut plots = land.village_plots.iter().copied();
        let mut plan = Vec::new();
        for (purpose, count) in layout {
            for plot in plots.by_ref().take(count) {
                plan.push(PlanEntry {
                    plot,
                    purpose,
                    built: None,
                });
            }
        }

        Self { plan }
    }

    pub fn plan(&self) -> &[PlanEntry] {
        &self.plan
    }

    /// Tents in the plan, built or not
    pub fn tents_to_build(&self) -> usize {
        self.plan.iter().filter(|e| e.purpose == Purpose::Tent).count()
    }

    /// Planned pavilions not yet built
    pub fn pavilions_to_build(&self) -> usize {
        self.unbuilt(Purpose::Pavilion).count()
    }

    pub fn count_tents(&self) -> usize {
        self.residences().count()
    }

    /// Built residential units
    pub fn residences(&self) -> impl Iterator<Item = BuildingId> + '_ {
        self.plan
            .iter()
            .filter(|e| e.purpose == Purpose::Tent)
            .filter_map(|e| e.built)
    }

    /// Build every planned road; the worst single outcome is reported
    pub fn build_roads(&mut self, settlement: &mut Settlement, catalog: &BlueprintCatalog) -> BuildResult {
        let pending: Vec<usize> = self
            .plan
            .iter()
            .enumerate()
            .filter(|(_, e)| e.purpose == Purpose::Road && e.built.is_none())
            .map(|(i, _)| i)
            .collect();

        let mut outcome = BuildResult::Ok;
        for index in pending {
            match self.build_entry(index, settlement, catalog) {
                BuildResult::Ok => {}
                BuildResult::NeedResources => outcome = BuildResult::NeedResources,
                BuildResult::Failed => {
                    if outcome == BuildResult::Ok {
                        outcome = BuildResult::Failed;
                    }
                }
            }
        }
        outcome
    }

    pub fn build_main_square(&mut self, settlement: &mut Settlement, catalog: &BlueprintCatalog) -> BuildResult {
        self.build_next(Purpose::MainSquare, settlement, catalog)
    }

    pub fn build_tent(&mut self, settlement: &mut Settlement, catalog: &BlueprintCatalog) -> BuildResult {
        self.build_next(Purpose::Tent, settlement, catalog)
    }

    pub fn build_pavilion(&mut self, settlement: &mut Settlement, catalog: &BlueprintCatalog) -> BuildResult {
        self.build_next(Purpose::Pavilion, settlement, catalog)
    }

    pub fn build_village_school(&mut self, settlement: &mut Settlement, catalog: &BlueprintCatalog) -> BuildResult {
        self.build_next(Purpose::VillageSchool, settlement, catalog)
    }

    fn unbuilt(&self, purpose: Purpose) -> impl Iterator<Item = &PlanEntry> + '_ {
        self.plan
            .iter()
            .filter(move |e| e.purpose == purpose && e.built.is_none())
    }

    fn build_next(
        &mut self,
        purpose: Purpose,
        settlement: &mut Settlement,
        catalog: &BlueprintCatalog,
    ) -> BuildResult {
        match self
            .plan
            .iter()
            .position(|e| e.purpose == purpose && e.built.is_none())
        {
            Some(index) => self.build_entry(index, settlement, catalog),
            None => BuildResult::Failed,
        }
    }

    fn build_entry(
        &mut self,
        index: usize,
        settlement: &mut Settlement,
        catalog: &BlueprintCatalog,
    ) -> BuildResult {
        let plot = self.plan[index].plot;
        let Some(blueprint) = catalog.get(self.plan[index].purpose.building_type()) else {
            return BuildResult::Failed;
        };

        let result = blueprint.attempt_build(settlement, PlacementHint::at(plot));
        if result == BuildResult::Ok {
            self.plan[index].built = settlement.building_at(plot).map(|b| b.id);
        }
        result
    }
}
