//! Production control - pause producers whose output has nowhere to go
//!
//! A process whose output buffer is full for every produced resource is
//! paused; a paused process with room again is resumed. Decisions are made
//! on a snapshot of the settlement and issued afterwards as economy
//! commands.

use tracing::info;

use crate::city::building::{BuildingRole, BuildingType};
use crate::core::error::Result;
use crate::core::types::{BuildingId, SettlementId};
use crate::simulation::economy::EconomyCommands;
use crate::simulation::settlement::Settlement;
use crate::simulation::world::World;

/// One pause or resume request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionToggle {
    pub building: BuildingId,
    pub building_type: BuildingType,
    pub process: usize,
    /// True to pause, false to resume
    pub pause: bool,
}

pub struct ProductionController;

impl ProductionController {
    /// Toggles needed to bring every producer in line with its buffer state
    pub fn plan(settlement: &Settlement) -> Vec<ProductionToggle> {
        let mut toggles = Vec::new();

        for building in settlement.buildings_with_role(BuildingRole::Production) {
            for (process, production) in building.productions.iter().enumerate() {
                if production.line.produced.is_empty() {
                    continue;
                }
                let full = production.outputs_full();
                if full != production.is_paused() {
                    toggles.push(ProductionToggle {
                        building: building.id,
                        building_type: building.building_type,
                        process,
                        pause: full,
                    });
                }
            }
        }

        toggles
    }
}

/// Run one control pass over a settlement, returning the toggles issued
pub fn manage_production(world: &mut World, settlement: SettlementId, label: &str) -> Result<Vec<ProductionToggle>> {
    let toggles = ProductionController::plan(world.settlement(settlement)?);

    for toggle in &toggles {
        world.toggle_production_active(toggle.building, toggle.process)?;
        let verb = if toggle.pause { "paused" } else { "resumed" };
        info!(
            "{} {} a production at {}/{}",
            label,
            verb,
            toggle.building_type.name(),
            toggle.building
        );
    }

    Ok(toggles)
}
