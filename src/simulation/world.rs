//! World - owns every settlement and land allocation
//!
//! Agents never hold settlements directly; they keep ids and resolve them
//! here for the duration of one operation.

use serde::{Deserialize, Serialize};

use crate::core::error::{AiError, Result};
use crate::core::types::{BuildingId, Coord, IslandId, LandId, PlayerId, SettlementId};
use crate::simulation::economy::EconomyCommands;
use crate::simulation::settlement::Settlement;

/// Plots an AI player may build on, split by purpose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandAllocation {
    pub id: LandId,
    pub owner: PlayerId,
    pub island: IslandId,
    /// Plots reserved for the village layout, in layout order
    pub village_plots: Vec<Coord>,
    /// Plots handed out to production buildings, in preference order
    pub production_plots: Vec<Coord>,
}

/// The game world containing all settlements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    settlements: Vec<Settlement>,
    lands: Vec<LandAllocation>,
    next_settlement: u64,
    next_land: u64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_settlement(
        &mut self,
        owner: PlayerId,
        island: IslandId,
        name: impl Into<String>,
        history_window: usize,
    ) -> SettlementId {
        let id = SettlementId(self.next_settlement);
        self.next_settlement += 1;
        self.settlements
            .push(Settlement::new(id, owner, island, name, history_window));
        id
    }

    pub fn add_land(
        &mut self,
        owner: PlayerId,
        island: IslandId,
        village_plots: Vec<Coord>,
        production_plots: Vec<Coord>,
    ) -> LandId {
        let id = LandId(self.next_land);
        self.next_land += 1;
        self.lands.push(LandAllocation {
            id,
            owner,
            island,
            village_plots,
            production_plots,
        });
        id
    }

    pub fn settlement(&self, id: SettlementId) -> Result<&Settlement> {
        self.settlements
            .iter()
            .find(|s| s.id == id)
            .ok_or(AiError::SettlementNotFound(id))
    }

    pub fn settlement_mut(&mut self, id: SettlementId) -> Result<&mut Settlement> {
        self.settlements
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AiError::SettlementNotFound(id))
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    pub fn settlements_mut(&mut self) -> impl Iterator<Item = &mut Settlement> + '_ {
        self.settlements.iter_mut()
    }

    pub fn land(&self, id: LandId) -> Result<&LandAllocation> {
        self.lands
            .iter()
            .find(|l| l.id == id)
            .ok_or(AiError::LandNotFound(id))
    }

    /// Scan for the settlement a player holds on the land's island
    pub fn resolve_settlement(&self, land: LandId) -> Result<SettlementId> {
        let allocation = self.land(land)?;
        self.settlements
            .iter()
            .find(|s| s.owner == allocation.owner && s.island == allocation.island)
            .map(|s| s.id)
            .ok_or(AiError::SettlementUnresolved {
                land,
                owner: allocation.owner,
            })
    }

    /// Remove a settlement and the land allocations pointing at it
    pub fn remove_settlement(&mut self, id: SettlementId) -> Result<Settlement> {
        let index = self
            .settlements
            .iter()
            .position(|s| s.id == id)
            .ok_or(AiError::SettlementNotFound(id))?;
        let settlement = self.settlements.remove(index);
        self.lands
            .retain(|l| !(l.owner == settlement.owner && l.island == settlement.island));
        Ok(settlement)
    }

    /// Rebuild derived lookup tables after deserialization
    pub fn rebuild_indices(&mut self) {
        for settlement in self.settlements.iter_mut() {
            settlement.rebuild_ground_map();
        }
    }
}

impl EconomyCommands for World {
    fn set_tax_rate(&mut self, settlement: SettlementId, rate: f32) -> Result<()> {
        self.settlement_mut(settlement)?.tax_rate = rate;
        Ok(())
    }

    fn toggle_production_active(&mut self, building: BuildingId, process: usize) -> Result<()> {
        let production = self
            .settlement_mut(building.settlement)?
            .building_mut(building)
            .ok_or(AiError::BuildingNotFound(building))?
            .productions
            .get_mut(process)
            .ok_or(AiError::ProcessNotFound { building, process })?;
        production.toggle_active();
        Ok(())
    }
}
