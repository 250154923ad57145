//! Resource balance - production and consumption rates from live building state

use crate::ai::builders::VillageBuilder;
use crate::city::building::BuildingRole;
use crate::city::resource::ResourceType;
use crate::core::config::AiConfig;
use crate::simulation::settlement::Settlement;

/// Aggregated production of one resource
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceFlow {
    /// Units per tick
    pub amount: f32,
    /// Producers whose measured rate was used
    pub mature: u32,
    /// Producers still on their modelled rate
    pub ramping: u32,
}

/// Read-only view over a settlement and its village plan
pub struct ResourceBalanceTracker<'a> {
    settlement: &'a Settlement,
    village: &'a VillageBuilder,
    maturity_threshold: usize,
}

impl<'a> ResourceBalanceTracker<'a> {
    pub fn new(settlement: &'a Settlement, village: &'a VillageBuilder, maturity_threshold: usize) -> Self {
        Self {
            settlement,
            village,
            maturity_threshold,
        }
    }

    pub fn production_rate(&self, resource: ResourceType) -> ResourceFlow {
        let mut flow = ResourceFlow::default();

        for building in self.settlement.buildings_with_role(BuildingRole::Production) {
            match building.history_length(resource) {
                None => continue,
                Some(len) if len < self.maturity_threshold => {
                    flow.amount += building.expected_production_level(resource);
                    flow.ramping += 1;
                }
                Some(_) => {
                    flow.amount += building.absolute_production_level(resource);
                    flow.mature += 1;
                }
            }
        }

        flow
    }

    /// Units per tick eaten by the built residences, as a positive number
    pub fn consumption_rate(&self, resource: ResourceType) -> f32 {
        self.village
            .residences()
            .filter_map(|id| self.settlement.building(id))
            .flat_map(|b| b.productions.iter())
            .filter(|p| !p.is_paused())
            .map(|p| p.line.consumption_rate(resource))
            .sum()
    }

    /// Net balance, positive when production outruns consumption
    pub fn net_balance(&self, resource: ResourceType) -> f32 {
        self.production_rate(resource).amount - self.consumption_rate(resource)
    }
}

/// Whether food needs no further producers
///
/// Either production covers consumption with a safety margin, or the
/// storage already holds a comfortable buffer.
pub fn enough_food(production: f32, consumption: f32, storage_used: f32, capacity: f32, config: &AiConfig) -> bool {
    let need = consumption * config.food_margin_factor + config.food_margin_epsilon;
    let buffer = capacity * config.storage_buffer_ratio + config.storage_buffer_constant;
    production >= need || storage_used >= buffer
}
