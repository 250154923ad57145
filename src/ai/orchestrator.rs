//! Build orchestrator - the per-settlement decision engine
//!
//! Each tick the orchestrator:
//! 1. Runs the production control pass
//! 2. Takes a snapshot of the settlement and evaluates the decision ladder
//! 3. Executes at most one build action
//!
//! Exactly one call for the next tick is registered up front.
//!
//! The ladder is a fixed priority list. Queued tasks always win; after
//! that come collector coverage, food, housing, and the clay economy.

use std::fmt;

use tracing::{debug, info};

use crate::ai::balance::{enough_food, ResourceBalanceTracker};
use crate::ai::builders::{ProductionBuilder, VillageBuilder};
use crate::ai::production_control::manage_production;
use crate::ai::task_queue::{BuildTaskQueue, TaskKind};
use crate::city::blueprint::BlueprintCatalog;
use crate::city::building::BuildingType;
use crate::city::construction::BuildResult;
use crate::city::resource::ResourceType;
use crate::core::config::AiConfig;
use crate::core::error::Result;
use crate::core::types::{BuildingId, LandId, OrchestratorId, PlayerId, SettlementId, Tick};
use crate::scheduler::{Callback, SchedulerPort};
use crate::simulation::economy::EconomyCommands;
use crate::simulation::settlement::Settlement;
use crate::simulation::world::World;

/// Everything a tick may touch, passed in by the driver
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub scheduler: &'a mut dyn SchedulerPort,
    pub catalog: &'a BlueprintCatalog,
    pub config: &'a AiConfig,
}

/// Ladder branch chosen for a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    QueuedTask(TaskKind),
    CollectorCoverage,
    FoodProducer,
    Pavilion,
    Tent,
    ClayPit,
    Brickyard,
    VillageSchool,
    Idle,
}

/// Snapshot the ladder decides on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderInputs {
    pub queue_front: Option<TaskKind>,
    pub enough_collectors: bool,
    pub enough_food: bool,
    pub tents_built: usize,
    pub pavilion_tent_threshold: usize,
    pub pavilions_remaining: usize,
    pub tents_to_build: usize,
    pub clay_pits: usize,
    pub clay_deposits: usize,
    pub brickyards: usize,
    pub village_schools: usize,
}

/// First applicable ladder branch
pub fn choose_action(inputs: &LadderInputs) -> Decision {
    if let Some(task) = inputs.queue_front {
        Decision::QueuedTask(task)
    } else if !inputs.enough_collectors {
        Decision::CollectorCoverage
    } else if !inputs.enough_food {
        Decision::FoodProducer
    } else if inputs.tents_built >= inputs.pavilion_tent_threshold && inputs.pavilions_remaining > 0 {
        Decision::Pavilion
    } else if inputs.tents_built < inputs.tents_to_build {
        Decision::Tent
    } else if inputs.clay_pits == 0 && inputs.clay_deposits > 0 {
        Decision::ClayPit
    } else if inputs.clay_pits > 0 && inputs.brickyards == 0 {
        Decision::Brickyard
    } else if inputs.village_schools == 0 {
        Decision::VillageSchool
    } else {
        Decision::Idle
    }
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    pub decision: Decision,
    /// `None` when no build was attempted
    pub result: Option<BuildResult>,
    /// Pause/resume commands issued by the control pass
    pub toggles: usize,
    pub active: bool,
}

/// Autonomous builder for one settlement
#[derive(Debug, Clone)]
pub struct BuildOrchestrator {
    id: OrchestratorId,
    owner: PlayerId,
    land: LandId,
    settlement: SettlementId,
    label: String,
    trade_post: BuildingId,
    queue: BuildTaskQueue,
    tents_built: usize,
    fishers_built: usize,
    potato_fields_built: usize,
    village_complete: bool,
    village: VillageBuilder,
    production: ProductionBuilder,
}

impl BuildOrchestrator {
    /// Take control of the settlement on the given land allocation
    ///
    /// Seeds the task queue, sets the initial tax rate and registers the
    /// first tick.
    pub fn new(
        id: OrchestratorId,
        land: LandId,
        trade_post: BuildingId,
        ctx: &mut TickContext<'_>,
    ) -> Result<Self> {
        let allocation = ctx.world.land(land)?.clone();
        let settlement = ctx.world.resolve_settlement(land)?;
        let label = ctx.world.settlement(settlement)?.name.clone();

        let orchestrator = Self {
            id,
            owner: allocation.owner,
            land,
            settlement,
            label,
            trade_post,
            queue: BuildTaskQueue::seeded(),
            tents_built: 0,
            fishers_built: 0,
            potato_fields_built: 0,
            village_complete: false,
            village: VillageBuilder::new(&allocation, ctx.config),
            production: ProductionBuilder::new(&allocation),
        };

        ctx.scheduler
            .schedule(Callback::SettlementTick, id, ctx.config.first_tick_offset, 0, 0);
        ctx.world.set_tax_rate(settlement, ctx.config.initial_tax_rate)?;
        info!("{} set tax rate to {}", orchestrator, ctx.config.initial_tax_rate);

        Ok(orchestrator)
    }

    /// Rebuild from persisted parts, deriving counters from the builders
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: OrchestratorId,
        owner: PlayerId,
        land: LandId,
        settlement: SettlementId,
        label: String,
        trade_post: BuildingId,
        queue: BuildTaskQueue,
        village: VillageBuilder,
        production: ProductionBuilder,
    ) -> Self {
        let tents_built = village.count_tents();
        Self {
            id,
            owner,
            land,
            settlement,
            label,
            trade_post,
            queue,
            tents_built,
            fishers_built: production.count_fishers(),
            potato_fields_built: production.count_potato_fields(),
            village_complete: tents_built == village.tents_to_build(),
            village,
            production,
        }
    }

    /// One decision pass
    ///
    /// The next tick is registered before anything fallible runs, so a
    /// failing pass still leaves exactly one pending call.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<TickReport> {
        self.schedule_next(ctx.scheduler, ctx.config);

        let toggles = manage_production(ctx.world, self.settlement, &self.to_string())?.len();

        let settlement = ctx.world.settlement_mut(self.settlement)?;
        let inputs = self.ladder_inputs(settlement, ctx.config);
        let decision = choose_action(&inputs);
        let result = self.execute(decision, settlement, ctx.catalog);

        let active = match (decision, result) {
            (Decision::QueuedTask(_), _) => true,
            (_, Some(result)) => result.keeps_active(),
            (_, None) => false,
        };

        if !active {
            self.village_complete = true;
        }

        Ok(TickReport {
            tick: ctx.scheduler.current_tick(),
            decision,
            result,
            toggles,
            active,
        })
    }

    /// Stop ticking; the settlement is going away
    pub fn end(&self, scheduler: &mut dyn SchedulerPort) -> usize {
        let canceled = scheduler.cancel(self.id, Callback::SettlementTick);
        info!("{} ended", self);
        canceled
    }

    /// Whether the village is done and surplus can be handed out
    pub fn can_provide_resources(&self) -> bool {
        self.village_complete
    }

    pub fn count_buildings(&self, world: &World, building_type: BuildingType) -> Result<usize> {
        Ok(world.settlement(self.settlement)?.count_buildings(building_type))
    }

    pub fn id(&self) -> OrchestratorId {
        self.id
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn land(&self) -> LandId {
        self.land
    }

    pub fn settlement(&self) -> SettlementId {
        self.settlement
    }

    pub fn trade_post(&self) -> BuildingId {
        self.trade_post
    }

    pub fn queue(&self) -> &BuildTaskQueue {
        &self.queue
    }

    pub fn tents_built(&self) -> usize {
        self.tents_built
    }

    pub fn fishers_built(&self) -> usize {
        self.fishers_built
    }

    pub fn potato_fields_built(&self) -> usize {
        self.potato_fields_built
    }

    pub fn village_complete(&self) -> bool {
        self.village_complete
    }

    pub fn village(&self) -> &VillageBuilder {
        &self.village
    }

    pub fn production(&self) -> &ProductionBuilder {
        &self.production
    }

    fn ladder_inputs(&self, settlement: &Settlement, config: &AiConfig) -> LadderInputs {
        let tracker = ResourceBalanceTracker::new(settlement, &self.village, config.maturity_threshold);
        let production = tracker.production_rate(ResourceType::Food);
        let consumption = tracker.consumption_rate(ResourceType::Food);
        debug!(
            "{} food production {:.5} / {:.5} ({} mature, {} ramping)",
            self, production.amount, consumption, production.mature, production.ramping
        );

        let food_used = settlement.stockpile.get(ResourceType::Food) as f32;
        let food_capacity = settlement.stockpile.capacity(ResourceType::Food) as f32;

        LadderInputs {
            queue_front: self.queue.front(),
            enough_collectors: self
                .production
                .enough_collectors(settlement, config.collectors_per_storage),
            enough_food: enough_food(production.amount, consumption, food_used, food_capacity, config),
            tents_built: self.tents_built,
            pavilion_tent_threshold: config.pavilion_tent_threshold,
            pavilions_remaining: self.village.pavilions_to_build(),
            tents_to_build: self.village.tents_to_build(),
            clay_pits: settlement.count_buildings(BuildingType::ClayPit),
            clay_deposits: settlement.count_buildings(BuildingType::ClayDeposit),
            brickyards: settlement.count_buildings(BuildingType::Brickyard),
            village_schools: settlement.count_buildings(BuildingType::VillageSchool),
        }
    }

    fn execute(
        &mut self,
        decision: Decision,
        settlement: &mut Settlement,
        catalog: &BlueprintCatalog,
    ) -> Option<BuildResult> {
        let (name, result) = match decision {
            Decision::QueuedTask(_) => {
                let task = self.queue.pop_front()?;
                let result = match task {
                    TaskKind::BuildVillageRoads => self.village.build_roads(settlement, catalog),
                    TaskKind::BuildVillageCentralSquare => self.village.build_main_square(settlement, catalog),
                    TaskKind::BuildLumberjack => self.production.build_lumberjack(settlement, catalog),
                };
                (task.name(), result)
            }
            Decision::CollectorCoverage => (
                BuildingType::Storage.name(),
                self.production.improve_collector_coverage(settlement, catalog),
            ),
            Decision::FoodProducer => {
                let (producer, result) = self.production.build_food_producer(settlement, catalog);
                if result == BuildResult::Ok {
                    match producer {
                        BuildingType::Fisher => self.fishers_built += 1,
                        _ => self.potato_fields_built += 1,
                    }
                }
                (producer.name(), result)
            }
            Decision::Pavilion => (
                BuildingType::Pavilion.name(),
                self.village.build_pavilion(settlement, catalog),
            ),
            Decision::Tent => {
                let result = self.village.build_tent(settlement, catalog);
                if result == BuildResult::Ok {
                    self.tents_built += 1;
                }
                (BuildingType::Tent.name(), result)
            }
            Decision::ClayPit => (
                BuildingType::ClayPit.name(),
                self.production.build_clay_pit(settlement, catalog),
            ),
            Decision::Brickyard => (
                BuildingType::Brickyard.name(),
                self.production.build_brickyard(settlement, catalog),
            ),
            Decision::VillageSchool => (
                BuildingType::VillageSchool.name(),
                self.village.build_village_school(settlement, catalog),
            ),
            Decision::Idle => return None,
        };

        match result {
            BuildResult::Ok => info!("{} built a {}", self, name),
            BuildResult::NeedResources => info!("{} not enough materials to build a {}", self, name),
            BuildResult::Failed => info!("{} failed to build a {}", self, name),
        }
        Some(result)
    }

    fn schedule_next(&self, scheduler: &mut dyn SchedulerPort, config: &AiConfig) {
        scheduler.cancel(self.id, Callback::SettlementTick);
        scheduler.schedule(Callback::SettlementTick, self.id, config.tick_interval, 0, 0);
    }
}

impl fmt::Display for BuildOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.SM({}/{})", self.owner, self.label, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled() -> LadderInputs {
        LadderInputs {
            queue_front: None,
            enough_collectors: true,
            enough_food: true,
            tents_built: 16,
            pavilion_tent_threshold: 10,
            pavilions_remaining: 0,
            tents_to_build: 16,
            clay_pits: 1,
            clay_deposits: 1,
            brickyards: 1,
            village_schools: 1,
        }
    }

    #[test]
    fn test_queue_preempts_everything() {
        let inputs = LadderInputs {
            queue_front: Some(TaskKind::BuildLumberjack),
            enough_collectors: false,
            enough_food: false,
            ..settled()
        };
        assert_eq!(choose_action(&inputs), Decision::QueuedTask(TaskKind::BuildLumberjack));
    }

    #[test]
    fn test_collectors_before_food() {
        let inputs = LadderInputs {
            enough_collectors: false,
            enough_food: false,
            ..settled()
        };
        assert_eq!(choose_action(&inputs), Decision::CollectorCoverage);
    }

    #[test]
    fn test_pavilion_needs_tent_threshold() {
        let below = LadderInputs {
            tents_built: 9,
            pavilions_remaining: 2,
            ..settled()
        };
        assert_eq!(choose_action(&below), Decision::Tent);

        let at = LadderInputs {
            tents_built: 10,
            pavilions_remaining: 2,
            ..settled()
        };
        assert_eq!(choose_action(&at), Decision::Pavilion);
    }

    #[test]
    fn test_clay_chain_then_school() {
        let no_pit = LadderInputs {
            clay_pits: 0,
            brickyards: 0,
            ..settled()
        };
        assert_eq!(choose_action(&no_pit), Decision::ClayPit);

        let no_deposit = LadderInputs {
            clay_deposits: 0,
            ..no_pit
        };
        assert_eq!(
            choose_action(&LadderInputs {
                village_schools: 0,
                ..no_deposit
            }),
            Decision::VillageSchool
        );

        let no_yard = LadderInputs {
            brickyards: 0,
            ..settled()
        };
        assert_eq!(choose_action(&no_yard), Decision::Brickyard);
    }

    #[test]
    fn test_nothing_left_is_idle() {
        assert_eq!(choose_action(&settled()), Decision::Idle);
    }
}
