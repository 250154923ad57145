//! Persistence of orchestrator state across save/load
//!
//! The pending tick is stored as remaining ticks rather than an absolute
//! tick, so a loaded game resumes on the same phase of the decision cycle.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::builders::{ProductionBuilder, VillageBuilder};
use crate::ai::orchestrator::BuildOrchestrator;
use crate::ai::task_queue::BuildTaskQueue;
use crate::core::error::{AiError, Result};
use crate::core::types::{BuildingId, LandId, OrchestratorId, PlayerId, SettlementId, Tick};
use crate::scheduler::{Callback, SchedulerPort};
use crate::simulation::world::World;

/// Persisted form of one orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorRecord {
    pub id: OrchestratorId,
    pub owner: PlayerId,
    pub land: LandId,
    pub settlement: SettlementId,
    pub trade_post: BuildingId,
    /// Ticks until the next decision pass, at least one
    pub remaining_ticks: Tick,
    /// Task codes in queue order
    pub queue: Vec<u8>,
    pub village: VillageBuilder,
    pub production: ProductionBuilder,
}

pub struct PersistenceAdapter;

impl PersistenceAdapter {
    /// Capture an orchestrator and its single pending registration
    pub fn save(orchestrator: &BuildOrchestrator, scheduler: &dyn SchedulerPort) -> Result<OrchestratorRecord> {
        let pending = scheduler.pending_calls(orchestrator.id(), Callback::SettlementTick);
        let remaining = match pending.len() {
            0 => return Err(AiError::MissingRegistration(orchestrator.id())),
            1 => pending.values().next().copied().unwrap_or(1),
            count => {
                return Err(AiError::DuplicateRegistration {
                    id: orchestrator.id(),
                    count,
                })
            }
        };

        Ok(OrchestratorRecord {
            id: orchestrator.id(),
            owner: orchestrator.owner(),
            land: orchestrator.land(),
            settlement: orchestrator.settlement(),
            trade_post: orchestrator.trade_post(),
            remaining_ticks: remaining.max(1) as Tick,
            queue: orchestrator.queue().to_codes(),
            village: orchestrator.village().clone(),
            production: orchestrator.production().clone(),
        })
    }

    /// Rebuild an orchestrator and register its pending tick
    ///
    /// The land must still belong to the saved owner.
    pub fn load(
        record: OrchestratorRecord,
        world: &World,
        scheduler: &mut dyn SchedulerPort,
    ) -> Result<BuildOrchestrator> {
        let queue = BuildTaskQueue::from_codes(&record.queue)?;
        if world.land(record.land)?.owner != record.owner {
            return Err(AiError::SettlementUnresolved {
                land: record.land,
                owner: record.owner,
            });
        }
        let settlement = world.resolve_settlement(record.land)?;
        if settlement != record.settlement {
            warn!(
                "Orchestrator {} saved for settlement {:?}, resolved {:?}",
                record.id, record.settlement, settlement
            );
        }
        let label = world.settlement(settlement)?.name.clone();

        let orchestrator = BuildOrchestrator::restore(
            record.id,
            record.owner,
            record.land,
            settlement,
            label,
            record.trade_post,
            queue,
            record.village,
            record.production,
        );

        scheduler.schedule(
            Callback::SettlementTick,
            record.id,
            record.remaining_ticks.max(1),
            0,
            0,
        );
        debug!("{} loaded, next tick in {}", orchestrator, record.remaining_ticks.max(1));

        Ok(orchestrator)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ai::orchestrator::TickContext;
    use crate::city::blueprint::BlueprintCatalog;
    use crate::city::building::BuildingType;
    use crate::core::config::AiConfig;
    use crate::core::types::{Coord, IslandId};
    use crate::scheduler::{CallId, Scheduler};

    /// Reports a fixed set of pending calls, ignores everything else
    struct FixedPending(Vec<i64>);

    impl SchedulerPort for FixedPending {
        fn current_tick(&self) -> Tick {
            0
        }

        fn schedule(&mut self, _: Callback, _: OrchestratorId, _: Tick, _: u32, _: Tick) -> CallId {
            CallId(0)
        }

        fn cancel(&mut self, _: OrchestratorId, _: Callback) -> usize {
            0
        }

        fn pending_calls(&self, _: OrchestratorId, _: Callback) -> BTreeMap<CallId, i64> {
            self.0
                .iter()
                .enumerate()
                .map(|(i, remaining)| (CallId(i as u64), *remaining))
                .collect()
        }
    }

    fn setup() -> (World, Scheduler, BuildOrchestrator) {
        let config = AiConfig::default();
        let catalog = BlueprintCatalog::with_defaults();
        let mut world = World::new();
        let settlement = world.add_settlement(PlayerId(1), IslandId(2), "Saveholm", config.history_window);
        let trade_post = world
            .settlement_mut(settlement)
            .unwrap()
            .spawn_building(catalog.get(BuildingType::TradePost).unwrap(), Coord::new(0, 0));
        let land = world.add_land(
            PlayerId(1),
            IslandId(2),
            vec![Coord::new(0, 1), Coord::new(1, 1)],
            vec![Coord::new(5, 0)],
        );

        let mut scheduler = Scheduler::new();
        let mut ctx = TickContext {
            world: &mut world,
            scheduler: &mut scheduler,
            catalog: &catalog,
            config: &config,
        };
        let orchestrator = BuildOrchestrator::new(OrchestratorId(0), land, trade_post, &mut ctx).unwrap();
        (world, scheduler, orchestrator)
    }

    #[test]
    fn test_save_captures_remaining_ticks() {
        let (_, scheduler, orchestrator) = setup();

        let record = PersistenceAdapter::save(&orchestrator, &scheduler).unwrap();
        assert_eq!(record.remaining_ticks, 31);
        assert_eq!(record.queue, vec![1, 3, 3, 2]);
        assert_eq!(record.owner, PlayerId(1));
    }

    #[test]
    fn test_overdue_remaining_clamped() {
        let (_, _, orchestrator) = setup();

        for remaining in [1, 0, -1, -50] {
            let record = PersistenceAdapter::save(&orchestrator, &FixedPending(vec![remaining])).unwrap();
            assert_eq!(record.remaining_ticks, 1);
        }
    }

    #[test]
    fn test_duplicate_registration() {
        let (_, mut scheduler, orchestrator) = setup();
        scheduler.schedule(Callback::SettlementTick, orchestrator.id(), 8, 0, 0);

        assert!(matches!(
            PersistenceAdapter::save(&orchestrator, &scheduler),
            Err(AiError::DuplicateRegistration { count: 2, .. })
        ));
        assert!(matches!(
            PersistenceAdapter::save(&orchestrator, &FixedPending(vec![4, 9, 12])),
            Err(AiError::DuplicateRegistration { count: 3, .. })
        ));
    }

    #[test]
    fn test_missing_registration() {
        let (_, mut scheduler, orchestrator) = setup();
        orchestrator.end(&mut scheduler);

        assert!(matches!(
            PersistenceAdapter::save(&orchestrator, &scheduler),
            Err(AiError::MissingRegistration(OrchestratorId(0)))
        ));
    }

    #[test]
    fn test_load_schedules_clamped_offset() {
        let (world, scheduler, orchestrator) = setup();
        let mut record = PersistenceAdapter::save(&orchestrator, &scheduler).unwrap();
        record.remaining_ticks = 0;

        let mut fresh = Scheduler::new();
        let loaded = PersistenceAdapter::load(record, &world, &mut fresh).unwrap();

        let pending: Vec<i64> = fresh
            .pending_calls(loaded.id(), Callback::SettlementTick)
            .into_values()
            .collect();
        assert_eq!(pending, vec![1]);
        assert_eq!(loaded.to_string(), "Player1.SM(Saveholm/0)");
    }

    #[test]
    fn test_load_rejects_owner_mismatch() {
        let (world, scheduler, orchestrator) = setup();
        let mut record = PersistenceAdapter::save(&orchestrator, &scheduler).unwrap();
        record.owner = PlayerId(7);

        let mut fresh = Scheduler::new();
        assert!(matches!(
            PersistenceAdapter::load(record, &world, &mut fresh),
            Err(AiError::SettlementUnresolved { owner: PlayerId(7), .. })
        ));
        assert_eq!(fresh.pending_count(), 0);
    }
}
