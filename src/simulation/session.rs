//! Session - drives the world, the scheduler and every orchestrator
//!
//! One `step` is one game tick:
//! 1. Advance the scheduler clock
//! 2. Run production and collection for every settlement
//! 3. Dispatch each due call to its orchestrator

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::orchestrator::{BuildOrchestrator, TickContext, TickReport};
use crate::ai::persistence::PersistenceAdapter;
use crate::city::blueprint::BlueprintCatalog;
use crate::core::config::AiConfig;
use crate::core::error::{AiError, Result};
use crate::core::types::{BuildingId, LandId, OrchestratorId, SettlementId, Tick};
use crate::scheduler::{Callback, Scheduler, SchedulerPort};
use crate::simulation::save::{SaveGame, SaveHeader, SAVE_VERSION};
use crate::simulation::settlement::Settlement;
use crate::simulation::world::World;

pub struct Session {
    config: AiConfig,
    catalog: BlueprintCatalog,
    world: World,
    scheduler: Scheduler,
    orchestrators: BTreeMap<OrchestratorId, BuildOrchestrator>,
    next_orchestrator: u64,
    game_id: Uuid,
}

impl Session {
    pub fn new(config: AiConfig, catalog: BlueprintCatalog, world: World) -> Self {
        Self {
            config,
            catalog,
            world,
            scheduler: Scheduler::new(),
            orchestrators: BTreeMap::new(),
            next_orchestrator: 0,
            game_id: Uuid::new_v4(),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn catalog(&self) -> &BlueprintCatalog {
        &self.catalog
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn current_tick(&self) -> Tick {
        self.scheduler.current_tick()
    }

    pub fn game_id(&self) -> Uuid {
        self.game_id
    }

    pub fn orchestrator(&self, id: OrchestratorId) -> Option<&BuildOrchestrator> {
        self.orchestrators.get(&id)
    }

    pub fn orchestrators(&self) -> impl Iterator<Item = &BuildOrchestrator> + '_ {
        self.orchestrators.values()
    }

    /// Hand the settlement on a land allocation over to a new orchestrator
    pub fn place_under_control(&mut self, land: LandId, trade_post: BuildingId) -> Result<OrchestratorId> {
        let id = OrchestratorId(self.next_orchestrator);
        let mut ctx = TickContext {
            world: &mut self.world,
            scheduler: &mut self.scheduler,
            catalog: &self.catalog,
            config: &self.config,
        };
        let orchestrator = BuildOrchestrator::new(id, land, trade_post, &mut ctx)?;
        info!("{} took control", orchestrator);

        self.next_orchestrator += 1;
        self.orchestrators.insert(id, orchestrator);
        Ok(id)
    }

    /// Advance one tick, returning the reports of every orchestrator that ran
    ///
    /// Every due call is dispatched even when an earlier one fails. An
    /// orchestrator whose pass fails is ended and dropped; the first error
    /// is returned once the tick is complete.
    pub fn step(&mut self) -> Result<Vec<(OrchestratorId, TickReport)>> {
        let due = self.scheduler.advance();

        let collectors = self.config.collectors_per_storage;
        for settlement in self.world.settlements_mut() {
            settlement.step_production(collectors);
        }

        let mut reports = Vec::with_capacity(due.len());
        let mut first_error = None;
        for call in due {
            match call.callback {
                Callback::SettlementTick => match self.dispatch_tick(call.target) {
                    Ok(report) => reports.push((call.target, report)),
                    Err(err) => {
                        if let Some(orchestrator) = self.orchestrators.remove(&call.target) {
                            warn!("{} dropped after failed tick: {}", orchestrator, err);
                            orchestrator.end(&mut self.scheduler);
                        }
                        first_error.get_or_insert(err);
                    }
                },
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(reports),
        }
    }

    fn dispatch_tick(&mut self, target: OrchestratorId) -> Result<TickReport> {
        let orchestrator = self
            .orchestrators
            .get_mut(&target)
            .ok_or(AiError::OrchestratorNotFound(target))?;
        let mut ctx = TickContext {
            world: &mut self.world,
            scheduler: &mut self.scheduler,
            catalog: &self.catalog,
            config: &self.config,
        };
        orchestrator.tick(&mut ctx)
    }

    /// Run a number of ticks, collecting every report
    pub fn run(&mut self, ticks: u64) -> Result<Vec<(OrchestratorId, TickReport)>> {
        let mut reports = Vec::new();
        for _ in 0..ticks {
            reports.extend(self.step()?);
        }
        Ok(reports)
    }

    /// Remove a settlement, ending every orchestrator that controls it
    pub fn destroy_settlement(&mut self, id: SettlementId) -> Result<Settlement> {
        let controlling: Vec<OrchestratorId> = self
            .orchestrators
            .values()
            .filter(|o| o.settlement() == id)
            .map(|o| o.id())
            .collect();

        for orchestrator_id in controlling {
            if let Some(orchestrator) = self.orchestrators.remove(&orchestrator_id) {
                orchestrator.end(&mut self.scheduler);
            }
        }

        self.world.remove_settlement(id)
    }

    pub fn save(&self) -> Result<SaveGame> {
        let orchestrators = self
            .orchestrators
            .values()
            .map(|o| PersistenceAdapter::save(o, &self.scheduler))
            .collect::<Result<Vec<_>>>()?;

        Ok(SaveGame {
            header: SaveHeader {
                game_id: self.game_id,
                version: SAVE_VERSION,
                tick: self.scheduler.current_tick(),
            },
            world: self.world.clone(),
            orchestrators,
        })
    }

    pub fn load(save: SaveGame, config: AiConfig, catalog: BlueprintCatalog) -> Result<Self> {
        if save.header.version != SAVE_VERSION {
            return Err(AiError::UnsupportedVersion(save.header.version));
        }

        let mut world = save.world;
        world.rebuild_indices();
        let mut scheduler = Scheduler::starting_at(save.header.tick);

        let mut orchestrators = BTreeMap::new();
        for record in save.orchestrators {
            let orchestrator = PersistenceAdapter::load(record, &world, &mut scheduler)?;
            orchestrators.insert(orchestrator.id(), orchestrator);
        }
        let next_orchestrator = orchestrators
            .keys()
            .next_back()
            .map_or(0, |id: &OrchestratorId| id.0 + 1);

        info!(
            "Loaded game {} at tick {} with {} orchestrators",
            save.header.game_id,
            save.header.tick,
            orchestrators.len()
        );

        Ok(Self {
            config,
            catalog,
            world,
            scheduler,
            orchestrators,
            next_orchestrator,
            game_id: save.header.game_id,
        })
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.save()?)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path, config: AiConfig, catalog: BlueprintCatalog) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let save: SaveGame = serde_json::from_str(&content)?;
        Self::load(save, config, catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::scenario::generate_island;

    fn session() -> (Session, OrchestratorId) {
        let config = AiConfig::default();
        let catalog = BlueprintCatalog::with_defaults();
        let scenario = generate_island(7, &config, &catalog).unwrap();
        let mut session = Session::new(config, catalog, scenario.world);
        let id = session
            .place_under_control(scenario.land, scenario.trade_post)
            .unwrap();
        (session, id)
    }

    #[test]
    fn test_first_tick_at_offset() {
        let (mut session, id) = session();

        let reports = session.run(31).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, id);
        assert_eq!(reports[0].1.tick, 31);
    }

    #[test]
    fn test_steady_interval() {
        let (mut session, _) = session();

        let ticks: Vec<Tick> = session
            .run(31 + 32 * 3)
            .unwrap()
            .into_iter()
            .map(|(_, r)| r.tick)
            .collect();
        assert_eq!(ticks, vec![31, 63, 95, 127]);
    }

    #[test]
    fn test_unknown_target_is_an_error() {
        let (mut session, _) = session();
        session
            .scheduler_mut()
            .schedule(Callback::SettlementTick, OrchestratorId(99), 1, 0, 0);

        assert!(matches!(
            session.step(),
            Err(AiError::OrchestratorNotFound(OrchestratorId(99)))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let (session, _) = session();
        let mut save = session.save().unwrap();
        save.header.version = SAVE_VERSION + 1;

        assert!(matches!(
            Session::load(save, AiConfig::default(), BlueprintCatalog::with_defaults()),
            Err(AiError::UnsupportedVersion(_))
        ));
    }
}
