//! Seeded island scenarios for the binary, tests and benches

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::city::blueprint::BlueprintCatalog;
use crate::city::building::BuildingType;
use crate::city::resource::ResourceType;
use crate::core::config::AiConfig;
use crate::core::error::{AiError, Result};
use crate::core::types::{BuildingId, Coord, IslandId, LandId, PlayerId};
use crate::simulation::world::World;

const SETTLEMENT_NAMES: &[&str] = &[
    "Saltmarsh", "Greywater", "Kettlebay", "Northwick", "Amberly", "Coldharbor", "Reedholm", "Lowcliff",
];

/// A generated world with one settlement ready to be handed to an orchestrator
pub struct Scenario {
    pub world: World,
    pub land: LandId,
    pub trade_post: BuildingId,
}

/// Generate a single-settlement island
///
/// Layout, relative to the trade post at the origin:
/// - deposits along row -2
/// - village plots in an 8x4 block above the trade post
/// - production plots in a 6x6 block to the east, shuffled
pub fn generate_island(seed: u64, config: &AiConfig, catalog: &BlueprintCatalog) -> Result<Scenario> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut world = World::new();

    let owner = PlayerId(1);
    let island = IslandId(rng.gen_range(1..100));
    let name = SETTLEMENT_NAMES[rng.gen_range(0..SETTLEMENT_NAMES.len())];
    let settlement_id = world.add_settlement(owner, island, name, config.history_window);

    let blueprint = |building_type: BuildingType| {
        catalog
            .get(building_type)
            .ok_or_else(|| AiError::InvalidConfig(format!("catalog has no {}", building_type.name())))
    };

    let settlement = world.settlement_mut(settlement_id)?;
    let trade_post = settlement.spawn_building(blueprint(BuildingType::TradePost)?, Coord::new(0, 0));

    let fish_deposits = rng.gen_range(1..=3);
    let clay_deposits = rng.gen_range(0..=2);
    for x in 0..fish_deposits {
        settlement.spawn_building(blueprint(BuildingType::FishDeposit)?, Coord::new(x, -2));
    }
    for x in fish_deposits..fish_deposits + clay_deposits {
        settlement.spawn_building(blueprint(BuildingType::ClayDeposit)?, Coord::new(x, -2));
    }

    settlement.stockpile.add(ResourceType::Boards, rng.gen_range(25..=30));
    settlement.stockpile.add(ResourceType::Tools, rng.gen_range(15..=25));
    settlement.stockpile.add(ResourceType::Food, rng.gen_range(10..=20));

    let village_plots: Vec<Coord> = (1..=4)
        .flat_map(|y| (0..8).map(move |x| Coord::new(x, y)))
        .collect();
    let mut production_plots: Vec<Coord> = (0..6)
        .flat_map(|y| (10..16).map(move |x| Coord::new(x, y)))
        .collect();
    production_plots.shuffle(&mut rng);

    let land = world.add_land(owner, island, village_plots, production_plots);

    Ok(Scenario {
        world,
        land,
        trade_post,
    })
}
