//! Property tests for the food predicate and the production control pass

use proptest::prelude::*;

use settlement_ai::ai::{enough_food, manage_production};
use settlement_ai::city::blueprint::BlueprintCatalog;
use settlement_ai::city::building::BuildingType;
use settlement_ai::city::resource::ResourceType;
use settlement_ai::core::config::AiConfig;
use settlement_ai::core::types::{Coord, IslandId, PlayerId};
use settlement_ai::simulation::{EconomyCommands, World};

#[test]
fn test_food_predicate_boundaries() {
    let config = AiConfig::default();

    // (production, consumption, storage used, capacity, enough)
    let table = [
        (5.0, 4.0, 0.0, 30.0, true),
        (4.0, 4.0, 0.0, 30.0, false),
        (4.1, 4.0, 0.0, 30.0, true),
        (0.001, 0.0, 0.0, 0.0, true),
        (0.0, 0.0, 0.0, 0.0, false),
        // Buffer of 0.7 * 0 + 4 reached exactly
        (0.0, 4.0, 4.0, 0.0, true),
        (0.0, 4.0, 3.99, 0.0, false),
        (0.0, 4.0, 30.0, 30.0, true),
    ];

    for (production, consumption, used, capacity, expected) in table {
        assert_eq!(
            enough_food(production, consumption, used, capacity, &config),
            expected,
            "p={} c={} used={} cap={}",
            production,
            consumption,
            used,
            capacity
        );
    }
}

proptest! {
    #[test]
    fn property_food_build_iff_short_and_storage_low(
        production in 0.0_f32..10.0,
        consumption in 0.0_f32..10.0,
        used in 0.0_f32..100.0,
        capacity in 0.0_f32..100.0,
    ) {
        let config = AiConfig::default();
        let short = production < consumption * 1.02 + 0.001;
        let low = used < capacity * 0.7 + 4.0;

        prop_assert_eq!(!enough_food(production, consumption, used, capacity, &config), short && low);
    }

    #[test]
    fn property_more_production_never_hurts(
        production in 0.0_f32..10.0,
        extra in 0.0_f32..5.0,
        consumption in 0.0_f32..10.0,
        used in 0.0_f32..50.0,
    ) {
        let config = AiConfig::default();
        if enough_food(production, consumption, used, 30.0, &config) {
            prop_assert!(enough_food(production + extra, consumption, used, 30.0, &config));
        }
    }

    #[test]
    fn property_control_pass_is_idempotent(
        fills in proptest::collection::vec(0_u32..=8, 1..6),
        paused in proptest::collection::vec(any::<bool>(), 6),
    ) {
        let catalog = BlueprintCatalog::with_defaults();
        let mut world = World::new();
        let id = world.add_settlement(PlayerId(1), IslandId(1), "Prop", 64);

        let mut producers = Vec::new();
        for (i, fill) in fills.iter().enumerate() {
            let building_type = if i % 2 == 0 { BuildingType::Fisher } else { BuildingType::Lumberjack };
            let resource = if i % 2 == 0 { ResourceType::Food } else { ResourceType::Boards };
            let settlement = world.settlement_mut(id).unwrap();
            let building = settlement.spawn_building(catalog.get(building_type).unwrap(), Coord::new(i as i32, 0));
            settlement.building_mut(building).unwrap().productions[0].buffer.add(resource, *fill);
            producers.push(building);
        }
        for (building, pause) in producers.iter().zip(paused.iter()) {
            if *pause {
                world.toggle_production_active(*building, 0).unwrap();
            }
        }

        manage_production(&mut world, id, "prop").unwrap();
        prop_assert!(manage_production(&mut world, id, "prop").unwrap().is_empty());

        let settlement = world.settlement(id).unwrap();
        for building in &producers {
            let production = &settlement.building(*building).unwrap().productions[0];
            prop_assert_eq!(production.is_paused(), production.outputs_full());
        }
    }
}
