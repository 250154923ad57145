use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use settlement_ai::city::blueprint::BlueprintCatalog;
use settlement_ai::core::config::AiConfig;
use settlement_ai::simulation::{generate_island, Session};

fn session(seed: u64) -> Session {
    let config = AiConfig::default();
    let catalog = BlueprintCatalog::with_defaults();
    let scenario = generate_island(seed, &config, &catalog).unwrap();
    let mut session = Session::new(config, catalog, scenario.world);
    session
        .place_under_control(scenario.land, scenario.trade_post)
        .unwrap();
    session
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    for ticks in [256u64, 1024, 4096] {
        group.bench_with_input(BenchmarkId::new("ticks", ticks), &ticks, |b, &ticks| {
            b.iter_batched(
                || session(42),
                |mut session| {
                    session.run(ticks).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_save(c: &mut Criterion) {
    let mut warmed = session(42);
    warmed.run(2048).unwrap();

    c.bench_function("save_to_json", |b| {
        b.iter(|| serde_json::to_string(&warmed.save().unwrap()).unwrap())
    });
}

criterion_group!(session_benches, bench_session, bench_save);
criterion_main!(session_benches);
