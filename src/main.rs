//! Settlement AI - Entry Point
//!
//! Generates a seeded island (or loads a save), puts its settlement under
//! autonomous control and runs the session for a number of ticks.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use settlement_ai::ai::Decision;
use settlement_ai::city::blueprint::BlueprintCatalog;
use settlement_ai::city::building::BuildingType;
use settlement_ai::city::construction::BuildResult;
use settlement_ai::core::config::AiConfig;
use settlement_ai::core::error::Result;
use settlement_ai::simulation::{generate_island, Session};

#[derive(Parser, Debug)]
#[command(name = "settlement-ai")]
#[command(about = "Run an autonomous settlement builder on a generated island")]
struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// Random seed for the generated island
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// AI tuning file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Blueprint catalog (TOML), layered over the built-in blueprints
    #[arg(long)]
    blueprints: Option<PathBuf>,

    /// Write a save game here when the run ends
    #[arg(long)]
    save: Option<PathBuf>,

    /// Resume from a save game instead of generating an island
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("settlement_ai=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AiConfig::load_from_toml(path)?,
        None => AiConfig::default(),
    };
    let catalog = match &args.blueprints {
        Some(path) => BlueprintCatalog::load_from_toml(path)?,
        None => BlueprintCatalog::with_defaults(),
    };

    let mut session = match &args.load {
        Some(path) => {
            tracing::info!("Loading {}", path.display());
            Session::load_from_file(path, config, catalog)?
        }
        None => {
            tracing::info!("Generating island with seed {}", args.seed);
            let scenario = generate_island(args.seed, &config, &catalog)?;
            let mut session = Session::new(config, catalog, scenario.world);
            session.place_under_control(scenario.land, scenario.trade_post)?;
            session
        }
    };

    let start = std::time::Instant::now();
    let reports = session.run(args.ticks)?;
    let elapsed = start.elapsed();

    let mut outcomes: BTreeMap<String, [usize; 3]> = BTreeMap::new();
    for (_, report) in &reports {
        let (Some(result), decision) = (report.result, report.decision) else {
            continue;
        };
        let label = match decision {
            Decision::QueuedTask(task) => task.name().to_string(),
            other => format!("{:?}", other),
        };
        let slot = match result {
            BuildResult::Ok => 0,
            BuildResult::NeedResources => 1,
            BuildResult::Failed => 2,
        };
        outcomes.entry(label).or_default()[slot] += 1;
    }

    println!("\n=== SETTLEMENT AI ===");
    println!(
        "Ran {} ticks in {:.2?} (now at tick {}), {} decision passes",
        args.ticks,
        elapsed,
        session.current_tick(),
        reports.len()
    );

    println!("\nBuild attempts (ok / need resources / failed):");
    for (label, [ok, need, failed]) in &outcomes {
        println!("  {:<24} {:>4} / {:>4} / {:>4}", label, ok, need, failed);
    }

    for orchestrator in session.orchestrators() {
        println!("\n{}", orchestrator);
        println!(
            "  tents {} fishers {} potato fields {} village complete {}",
            orchestrator.tents_built(),
            orchestrator.fishers_built(),
            orchestrator.potato_fields_built(),
            orchestrator.village_complete()
        );
        if let Ok(settlement) = session.world().settlement(orchestrator.settlement()) {
            for building_type in BuildingType::ALL {
                let count = settlement.count_buildings(building_type);
                if count > 0 {
                    println!("  {:<16} {}", building_type.name(), count);
                }
            }
        }
    }

    if let Some(path) = &args.save {
        session.save_to_file(path)?;
        tracing::info!("Saved to {}", path.display());
    }

    Ok(())
}
