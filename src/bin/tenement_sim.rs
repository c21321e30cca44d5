//! Headless tenement simulation runner
//!
//! Advances a seeded world day by day, auto-resolving every fired event
//! with its first available choice, and writes a JSON report at the end.

use std::path::PathBuf;

use blockwarden::core::config::SimConfig;
use blockwarden::core::notify::TracingSink;
use blockwarden::core::types::{ResourceKind, TenantKind};
use blockwarden::events::loader::load_event_book;
use blockwarden::events::{EventBook, EventScheduler, TriggeredEvent};
use blockwarden::sim::{run_day, DayReport};
use blockwarden::world::WorldState;
use clap::Parser;
use serde::Serialize;

/// Headless tenement simulation runner
#[derive(Parser, Debug)]
#[command(name = "tenement_sim")]
#[command(about = "Run a seeded tenement survival simulation and output a JSON report")]
struct Args {
    /// Days to simulate
    #[arg(long, default_value_t = 30)]
    days: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Tenants to move in on day zero
    #[arg(long, default_value_t = 6)]
    tenants: u32,

    /// Rooms in the building
    #[arg(long, default_value_t = 8)]
    rooms: u32,

    /// Event definitions file (built-in book when omitted)
    #[arg(long)]
    events: Option<PathBuf>,

    /// Simulation config file (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the JSON report
    #[arg(long, default_value = "simulation_report.json")]
    report: PathBuf,
}

/// JSON output structure
#[derive(Serialize)]
struct SimulationReport {
    seed: u64,
    days_simulated: u64,
    final_stock: Vec<(ResourceKind, u64)>,
    final_average_satisfaction: Option<f64>,
    tenants_remaining: usize,
    conflicts_logged: usize,
    choices_executed: usize,
    days: Vec<DayReport>,
}

const MOVE_IN_ROSTER: [TenantKind; 6] = [
    TenantKind::Worker,
    TenantKind::Scavenger,
    TenantKind::Soldier,
    TenantKind::Doctor,
    TenantKind::Worker,
    TenantKind::Elder,
];

const MOVE_IN_NAMES: [&str; 12] = [
    "Anya", "Boris", "Vera", "Dmitri", "Olga", "Pavel", "Nadia", "Igor", "Sofia", "Lev",
    "Marta", "Yuri",
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => SimConfig::load_from_toml(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => SimConfig::default(),
    };

    let book = match &args.events {
        Some(path) => load_event_book(path, &config).unwrap_or_else(|e| {
            eprintln!("Failed to load events {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => EventBook::with_defaults(),
    };

    println!("Blockwarden Tenement Simulation");
    println!("===============================");
    println!("Seed: {}", seed);
    println!("Days: {}, tenants: {}, rooms: {}", args.days, args.tenants, args.rooms);
    println!("Event book: {} events", book.len());
    println!();

    let mut scheduler = EventScheduler::new(book, &config);
    let mut world = WorldState::new(seed, &config);
    let mut sink = TracingSink;

    for _ in 0..args.rooms {
        world.building.add_room();
    }
    for i in 0..args.tenants as usize {
        let kind = MOVE_IN_ROSTER[i % MOVE_IN_ROSTER.len()];
        let name = MOVE_IN_NAMES[i % MOVE_IN_NAMES.len()];
        world.hire_tenant(name, kind, &config);
    }
    // Opening stock: twice the warning band of every kind
    for kind in ResourceKind::ALL {
        let bands = config.thresholds.bands(kind);
        world.ledger.set_stock(kind, bands.warning * 2);
    }

    let mut reports = Vec::with_capacity(args.days as usize);
    for _ in 0..args.days {
        let mut report = run_day(&mut world, &scheduler, &config, &mut sink);

        if world.day == 1 {
            if let Some(opening) = scheduler.trigger_scripted(&mut world, "first_light", &config) {
                report.triggered.push(opening);
            }
        }

        for event in &report.triggered {
            resolve_first_choice(&mut scheduler, &mut world, event, &config, &mut sink);
        }

        reports.push(report);
    }

    let report = SimulationReport {
        seed,
        days_simulated: args.days,
        final_stock: world.ledger.snapshot(),
        final_average_satisfaction: world.satisfaction.average(),
        tenants_remaining: world.tenants.len(),
        conflicts_logged: world.conflicts.len(),
        choices_executed: scheduler.history().len(),
        days: reports,
    };

    println!();
    println!("--- Final State (day {}) ---", world.day);
    for (kind, amount) in &report.final_stock {
        println!("{}: {}", kind, amount);
    }
    if let Some(avg) = report.final_average_satisfaction {
        println!("Average satisfaction: {:.1}", avg);
    }
    println!("Tenants remaining: {}", report.tenants_remaining);
    println!("Conflicts logged: {}", report.conflicts_logged);
    println!("Choices executed: {}", report.choices_executed);

    let json = serde_json::to_string_pretty(&report).expect("Failed to serialize report");
    std::fs::write(&args.report, json).expect("Failed to write report");
    println!("\nFull report written to {}", args.report.display());
}

/// Deterministic auto-resolution: always the first choice still open
fn resolve_first_choice(
    scheduler: &mut EventScheduler,
    world: &mut WorldState,
    event: &TriggeredEvent,
    config: &SimConfig,
    sink: &mut TracingSink,
) {
    let Some(choice) = event.choices.first() else {
        tracing::warn!("event '{}' fired with no open choices", event.event_id);
        return;
    };
    match scheduler.execute_choice(world, &event.event_id, &choice.id, config, sink) {
        Ok(execution) => {
            tracing::info!(
                "day {}: resolved '{}' with '{}' ({} effects)",
                execution.day,
                execution.event_id,
                execution.choice_id,
                execution.results.len()
            );
        }
        Err(rejection) => {
            tracing::warn!(
                "choice '{}/{}' rejected: {:?}",
                event.event_id,
                choice.id,
                rejection
            );
        }
    }
}
