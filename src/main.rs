//! Galaxy Sprawl - Entry Point
//!
//! Runs a demonstration scenario: the three standard archetypes with
//! small starting fleets, ticked for a configurable number of cycles,
//! with per-tick activity and a closing telemetry summary printed to
//! stdout.

use clap::Parser;

use galaxy_sprawl::behavior::tree::BehaviorTreeRegistry;
use galaxy_sprawl::core::config::EngineConfig;
use galaxy_sprawl::core::error::Result;
use galaxy_sprawl::core::types::{FactionId, Vec2};
use galaxy_sprawl::events::EngineEvent;
use galaxy_sprawl::factions::archetype::FactionArchetype;
use galaxy_sprawl::factions::config::ConfigRegistry;
use galaxy_sprawl::factions::faction::{Faction, Territory};
use galaxy_sprawl::simulation::{build_ship, Scheduler};

#[derive(Parser, Debug)]
#[command(name = "galaxy-sprawl", about = "Faction decision engine demo")]
struct Args {
    /// Number of decision ticks to run
    #[arg(long, default_value_t = 50)]
    ticks: u64,

    /// Seed for the deterministic rng
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Starting ships per faction
    #[arg(long, default_value_t = 4)]
    fleet_size: usize,

    /// Optional TOML file overriding the archetype tuning
    #[arg(long)]
    archetype_config: Option<std::path::PathBuf>,

    /// Print the final telemetry frame as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "galaxy_sprawl=info".into()),
        )
        .init();

    let args = Args::parse();
    tracing::info!(ticks = args.ticks, seed = args.seed, "galaxy sprawl starting");

    let configs = match &args.archetype_config {
        Some(path) => ConfigRegistry::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => ConfigRegistry::standard(),
    };
    let trees = BehaviorTreeRegistry::standard(&configs)?;
    let mut scheduler = Scheduler::new(EngineConfig::default(), configs.clone(), trees, args.seed)?;
    seed_world(&mut scheduler, &configs, args.fleet_size)?;

    for _ in 0..args.ticks {
        let report = scheduler.tick();
        for event in &report.events {
            match event {
                EngineEvent::FactionBehaviorChanged { faction, old, new } => {
                    let name = faction_name(&scheduler, *faction);
                    println!("[{:>4}] {name}: {old} -> {new}", report.tick);
                }
                EngineEvent::ShipSpawnRequested { faction, .. } => {
                    let name = faction_name(&scheduler, *faction);
                    println!("[{:>4}] {name}: spawn requested", report.tick);
                }
                EngineEvent::FactionTickSkipped { faction } => {
                    let name = faction_name(&scheduler, *faction);
                    println!("[{:>4}] {name}: tick skipped", report.tick);
                }
                _ => {}
            }
        }
        // Commands would go to the combat layer; the demo just counts them
        let commands = scheduler.drain_commands();
        if !commands.is_empty() {
            tracing::debug!(tick = report.tick, commands = commands.len(), "commands issued");
        }
    }

    let frame = scheduler.telemetry();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&frame)?);
        return Ok(());
    }
    println!("\n=== after {} ticks ===", frame.tick);
    for faction in &frame.factions {
        println!(
            "{:<24} state={:<10} tactics={:?} ships={} strength={:.0} threat={:.2}",
            faction.name,
            faction.state.to_string(),
            faction.combat,
            faction.ship_count,
            faction.fleet_strength,
            faction.threat
        );
    }
    println!("events recorded: {}", frame.events_recorded);

    Ok(())
}

/// Three factions in a triangle, close enough to see each other's rims
fn seed_world(scheduler: &mut Scheduler, configs: &ConfigRegistry, fleet_size: usize) -> Result<()> {
    let layout = [
        (1, "Space Rats", FactionArchetype::SpaceRats, Vec2::new(0.0, 0.0)),
        (2, "Lost Nova", FactionArchetype::LostNova, Vec2::new(500.0, 0.0)),
        (
            3,
            "Equator Horizon",
            FactionArchetype::EquatorHorizon,
            Vec2::new(250.0, 430.0),
        ),
    ];

    for (id, name, archetype, center) in layout {
        let config = configs.for_archetype(archetype)?;
        let faction = Faction::new(
            FactionId(id),
            name,
            archetype,
            Territory {
                center,
                radius: 300.0,
                resources: 0.5,
                threat: 0.0,
            },
            config,
        );
        for serial in 1..=fleet_size {
            let offset = Vec2::new(20.0 * serial as f32, 10.0 * serial as f32);
            scheduler.add_ship(build_ship(&faction, serial, center + offset));
        }
        scheduler.add_faction(faction)?;
    }

    // The phantoms carry an old grudge against the rats, deep enough to
    // count as provocation.
    let _ = scheduler.set_relationship(FactionId(2), FactionId(1), -0.5);
    Ok(())
}

fn faction_name(scheduler: &Scheduler, id: FactionId) -> String {
    scheduler
        .faction(id)
        .map(|f| f.name.clone())
        .unwrap_or_else(|| format!("faction {}", id.0))
}
