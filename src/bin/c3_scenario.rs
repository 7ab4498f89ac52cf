//! Headless C3 Scenario Runner
//!
//! Replays a scripted (or random) roster against the network engine and
//! prints who is networked with whom.

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tactical_c3::core::config::load_config;
use tactical_c3::core::error::Result;
use tactical_c3::scenario::{load_scenario, random_scenario, ConnectivityReport};

/// C3 Scenario Runner - evaluate network topology for a roster
#[derive(Parser, Debug)]
#[command(name = "c3_scenario")]
#[command(about = "Replay a C3 scenario and report network connectivity")]
struct Args {
    /// Scenario TOML file (see data/scenarios/)
    #[arg(long, conflicts_with = "random")]
    scenario: Option<PathBuf>,

    /// Generate a random roster of this many units instead
    #[arg(long)]
    random: Option<usize>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Network config TOML overriding the scenario's own
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "tactical_c3=debug" } else { "tactical_c3=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(level.parse().unwrap_or_else(|_| tracing::Level::INFO.into())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(report) => print_report(&report, &args.format),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<ConnectivityReport> {
    let mut scenario = match (&args.scenario, args.random) {
        (Some(path), _) => load_scenario(path)?,
        (None, Some(units)) => {
            let seed = args.seed.unwrap_or_else(rand::random);
            tracing::info!("Random roster of {} units (seed {})", units, seed);
            let mut rng = StdRng::seed_from_u64(seed);
            random_scenario(&mut rng, units)
        }
        (None, None) => load_scenario("data/scenarios/lance.toml")?,
    };

    if let Some(path) = &args.config {
        scenario.config = Some(load_config(path)?);
    }

    let skirmish = scenario.run()?;
    Ok(skirmish.report())
}

fn print_report(report: &ConnectivityReport, format: &str) {
    if format == "json" {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize report: {}", e),
        }
        return;
    }

    println!("=== C3 Network, round {} ===", report.round);
    for unit in &report.units {
        let kind = unit
            .kind
            .map(|k| format!("{:?}", k))
            .unwrap_or_else(|| "offline".to_string());
        println!(
            "  {:<12} {:<15} identity={} master={} free={} members=[{}]",
            unit.name,
            kind,
            unit.identity.as_deref().unwrap_or("-"),
            unit.master.as_deref().unwrap_or("-"),
            unit.free_slots,
            unit.members.join(", ")
        );
    }
    println!("Links: {}", report.links.len());
    for (a, b) in &report.links {
        println!("  {} <-> {}", a, b);
    }
}
