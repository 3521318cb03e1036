//! Greenwave command line front end.
//!
//! # Usage
//!
//! ```bash
//! # Analyse a corridor and print the report as JSON
//! cargo run --bin greenwave --features cli -- analyze corridor.json --pretty
//!
//! # Only run input validation
//! cargo run --bin greenwave --features cli -- validate corridor.toml
//!
//! # Ask a remote service for offsets, then analyse the result
//! cargo run --bin greenwave --features "cli,remote-oracle" -- \
//!   optimize corridor.json --endpoint http://localhost:8000/optimize --weight stops=0.4
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)

use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use greenwave_rust::algorithms::PhaseSelection;
use greenwave_rust::config::EngineConfig;
use greenwave_rust::io::CorridorLoader;
use greenwave_rust::preprocessing::CorridorValidator;
use greenwave_rust::services::{
    analyze_corridor, update_weight, OptimizationWeights, WeightCategory, WeightUpdate,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Green-wave corridor bandwidth engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute local and corridor bandwidth and print the report as JSON
    Analyze(AnalyzeArgs),
    /// Validate a corridor file and print the validation report
    Validate(CommonArgs),
    /// Fetch offsets from an optimisation service and analyse the result
    Optimize(OptimizeArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Corridor file (.json or .toml)
    #[arg(value_hint = ValueHint::FilePath)]
    corridor: PathBuf,

    /// Engine configuration (defaults to greenwave.toml when present)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Override the configured phase selection
    #[arg(long, value_enum)]
    phases: Option<PhaseArg>,
}

#[derive(Parser, Debug)]
struct OptimizeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Optimisation service URL (overrides `oracle.endpoint`)
    #[arg(long)]
    endpoint: Option<String>,

    /// Objective weight as `category=value`, applied in order
    #[arg(long = "weight", value_parser = parse_weight)]
    weights: Vec<(WeightCategory, f64)>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PhaseArg {
    First,
    Best,
}

impl From<PhaseArg> for PhaseSelection {
    fn from(value: PhaseArg) -> Self {
        match value {
            PhaseArg::First => PhaseSelection::FirstOnly,
            PhaseArg::Best => PhaseSelection::BestPair,
        }
    }
}

fn parse_weight(token: &str) -> Result<(WeightCategory, f64), String> {
    let (name, value) = token
        .split_once('=')
        .ok_or_else(|| format!("expected category=value, got '{}'", token))?;
    let category = match name.trim().to_lowercase().replace('-', "_").as_str() {
        "upstream" | "upstream_bandwidth" => WeightCategory::UpstreamBandwidth,
        "downstream" | "downstream_bandwidth" => WeightCategory::DownstreamBandwidth,
        "stops" => WeightCategory::Stops,
        "delay" => WeightCategory::Delay,
        other => return Err(format!("unknown weight category '{}'", other)),
    };
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid weight value '{}': {}", value, e))?;
    Ok((category, value))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(path)?,
        None => match EngineConfig::locate_default() {
            Some(path) => {
                info!("Using configuration {}", path.display());
                EngineConfig::from_file(&path)?
            }
            None => EngineConfig::default(),
        },
    };
    Ok(config)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn apply_weights(overrides: &[(WeightCategory, f64)]) -> Result<OptimizationWeights> {
    let mut update = WeightUpdate {
        weights: OptimizationWeights::default(),
        modified: BTreeSet::new(),
    };
    for &(category, value) in overrides {
        update = update_weight(&update.weights, &update.modified, category, value)?;
    }
    Ok(update.weights)
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze(args) => {
            let mut config = load_config(args.common.config.as_deref())?;
            if let Some(phases) = args.phases {
                config.analysis.phase_selection = phases.into();
            }

            let loaded = CorridorLoader::load_from_file(&args.common.corridor)?;
            info!(
                "Loaded {} intersections from {}",
                loaded.num_intersections,
                args.common.corridor.display()
            );

            let report = analyze_corridor(&loaded.corridor, &config)
                .context("Corridor analysis failed")?;
            print_json(&report, args.common.pretty)
        }
        Command::Validate(args) => {
            let config = load_config(args.config.as_deref())?;
            let loaded = CorridorLoader::load_from_file(&args.corridor)?;
            let result = CorridorValidator::validate(&loaded.corridor, &config.to_analysis_options());
            print_json(&result, args.pretty)?;
            if !result.is_valid {
                anyhow::bail!("{} validation error(s)", result.errors.len());
            }
            Ok(())
        }
        Command::Optimize(args) => optimize(args).await,
    }
}

#[cfg(feature = "remote-oracle")]
async fn optimize(args: OptimizeArgs) -> Result<()> {
    use greenwave_rust::services::{optimize_corridor, HttpOffsetOracle};

    let mut config = load_config(args.common.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        config.oracle.endpoint = Some(endpoint);
    }

    let weights = apply_weights(&args.weights)?;
    let loaded = CorridorLoader::load_from_file(&args.common.corridor)?;
    let oracle = HttpOffsetOracle::from_settings(&config.oracle)?;
    info!("Requesting offsets from {}", oracle.endpoint());

    let outcome = optimize_corridor(&loaded.corridor, weights, &oracle, &config)
        .await
        .context("Offset optimisation failed")?;
    print_json(&outcome, args.common.pretty)
}

#[cfg(not(feature = "remote-oracle"))]
async fn optimize(args: OptimizeArgs) -> Result<()> {
    apply_weights(&args.weights)?;
    anyhow::bail!(
        "Cannot optimise {}: built without the 'remote-oracle' feature",
        args.common.corridor.display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for JSON output
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
