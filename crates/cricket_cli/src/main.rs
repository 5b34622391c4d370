//! Cricket CLI
//!
//! Headless matches and config presets from the command line.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cricket_core::{simulate_match, EngineConfig, MatchMode, MatchOptions, SimulationRequest, SCHEMA_VERSION};

#[derive(Parser)]
#[command(name = "cricket")]
#[command(about = "Run the cricket simulation core without a front end", long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    FreePlay,
    TargetChase,
    Multiplayer,
}

impl From<Mode> for MatchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::FreePlay => MatchMode::FreePlay,
            Mode::TargetChase => MatchMode::TargetChase,
            Mode::Multiplayer => MatchMode::Multiplayer,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play a seeded match with automatic bowling and scripted batting
    Simulate {
        #[arg(long, value_enum, default_value = "free-play")]
        mode: Mode,

        /// Overs per innings
        #[arg(long)]
        overs: Option<u32>,

        #[arg(long, default_value = "42")]
        seed: u64,

        /// Target for a chase (generated when omitted)
        #[arg(long)]
        target: Option<u32>,

        /// Config preset name
        #[arg(long, default_value = "realistic")]
        profile: String,

        /// Full engine config JSON file; overrides --profile
        #[arg(long)]
        config: Option<PathBuf>,

        /// Batter aggression, 0..=1
        #[arg(long, default_value = "0.6")]
        aggression: f32,

        /// Print the full response as JSON instead of the scorecard
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print a config preset as JSON
    Config {
        #[arg(long, default_value = "realistic")]
        profile: String,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let env_filter = EnvFilter::builder().with_default_directive(default.into()).from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish()
        .try_init()
        .map_err(|e| anyhow!("logging init failed: {e}"))
}

fn load_config(profile: &str, path: Option<&PathBuf>) -> Result<EngineConfig> {
    if let Some(path) = path {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        return EngineConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()));
    }
    EngineConfig::from_profile(profile).ok_or_else(|| anyhow!("unknown profile: {profile}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Simulate { mode, overs, seed, target, profile, config, aggression, json } => {
            let engine_config = load_config(&profile, config.as_ref())?;
            let request = SimulationRequest {
                schema_version: SCHEMA_VERSION,
                mode: mode.into(),
                options: MatchOptions { overs, seed, target, ..MatchOptions::default() },
                profile: None,
                config: Some(engine_config),
                aggression,
                timing_sigma_m: 0.6,
                max_seconds: 36_000.0,
            };

            tracing::info!(seed, profile = %profile, "simulating");
            let response = simulate_match(&request)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print!("{}", response.scorecard.render());
                if response.result.is_none() {
                    println!("{}", response.summary);
                }
                println!("{} deliveries, {:.1}s of match time", response.deliveries, response.clock_ms as f64 / 1000.0);
            }
        }
        Commands::Config { profile } => {
            let config = load_config(&profile, None)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
