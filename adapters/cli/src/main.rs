#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Citadel Defence match.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use citadel_defence_cli::{load_config, Simulation};
use citadel_defence_core::{EndOfMatchPolicy, MatchConfig};
use citadel_defence_system_builder::BuilderInput;
use citadel_defence_world::query;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Runs a headless Citadel Defence match")]
struct Cli {
    /// TOML match configuration; defaults are used when absent.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 6_000)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Overrides the wave seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the end-of-match policy.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,
    /// Log filter directive, such as `debug` or `citadel_defence_world=trace`.
    #[arg(long)]
    log: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Lose once every main tower slot has fallen.
    MainTowers,
    /// Lose once no structure is left standing.
    RegistryEmpty,
}

impl From<PolicyArg> for EndOfMatchPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::MainTowers => Self::MainTowersDestroyed,
            PolicyArg::RegistryEmpty => Self::RegistryEmptied,
        }
    }
}

/// Entry point for the Citadel Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MatchConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.waves.seed = seed;
    }
    if let Some(policy) = cli.policy {
        config.registry.end_policy = policy.into();
    }

    let mut simulation = Simulation::new(config).context("invalid match configuration")?;
    let dt = Duration::from_millis(cli.tick_ms);
    for _ in 0..cli.ticks {
        if query::is_match_ended(simulation.world()) {
            break;
        }
        simulation.step(dt, BuilderInput::default());
    }

    let balances = query::mana_balances(simulation.world());
    let report = simulation.finish();
    info!(ended = report.ended, ticks = report.ticks, "simulation finished");
    println!("ticks:                {}", report.ticks);
    println!("elapsed:              {:.1}s", report.elapsed.as_secs_f32());
    println!("structures placed:    {}", report.structures_placed);
    println!("structures destroyed: {}", report.structures_destroyed);
    println!("units spawned:        {}", report.units_spawned);
    println!("units killed:         {}", report.units_killed);
    println!("shots fired:          {}", report.shots_fired);
    for mana in balances {
        println!(
            "mana player {}:        {}/{}",
            mana.player.get(),
            mana.balance,
            mana.max
        );
    }
    println!("match ended:          {}", report.ended);
    Ok(())
}

fn init_tracing(directive: Option<&str>) {
    let filter = directive
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
