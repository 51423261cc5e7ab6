//! cf-sim CLI — run a spin batch against a game definition and print the
//! aggregated report as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use cf_engine::GameDefinition;
use cf_sim::{run_batch, BatchConfig};

#[derive(Parser, Debug)]
#[command(name = "cf-sim", about = "Batch spin simulator for ClusterForge games")]
struct Args {
    /// Game definition file (.json, .yaml or .yml); the built-in demo game
    /// is used when omitted
    #[arg(long)]
    game: Option<PathBuf>,

    /// Number of spins to simulate
    #[arg(long, default_value_t = 10_000)]
    spins: u64,

    /// Seed of spin 0 (spin i uses seed + i)
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Bet per spin
    #[arg(long, default_value_t = 1.0)]
    bet: f64,

    /// Worker threads (0 = rayon default)
    #[arg(long, default_value_t = 0)]
    workers: usize,
}

fn load_definition(path: &Path) -> Result<GameDefinition> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading game definition {}", path.display()))?;
    let definition = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => GameDefinition::from_yaml(&text)?,
        Some("json") => GameDefinition::from_json(&text)?,
        other => bail!("unsupported game definition extension: {other:?}"),
    };
    Ok(definition)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let definition = match &args.game {
        Some(path) => load_definition(path)?,
        None => GameDefinition::standard(),
    };

    let report = run_batch(
        &definition,
        &BatchConfig {
            spins: args.spins,
            base_seed: args.seed,
            bet: args.bet,
            workers: args.workers,
        },
    )?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
