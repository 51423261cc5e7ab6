//! # cf-sim — Batch Spin Simulator
//!
//! Runs large seeded spin batches against a ClusterForge game definition
//! and aggregates RTP, hit rate and cascade statistics. Each spin gets the
//! deterministic seed `base_seed + index`, so a batch reproduces exactly
//! regardless of worker count or scheduling.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use cf_engine::{
    ClusterEngine, EngineConfig, EngineError, EngineResult, GameDefinition, SymbolCatalog,
};

/// Batch run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of spins
    pub spins: u64,
    /// Seed of spin 0; spin `i` uses `base_seed + i`
    pub base_seed: u32,
    /// Bet per spin
    pub bet: f64,
    /// Worker threads (0 = rayon default)
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            spins: 10_000,
            base_seed: 1,
            bet: 1.0,
            workers: 0,
        }
    }
}

/// Aggregated batch result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub spins: u64,
    pub total_bet: f64,
    pub total_win: f64,
    pub rtp: f64,
    pub hit_rate: f64,
    pub wins: u64,
    pub max_win_ratio: f64,
    pub cascade_events: u64,
    pub bonus_games: u64,
    pub runaway_spins: u64,
}

/// One spin's contribution to the report
#[derive(Debug, Clone, Copy)]
struct SpinSample {
    win: f64,
    cascades: u64,
    bonus_game: bool,
    runaway: bool,
}

/// Run a seeded batch
///
/// The definition is validated once up front; every worker then spins a
/// private engine, so no grid state is ever shared between spins.
pub fn run_batch(definition: &GameDefinition, cfg: &BatchConfig) -> EngineResult<BatchReport> {
    definition.config.validate()?;
    let catalog = SymbolCatalog::new(definition.symbols.clone())?;
    let config = definition.config.clone();

    info!(
        "simulating {} spins at bet {} (base seed {})",
        cfg.spins, cfg.bet, cfg.base_seed
    );

    let samples = if cfg.workers > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.workers)
            .build()
            .map_err(|e| EngineError::Config(format!("worker pool: {e}")))?;
        pool.install(|| collect_samples(&config, &catalog, cfg))
    } else {
        collect_samples(&config, &catalog, cfg)
    };

    Ok(fold_report(&samples, cfg))
}

fn collect_samples(
    config: &EngineConfig,
    catalog: &SymbolCatalog,
    cfg: &BatchConfig,
) -> Vec<SpinSample> {
    (0..cfg.spins)
        .into_par_iter()
        .map_init(
            || ClusterEngine::from_parts(config.clone(), catalog.clone()),
            |engine, index| {
                engine.set_seed(cfg.base_seed.wrapping_add(index as u32));
                engine.set_bet(cfg.bet);
                match engine.spin() {
                    Ok(outcome) => SpinSample {
                        win: outcome.total_win,
                        cascades: outcome.cascade_events() as u64,
                        bonus_game: outcome
                            .timeline
                            .iter()
                            .any(|e| e.type_name() == "BONUS_GAME"),
                        runaway: false,
                    },
                    Err(_) => SpinSample {
                        win: 0.0,
                        cascades: 0,
                        bonus_game: false,
                        runaway: true,
                    },
                }
            },
        )
        .collect()
}

/// Sequential fold in spin order, so float accumulation is reproducible
/// independent of worker scheduling
fn fold_report(samples: &[SpinSample], cfg: &BatchConfig) -> BatchReport {
    let mut report = BatchReport {
        spins: cfg.spins,
        total_bet: cfg.bet * cfg.spins as f64,
        total_win: 0.0,
        rtp: 0.0,
        hit_rate: 0.0,
        wins: 0,
        max_win_ratio: 0.0,
        cascade_events: 0,
        bonus_games: 0,
        runaway_spins: 0,
    };

    for sample in samples {
        report.total_win += sample.win;
        report.cascade_events += sample.cascades;
        if sample.win > 0.0 {
            report.wins += 1;
        }
        if sample.bonus_game {
            report.bonus_games += 1;
        }
        if sample.runaway {
            report.runaway_spins += 1;
        }
        let ratio = sample.win / cfg.bet;
        if ratio > report.max_win_ratio {
            report.max_win_ratio = ratio;
        }
    }

    if report.total_bet > 0.0 {
        report.rtp = (report.total_win / report.total_bet) * 100.0;
    }
    if report.spins > 0 {
        report.hit_rate = (report.wins as f64 / report.spins as f64) * 100.0;
    }
    report
}
