//! Cluster spin engine — core orchestration
//!
//! Drives a full spin to its settled state: initial fill, then rounds of
//! mystery transforms → cluster detection → payout → cascade (with the
//! single-tile search ability filling the no-cluster branch), finishing
//! with board-multiplier and bonus-game settlement. The product is an
//! ordered timeline of events plus the final board and total win.

use log::debug;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use cf_stage::{CellChange, CellRef, SymbolId, TimelineEvent, TimelineStage};

use crate::cascade;
use crate::cluster::find_clusters;
use crate::config::{EngineConfig, GameDefinition};
use crate::error::{EngineError, EngineResult};
use crate::grid::Grid;
use crate::payout::{board_multiplier_sum, evaluate_clusters};
use crate::rng::SpinRng;
use crate::sampler::{sample, OccupancyScope, SampleContext};
use crate::symbols::{saturating_payout, Ability, SymbolCatalog};

/// External bonus mini-game collaborator
///
/// The engine only records the trigger and consumes the returned payout;
/// the mini-game's own rules live outside this crate.
pub trait BonusGame: Send {
    /// Play one bonus round for `bet`, given how many trigger symbols were
    /// on the settled board
    fn play(&mut self, bet: f64, trigger_count: usize) -> f64;
}

/// Default collaborator: the trigger is recorded, nothing is awarded
pub struct NoBonusGame;

impl BonusGame for NoBonusGame {
    fn play(&mut self, _bet: f64, _trigger_count: usize) -> f64 {
        0.0
    }
}

/// Complete result of one spin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// The settled board
    pub final_grid: Grid,
    /// The replayable event log
    pub timeline: Vec<TimelineEvent>,
    /// Total win across the whole spin
    pub total_win: f64,
}

impl SpinOutcome {
    /// Did the spin pay anything?
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }

    /// Number of cascade events in the timeline
    pub fn cascade_events(&self) -> usize {
        self.timeline
            .iter()
            .filter(|e| matches!(e.stage, TimelineStage::Cascade { .. }))
            .count()
    }
}

/// Session statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_bet: f64,
    pub total_win: f64,
    pub wins: u64,
    pub losses: u64,
    pub cascade_rounds: u64,
    pub bonus_games: u64,
    pub max_win_ratio: f64,
}

impl SessionStats {
    /// Calculate RTP
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            (self.total_win / self.total_bet) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// A fired single-tile ability, ready to cascade
struct AbilityFire {
    trigger: CellRef,
    target_symbol: SymbolId,
    targets: Vec<CellRef>,
    win: f64,
    removed: Vec<Vec<usize>>,
    replacements: Vec<Vec<SymbolId>>,
}

/// Cluster-pays spin engine
pub struct ClusterEngine {
    /// Configuration
    config: EngineConfig,
    /// Validated symbol catalog
    catalog: SymbolCatalog,
    /// Spin RNG
    rng: SpinRng,
    /// Bonus mini-game collaborator
    bonus: Box<dyn BonusGame>,
    /// Spin counter
    spin_count: u64,
    /// Current bet
    current_bet: f64,
    /// Session statistics
    stats: SessionStats,
}

impl ClusterEngine {
    /// Create an engine from a game definition, validating fail-fast
    pub fn new(definition: GameDefinition) -> EngineResult<Self> {
        definition.config.validate()?;
        let catalog = SymbolCatalog::new(definition.symbols)?;
        Ok(Self {
            config: definition.config,
            catalog,
            rng: SpinRng::new(),
            bonus: Box::new(NoBonusGame),
            spin_count: 0,
            current_bet: 1.0,
            stats: SessionStats::default(),
        })
    }

    /// Create with the built-in demo game
    pub fn standard() -> EngineResult<Self> {
        Self::new(GameDefinition::standard())
    }

    /// Create from already-validated parts
    ///
    /// A [`SymbolCatalog`] is validated by construction; callers that spin
    /// up many engines over the same game (batch simulation) use this to
    /// skip re-validating per instance.
    pub fn from_parts(config: EngineConfig, catalog: SymbolCatalog) -> Self {
        Self {
            config,
            catalog,
            rng: SpinRng::new(),
            bonus: Box::new(NoBonusGame),
            spin_count: 0,
            current_bet: 1.0,
            stats: SessionStats::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CONFIGURATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Reset the RNG to a fixed seed for reproducible spins
    pub fn set_seed(&mut self, seed: u32) {
        self.rng.set_seed(seed);
    }

    /// Set bet amount
    pub fn set_bet(&mut self, bet: f64) {
        self.current_bet = bet.max(0.01);
    }

    /// Install the bonus mini-game collaborator
    pub fn set_bonus_game(&mut self, bonus: Box<dyn BonusGame>) {
        self.bonus = bonus;
    }

    /// Current config
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The symbol catalog
    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    /// Session stats
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Spins executed since the last stats reset
    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }

    /// Reset session stats
    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
        self.spin_count = 0;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SPIN EXECUTION
    // ═══════════════════════════════════════════════════════════════════════

    /// Execute a spin from a fresh random board
    pub fn spin(&mut self) -> EngineResult<SpinOutcome> {
        self.spin_internal(None)
    }

    /// Execute a spin from a supplied initial board
    ///
    /// The board must match the configured shape and hold only valid ids;
    /// anything else is rejected immediately, never truncated or padded.
    pub fn spin_with_grid(&mut self, columns: Vec<Vec<SymbolId>>) -> EngineResult<SpinOutcome> {
        let grid = Grid::from_columns(columns, self.config.grid)?;
        if let Some(&bad) = grid
            .columns()
            .iter()
            .flatten()
            .find(|&&id| id as usize >= self.catalog.len())
        {
            return Err(EngineError::Config(format!(
                "grid holds unknown symbol id {bad}"
            )));
        }
        self.spin_internal(Some(grid))
    }

    fn spin_internal(&mut self, forced: Option<Grid>) -> EngineResult<SpinOutcome> {
        let bet = self.current_bet;
        self.spin_count += 1;

        let active = self.catalog.spin_activation(&self.config.groups, &mut self.rng);

        let mut grid = match forced {
            Some(grid) => grid,
            None => Grid::generate(self.config.grid, &self.catalog, &active, &mut self.rng),
        };

        let mut timeline = vec![TimelineEvent::new(TimelineStage::SpinStart, grid.snapshot())];
        let mut total_win = 0.0f64;
        let mut rounds = 0u32;

        loop {
            if rounds >= self.config.max_rounds {
                return Err(EngineError::RunawayCascade { rounds });
            }
            rounds += 1;
            let mut acted = false;

            // 1. Mystery transforms, one batch per mystery symbol.
            let changes = self.transform_pass(&mut grid, &active);
            if !changes.is_empty() {
                timeline.push(TimelineEvent::with_wins(
                    TimelineStage::Transform { changes },
                    grid.snapshot(),
                    0.0,
                    total_win,
                ));
                acted = true;
            }

            // 2. Clusters pay and cascade. Ability tiles are settled by the
            // else-branch, never as paying clusters.
            let mut clusters = find_clusters(&grid, &self.catalog, self.config.cluster_size);
            clusters.retain(|c| self.catalog.def(c.anchor).ability.is_none());

            if !clusters.is_empty() {
                let payout = evaluate_clusters(&clusters, &self.catalog, bet);
                total_win += payout.step_win;

                let removed = cascade::removed_rows_by_column(&clusters, grid.cols());
                let replacements =
                    cascade::generate_replacements(&removed, &grid, &self.catalog, &active, &mut self.rng);
                let next = cascade::simulate(&grid, &removed, &replacements);

                debug!(
                    "round {rounds}: {} clusters, step win {:.2}, total {:.2}",
                    clusters.len(),
                    payout.step_win,
                    total_win
                );

                timeline.push(TimelineEvent::with_wins(
                    TimelineStage::Cascade {
                        clusters: payout.hits,
                        removed_by_column: to_u8_rows(&removed),
                        replacements_by_column: replacements,
                    },
                    next.snapshot(),
                    payout.step_win,
                    total_win,
                ));
                grid = next;
                acted = true;
            } else if let Some(fire) = self.ability_pass(&grid, &active, bet) {
                total_win += fire.win;

                timeline.push(TimelineEvent::with_wins(
                    TimelineStage::Ability {
                        trigger: fire.trigger,
                        target_symbol: fire.target_symbol,
                        targets: fire.targets,
                        win_amount: fire.win,
                    },
                    grid.snapshot(),
                    fire.win,
                    total_win,
                ));

                let next = cascade::simulate(&grid, &fire.removed, &fire.replacements);
                timeline.push(TimelineEvent::with_wins(
                    TimelineStage::Cascade {
                        clusters: Vec::new(),
                        removed_by_column: to_u8_rows(&fire.removed),
                        replacements_by_column: fire.replacements,
                    },
                    next.snapshot(),
                    0.0,
                    total_win,
                ));
                grid = next;
                acted = true;
            }

            if !acted {
                break;
            }
        }

        // ═══════════════════════════════════════════════════════════════════
        // SETTLEMENT
        // ═══════════════════════════════════════════════════════════════════

        let (multiplier_sum, contributors) = board_multiplier_sum(&grid, &self.catalog);
        if multiplier_sum > 0.0 && total_win > 0.0 {
            let amount = total_win * multiplier_sum;
            total_win += amount;
            timeline.push(TimelineEvent::with_wins(
                TimelineStage::BonusAmount {
                    multiplier_sum,
                    amount,
                    contributors,
                },
                grid.snapshot(),
                amount,
                total_win,
            ));
        }

        for id in self.catalog.bonus_trigger_ids() {
            let Some(needed) = self.catalog.def(id).bonus_trigger_count else {
                continue;
            };
            let count = grid.occurrences(id);
            if count >= needed {
                let amount = self.bonus.play(bet, count);
                total_win += amount;
                timeline.push(TimelineEvent::with_wins(
                    TimelineStage::BonusGame {
                        symbol_id: id,
                        count: count as u32,
                        amount,
                    },
                    grid.snapshot(),
                    amount,
                    total_win,
                ));
            }
        }

        let outcome = SpinOutcome {
            final_grid: grid,
            timeline,
            total_win,
        };
        self.update_stats(bet, &outcome);
        Ok(outcome)
    }

    /// Replace every occurrence of each mystery symbol by one freshly drawn
    /// symbol from its restricted pool — the whole batch gets the SAME id
    fn transform_pass(&mut self, grid: &mut Grid, active: &[bool]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for id in self.catalog.mystery_ids() {
            let positions = grid.positions_of(id);
            if positions.is_empty() {
                continue;
            }

            let pool = self.catalog.resolve_names(&self.catalog.def(id).transform_into);
            let ctx = SampleContext::pool(&self.catalog, active, &pool);
            let new_id = sample(&ctx, grid, &mut self.rng);

            for (col, row) in positions {
                changes.push(CellChange {
                    col: col as u8,
                    row: row as u8,
                    old_id: id,
                    new_id,
                });
                grid.set(col, row, new_id);
            }
        }
        changes
    }

    /// Fire the first present search ability, if any of its targets occupy
    /// the board
    fn ability_pass(&mut self, grid: &Grid, active: &[bool], bet: f64) -> Option<AbilityFire> {
        for id in self.catalog.ability_ids() {
            let positions = grid.positions_of(id);
            let Some(&(trigger_col, trigger_row)) = positions.first() else {
                continue;
            };
            let Some(Ability::Search { targets, payouts }) = &self.catalog.def(id).ability else {
                continue;
            };

            let mut eligible = self.catalog.resolve_names(targets);
            eligible.sort_unstable();
            eligible.dedup();
            eligible.retain(|&t| grid.occurrences(t) > 0);
            if eligible.is_empty() {
                continue;
            }

            let target_symbol = eligible[self.rng.next_index(eligible.len())];
            let target_cells = grid.positions_of(target_symbol);
            let win = bet * saturating_payout(payouts, target_cells.len());

            let mut removal = target_cells.clone();
            removal.push((trigger_col, trigger_row));
            let removed = cascade::rows_by_column(&removal, grid.cols());
            let replacements =
                cascade::generate_replacements(&removed, grid, &self.catalog, active, &mut self.rng);

            debug!(
                "ability '{}' locked onto '{}' ({} targets)",
                self.catalog.name_of(id),
                self.catalog.name_of(target_symbol),
                target_cells.len()
            );

            return Some(AbilityFire {
                trigger: CellRef::new(trigger_col as u8, trigger_row as u8),
                target_symbol,
                targets: target_cells
                    .iter()
                    .map(|&(c, r)| CellRef::new(c as u8, r as u8))
                    .collect(),
                win,
                removed,
                replacements,
            });
        }
        None
    }

    fn update_stats(&mut self, bet: f64, outcome: &SpinOutcome) {
        self.stats.total_spins += 1;
        self.stats.total_bet += bet;
        self.stats.total_win += outcome.total_win;

        if outcome.is_win() {
            self.stats.wins += 1;
        } else {
            self.stats.losses += 1;
        }

        self.stats.cascade_rounds += outcome.cascade_events() as u64;
        if outcome
            .timeline
            .iter()
            .any(|e| matches!(e.stage, TimelineStage::BonusGame { .. }))
        {
            self.stats.bonus_games += 1;
        }

        let ratio = outcome.total_win / bet;
        if ratio > self.stats.max_win_ratio {
            self.stats.max_win_ratio = ratio;
        }
    }
}

fn to_u8_rows(removed: &[Vec<usize>]) -> Vec<Vec<u8>> {
    removed
        .iter()
        .map(|rows| rows.iter().map(|&r| r as u8).collect())
        .collect()
}

/// Shared-handle wrapper with a reentrancy guard
///
/// A spin is one atomic computation: `try_spin` rejects while another spin
/// holds the engine, rather than interleaving or queueing silently.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<ClusterEngine>>,
}

impl SharedEngine {
    /// Wrap an engine for shared use
    pub fn new(engine: ClusterEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Spin now, or reject if a spin is already in progress
    pub fn try_spin(&self) -> EngineResult<SpinOutcome> {
        match self.inner.try_lock() {
            Some(mut engine) => engine.spin(),
            None => Err(EngineError::SpinInProgress),
        }
    }

    /// Exclusive access for configuration between spins
    pub fn lock(&self) -> MutexGuard<'_, ClusterEngine> {
        self.inner.lock()
    }
}
