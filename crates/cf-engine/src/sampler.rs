//! Weighted symbol sampler
//!
//! Draws one symbol id from a candidate pool. The pool is derived from the
//! catalog and the draw context: the initial fill admits roll-only symbols,
//! cascade refills exclude them, transform passes restrict to an explicit
//! allow-list, and `one_per_reel` symbols are filtered against the target
//! column. Stepped weights resolve against the occurrence count in the
//! supplied board scope.

use log::warn;

use crate::rng::SpinRng;
use crate::symbols::{SymbolCatalog, SymbolId};

/// Board state the sampler may interrogate during a draw
///
/// Implemented by the live grid and by the partially filled board used
/// during initial generation.
pub trait OccupancyScope {
    /// How many cells currently hold `id`
    fn occurrences(&self, id: SymbolId) -> usize;
    /// Does column `col` currently hold `id`?
    fn column_contains(&self, col: usize, id: SymbolId) -> bool;
}

/// One draw's context
#[derive(Clone, Copy)]
pub struct SampleContext<'a> {
    /// The symbol catalog
    pub catalog: &'a SymbolCatalog,
    /// Per-spin group activation mask, one flag per id
    pub active: &'a [bool],
    /// True only for the initial board fill
    pub first_fill: bool,
    /// Explicit candidate allow-list (transform pools); bypasses the
    /// roll-only filter
    pub allow: Option<&'a [SymbolId]>,
    /// Target column, gating `one_per_reel`
    pub column: Option<usize>,
}

impl<'a> SampleContext<'a> {
    /// Context for the initial board fill
    pub fn initial_fill(catalog: &'a SymbolCatalog, active: &'a [bool], column: usize) -> Self {
        Self {
            catalog,
            active,
            first_fill: true,
            allow: None,
            column: Some(column),
        }
    }

    /// Context for a cascade refill draw
    pub fn refill(catalog: &'a SymbolCatalog, active: &'a [bool], column: usize) -> Self {
        Self {
            catalog,
            active,
            first_fill: false,
            allow: None,
            column: Some(column),
        }
    }

    /// Context restricted to an explicit pool (mystery transforms)
    pub fn pool(catalog: &'a SymbolCatalog, active: &'a [bool], allow: &'a [SymbolId]) -> Self {
        Self {
            catalog,
            active,
            first_fill: false,
            allow: Some(allow),
            column: None,
        }
    }
}

/// Resolve one symbol's effective mass for this draw
fn resolved_weight(ctx: &SampleContext, scope: &impl OccupancyScope, id: SymbolId) -> f64 {
    if !ctx.active[id as usize] {
        return 0.0;
    }
    ctx.catalog.def(id).weight.resolve(scope.occurrences(id))
}

/// Draw one symbol id
///
/// Walks the pool subtracting resolved weights from a single uniform draw.
/// A degenerate pool (empty or all-zero mass) falls back to the first
/// candidate — tolerated, but logged, since it points at a configuration
/// gap rather than expected behavior.
pub fn sample(ctx: &SampleContext, scope: &impl OccupancyScope, rng: &mut SpinRng) -> SymbolId {
    let mut candidates: Vec<SymbolId> = match ctx.allow {
        Some(allow) => allow.to_vec(),
        None => {
            let ids = 0..ctx.catalog.len() as SymbolId;
            if ctx.first_fill {
                ids.collect()
            } else {
                ids.filter(|&id| !ctx.catalog.def(id).only_appear_on_roll)
                    .collect()
            }
        }
    };

    if let Some(col) = ctx.column {
        candidates.retain(|&id| {
            !ctx.catalog.def(id).one_per_reel || !scope.column_contains(col, id)
        });
    }

    let Some(&first) = candidates.first() else {
        warn!("sampler pool filtered down to nothing, falling back to symbol 0");
        return 0;
    };

    let total: f64 = candidates
        .iter()
        .map(|&id| resolved_weight(ctx, scope, id))
        .sum();
    if total <= 0.0 {
        warn!(
            "sampler pool of {} candidates has zero total weight, falling back to '{}'",
            candidates.len(),
            ctx.catalog.name_of(first)
        );
        return first;
    }

    let mut r = rng.next() * total;
    for &id in &candidates {
        let w = resolved_weight(ctx, scope, id);
        if r < w {
            return id;
        }
        r -= w;
    }

    // Float-tail fallthrough; practically unreachable.
    warn!("sampler walk exhausted the pool, falling back to '{}'", ctx.catalog.name_of(first));
    first
}
