//! Cascade simulation
//!
//! Removal is expressed as a per-column filter followed by appending the
//! replacement symbols at the end of the column — "remove and let
//! everything above fall", without ever shifting indices. Replacement draws
//! are evaluated against the PRE-cascade board, so occurrence caps see the
//! state that triggered the cascade, not the post-removal board.

use crate::cluster::Cluster;
use crate::grid::Grid;
use crate::rng::SpinRng;
use crate::sampler::{sample, SampleContext};
use crate::symbols::{SymbolCatalog, SymbolId};

/// Group arbitrary cell positions into sorted, deduplicated row indices per
/// column
pub fn rows_by_column(cells: &[(usize, usize)], cols: usize) -> Vec<Vec<usize>> {
    let mut removed = vec![Vec::new(); cols];
    for &(col, row) in cells {
        removed[col].push(row);
    }
    for rows in &mut removed {
        rows.sort_unstable();
        rows.dedup();
    }
    removed
}

/// Convert accepted clusters into per-column removal row indices
pub fn removed_rows_by_column(clusters: &[Cluster], cols: usize) -> Vec<Vec<usize>> {
    let cells: Vec<(usize, usize)> = clusters
        .iter()
        .flat_map(|cluster| cluster.cells.iter().map(|c| (c.col, c.row)))
        .collect();
    rows_by_column(&cells, cols)
}

/// Draw one replacement symbol per vacated cell, per column, against the
/// pre-cascade board
pub fn generate_replacements(
    removed: &[Vec<usize>],
    grid: &Grid,
    catalog: &SymbolCatalog,
    active: &[bool],
    rng: &mut SpinRng,
) -> Vec<Vec<SymbolId>> {
    removed
        .iter()
        .enumerate()
        .map(|(col, rows)| {
            let ctx = SampleContext::refill(catalog, active, col);
            (0..rows.len()).map(|_| sample(&ctx, grid, rng)).collect()
        })
        .collect()
}

/// Produce the next board: filter out removed cells per column, then append
/// the replacements. Untouched columns are copied unchanged.
pub fn simulate(grid: &Grid, removed: &[Vec<usize>], replacements: &[Vec<SymbolId>]) -> Grid {
    let mut next = Vec::with_capacity(grid.cols());
    for (col, column) in grid.columns().iter().enumerate() {
        let gone = &removed[col];
        if gone.is_empty() {
            next.push(column.clone());
            continue;
        }

        let mut rebuilt: Vec<SymbolId> = column
            .iter()
            .enumerate()
            .filter(|(row, _)| !gone.contains(row))
            .map(|(_, &id)| id)
            .collect();
        rebuilt.extend_from_slice(&replacements[col]);
        debug_assert_eq!(rebuilt.len(), column.len());
        next.push(rebuilt);
    }
    Grid::from_raw(next)
}
