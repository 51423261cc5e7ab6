//! Payout accumulation
//!
//! Converts accepted clusters into win amounts. Each cluster pays as its
//! representative symbol (the first member that is neither super nor wild),
//! indexed into that symbol's saturating payout table by cluster size. A
//! super member amplifies the step's running payout and surfaces its cells
//! as area-effect metadata for the rendering layer.

use cf_stage::{CellRef, ClusterHit};

use crate::cluster::Cluster;
use crate::grid::Grid;
use crate::symbols::SymbolCatalog;

/// Outcome of paying out one detection pass
#[derive(Debug, Clone)]
pub struct StepPayout {
    /// Per-cluster hits, in detection order
    pub hits: Vec<ClusterHit>,
    /// Win for the whole step, super multipliers applied
    pub step_win: f64,
}

/// Pay out every cluster of one detection pass
pub fn evaluate_clusters(clusters: &[Cluster], catalog: &SymbolCatalog, bet: f64) -> StepPayout {
    let mut hits = Vec::with_capacity(clusters.len());
    let mut step_win = 0.0;

    for cluster in clusters {
        let representative = cluster
            .cells
            .iter()
            .map(|c| c.symbol)
            .find(|&id| {
                let def = catalog.def(id);
                !def.is_super() && !def.is_wild()
            })
            .unwrap_or(cluster.cells[0].symbol);

        let win = bet * catalog.payout(representative, cluster.len());
        step_win += win;

        let super_cells: Vec<CellRef> = cluster
            .cells
            .iter()
            .filter(|c| catalog.def(c.symbol).is_super())
            .map(|c| CellRef::new(c.col as u8, c.row as u8))
            .collect();

        let super_member = cluster
            .cells
            .iter()
            .find(|c| catalog.def(c.symbol).is_super());
        if let Some(member) = super_member {
            if let Some(multiplier) = catalog.def(member.symbol).super_multiplier {
                step_win *= multiplier;
            }
        }

        hits.push(ClusterHit {
            symbol_id: representative,
            symbol_name: catalog.name_of(representative).to_string(),
            size: cluster.len() as u32,
            win_amount: win,
            cells: cluster
                .cells
                .iter()
                .map(|c| CellRef::new(c.col as u8, c.row as u8))
                .collect(),
            super_cells,
        });
    }

    StepPayout { hits, step_win }
}

/// Sum the board-multiplier symbols on the settled board
///
/// Returns the multiplier sum and the contributing cells.
pub fn board_multiplier_sum(grid: &Grid, catalog: &SymbolCatalog) -> (f64, Vec<CellRef>) {
    let mut sum = 0.0;
    let mut contributors = Vec::new();
    for (col, column) in grid.columns().iter().enumerate() {
        for (row, &id) in column.iter().enumerate() {
            if let Some(mult) = catalog.def(id).board_multiplier {
                sum += mult;
                contributors.push(CellRef::new(col as u8, row as u8));
            }
        }
    }
    (sum, contributors)
}
