//! Timeline Taxonomy — shared vocabulary between engine and renderer
//!
//! These types describe grid positions, cell rewrites, and cluster hits.
//! They are plain data: the engine produces them, the renderer consumes them.

use serde::{Deserialize, Serialize};

/// Symbol identifier — dense index into the game's symbol catalog
pub type SymbolId = u32;

/// A full board snapshot, column-major (`snapshot[col][row]`)
pub type GridSnapshot = Vec<Vec<SymbolId>>;

/// A single cell position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    /// Column index (0-based)
    pub col: u8,
    /// Row index (0-based, 0 = top)
    pub row: u8,
}

impl CellRef {
    pub fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }
}

/// A single-cell rewrite produced by a transform pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    /// Column index
    pub col: u8,
    /// Row index
    pub row: u8,
    /// Symbol occupying the cell before the rewrite
    pub old_id: SymbolId,
    /// Symbol occupying the cell after the rewrite
    pub new_id: SymbolId,
}

/// One winning cluster inside a cascade event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHit {
    /// Symbol the cluster pays as
    pub symbol_id: SymbolId,
    /// Symbol name (for renderer-side effect lookup)
    pub symbol_name: String,
    /// Number of cells in the cluster
    pub size: u32,
    /// Win amount for this cluster
    pub win_amount: f64,
    /// Member cells
    pub cells: Vec<CellRef>,
    /// Area-effect cells when a super member amplified the step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub super_cells: Vec<CellRef>,
}

impl ClusterHit {
    /// Check whether a super member contributed to this hit
    pub fn has_super(&self) -> bool {
        !self.super_cells.is_empty()
    }
}

/// Dimensions of a snapshot: `(cols, rows)`; `None` for ragged snapshots
pub fn snapshot_dims(snapshot: &GridSnapshot) -> Option<(usize, usize)> {
    let cols = snapshot.len();
    let rows = snapshot.first().map(|c| c.len())?;
    if snapshot.iter().all(|c| c.len() == rows) {
        Some((cols, rows))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_dims() {
        let snap: GridSnapshot = vec![vec![0, 1, 2], vec![3, 4, 5]];
        assert_eq!(snapshot_dims(&snap), Some((2, 3)));

        let ragged: GridSnapshot = vec![vec![0, 1], vec![3]];
        assert_eq!(snapshot_dims(&ragged), None);
    }

    #[test]
    fn test_cluster_hit_super() {
        let hit = ClusterHit {
            symbol_id: 2,
            symbol_name: "archer".into(),
            size: 5,
            win_amount: 3.0,
            cells: vec![CellRef::new(0, 0)],
            super_cells: Vec::new(),
        };
        assert!(!hit.has_super());
    }
}
