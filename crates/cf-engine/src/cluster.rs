//! Adjacency cluster detection
//!
//! Depth-first flood fill over the board under the symbol compatibility
//! relation. Two rules give the search its shape:
//!
//! - Pure wilds with a concrete unvisited neighbor never seed a search;
//!   they wait to be absorbed into the concrete symbol's cluster, so wilds
//!   never form clusters keyed on "wild" identity.
//! - Only ACCEPTED clusters lock their cells in the global visited bitmap.
//!   A rejected sub-threshold exploration leaves its cells claimable by a
//!   later search from a different seed.

use crate::grid::Grid;
use crate::symbols::{SymbolCatalog, SymbolId};

/// One cell inside a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterCell {
    pub col: usize,
    pub row: usize,
    pub symbol: SymbolId,
}

/// A connected group of compatible cells, size ≥ the effective minimum
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// The seed symbol the flood fill matched against
    pub anchor: SymbolId,
    /// Member cells in discovery order
    pub cells: Vec<ClusterCell>,
}

impl Cluster {
    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Never true for an emitted cluster
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

fn neighbors(col: usize, row: usize, cols: usize, rows: usize) -> impl Iterator<Item = (usize, usize)> {
    DIRECTIONS.iter().filter_map(move |&(dc, dr)| {
        let nc = col as isize + dc;
        let nr = row as isize + dr;
        if nc >= 0 && (nc as usize) < cols && nr >= 0 && (nr as usize) < rows {
            Some((nc as usize, nr as usize))
        } else {
            None
        }
    })
}

/// Find all disjoint winning clusters on the board
///
/// Outer scan is column-major; that decides which cell seeds each search
/// but never the final membership. The returned order carries no guarantee.
pub fn find_clusters(grid: &Grid, catalog: &SymbolCatalog, global_min: usize) -> Vec<Cluster> {
    let cols = grid.cols();
    let rows = grid.rows();
    let idx = |col: usize, row: usize| col * rows + row;

    let mut visited = vec![false; cols * rows];
    let mut clusters = Vec::new();

    for col in 0..cols {
        for row in 0..rows {
            if visited[idx(col, row)] {
                continue;
            }
            let seed = grid.get(col, row);

            if catalog.is_wild(seed) {
                let has_concrete_neighbor = neighbors(col, row, cols, rows).any(|(nc, nr)| {
                    !visited[idx(nc, nr)] && !catalog.is_wild(grid.get(nc, nr))
                });
                if has_concrete_neighbor {
                    continue;
                }
            }

            let def = catalog.def(seed);
            if def.dont_cluster && def.cluster_size != Some(1) {
                visited[idx(col, row)] = true;
                continue;
            }

            let mut local = vec![false; cols * rows];
            let mut cells = Vec::new();
            let mut stack = vec![(col, row)];
            while let Some((c, r)) = stack.pop() {
                if visited[idx(c, r)] || local[idx(c, r)] {
                    continue;
                }
                let here = grid.get(c, r);
                if !catalog.compatible(seed, here) {
                    continue;
                }
                local[idx(c, r)] = true;
                cells.push(ClusterCell {
                    col: c,
                    row: r,
                    symbol: here,
                });
                for (nc, nr) in neighbors(c, r, cols, rows) {
                    if !visited[idx(nc, nr)] && !local[idx(nc, nr)] {
                        stack.push((nc, nr));
                    }
                }
            }

            if cells.len() >= catalog.effective_cluster_size(seed, global_min) {
                for cell in &cells {
                    visited[idx(cell.col, cell.row)] = true;
                }
                clusters.push(Cluster {
                    anchor: seed,
                    cells,
                });
            }
        }
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolDef;

    fn catalog() -> SymbolCatalog {
        let mut loner = SymbolDef::regular("loner", 1.0);
        loner.dont_cluster = true;
        SymbolCatalog::new(vec![
            SymbolDef::regular("alpha", 1.0).with_payouts(&[(3, 1.0)]),
            SymbolDef::regular("beta", 1.0).with_payouts(&[(3, 1.0)]),
            SymbolDef::wild("joker", 1.0),
            loner,
            SymbolDef::regular("giant", 1.0)
                .with_payouts(&[(3, 1.0)])
                .with_cluster_size(7),
        ])
        .unwrap()
    }

    const A: SymbolId = 0;
    const B: SymbolId = 1;
    const W: SymbolId = 2;
    const L: SymbolId = 3;
    const G: SymbolId = 4;

    fn grid(cells: Vec<Vec<SymbolId>>) -> Grid {
        Grid::from_raw(cells)
    }

    #[test]
    fn test_simple_column_cluster() {
        let grid = grid(vec![vec![A, A, A], vec![B, L, B], vec![B, L, B]]);
        let clusters = find_clusters(&grid, &catalog(), 3);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].anchor, A);
        assert_eq!(clusters[0].len(), 3);
    }

    #[test]
    fn test_sub_threshold_discarded() {
        let grid = grid(vec![vec![A, A, B], vec![B, L, L], vec![L, B, L]]);
        let clusters = find_clusters(&grid, &catalog(), 3);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_wild_absorbed_into_concrete_cluster() {
        // Wild sits between an alpha pair and a beta column. The alpha
        // search reaches it first; beta pays without it.
        let grid = grid(vec![vec![A, A, L], vec![L, W, L], vec![B, B, B]]);
        let clusters = find_clusters(&grid, &catalog(), 3);
        assert_eq!(clusters.len(), 2);

        let alpha = clusters.iter().find(|c| c.anchor == A).unwrap();
        let beta = clusters.iter().find(|c| c.anchor == B).unwrap();
        assert_eq!(alpha.len(), 3);
        assert!(alpha.cells.iter().any(|c| c.symbol == W));
        assert_eq!(beta.len(), 3);
        assert!(beta.cells.iter().all(|c| c.symbol == B));

        // Never double-counted
        let mut seen = std::collections::HashSet::new();
        for cluster in &clusters {
            for cell in &cluster.cells {
                assert!(seen.insert((cell.col, cell.row)));
            }
        }
    }

    #[test]
    fn test_wild_only_board_clusters_as_wild() {
        // No concrete neighbor anywhere: the deferral rule lapses and the
        // wilds may seed their own cluster.
        let grid = grid(vec![vec![W, W, W], vec![W, W, W], vec![W, W, W]]);
        let clusters = find_clusters(&grid, &catalog(), 3);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 9);
    }

    #[test]
    fn test_dont_cluster_never_groups() {
        let grid = grid(vec![vec![L, L, L], vec![L, L, L], vec![B, A, B]]);
        let clusters = find_clusters(&grid, &catalog(), 3);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_per_symbol_minimum_overrides_global() {
        // Six connected giants, minimum seven: no cluster.
        let six = grid(vec![vec![G, G, G], vec![G, G, G], vec![A, B, A]]);
        let clusters = find_clusters(&six, &catalog(), 3);
        assert!(clusters.is_empty());

        // Seventh giant completes it.
        let grid = grid(vec![vec![G, G, G], vec![G, G, G], vec![G, B, A]]);
        let clusters = find_clusters(&grid, &catalog(), 3);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 7);
    }

    #[test]
    fn test_membership_reachable_and_compatible() {
        let grid = grid(vec![vec![A, W, A], vec![A, L, A], vec![B, B, B]]);
        let clusters = find_clusters(&grid, &catalog(), 3);
        let cat = catalog();
        for cluster in &clusters {
            for cell in &cluster.cells {
                assert!(cat.compatible(cluster.anchor, cell.symbol));
            }
        }
    }
}
