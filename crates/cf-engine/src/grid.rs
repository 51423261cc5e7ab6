//! The board: a column-major grid of symbol ids
//!
//! Every cell always holds a valid id — there is no "empty" state. The grid
//! is mutated only by the initial fill, transform overwrites, and cascades.

use serde::{Deserialize, Serialize};

use cf_stage::GridSnapshot;

use crate::config::GridSpec;
use crate::error::{EngineError, EngineResult};
use crate::rng::SpinRng;
use crate::sampler::{sample, OccupancyScope, SampleContext};
use crate::symbols::{SymbolCatalog, SymbolId};

/// A fixed `cols × rows` board, `grid[col][row]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<Vec<SymbolId>>,
}

impl Grid {
    /// Build from raw columns, enforcing the configured shape
    pub fn from_columns(cells: Vec<Vec<SymbolId>>, spec: GridSpec) -> EngineResult<Self> {
        let expected_cols = spec.cols as usize;
        let expected_rows = spec.rows as usize;
        let actual_cols = cells.len();
        let actual_rows = cells
            .iter()
            .map(|c| c.len())
            .find(|&len| len != expected_rows)
            .unwrap_or(expected_rows);

        if actual_cols != expected_cols || actual_rows != expected_rows {
            return Err(EngineError::ShapeMismatch {
                expected_cols,
                expected_rows,
                actual_cols,
                actual_rows,
            });
        }
        Ok(Self { cells })
    }

    /// Internal constructor for cascade results; shape is preserved by
    /// construction
    pub(crate) fn from_raw(cells: Vec<Vec<SymbolId>>) -> Self {
        debug_assert!(!cells.is_empty());
        debug_assert!(cells.iter().all(|c| c.len() == cells[0].len()));
        Self { cells }
    }

    /// Generate the initial board
    ///
    /// All coordinates are shuffled (Fisher–Yates on the spin RNG) before
    /// filling, and every draw consults the partially filled board, so
    /// occurrence-capped and one-per-reel symbols behave independently of
    /// scan order.
    pub fn generate(
        spec: GridSpec,
        catalog: &SymbolCatalog,
        active: &[bool],
        rng: &mut SpinRng,
    ) -> Self {
        let cols = spec.cols as usize;
        let rows = spec.rows as usize;

        let mut coords = Vec::with_capacity(cols * rows);
        for col in 0..cols {
            for row in 0..rows {
                coords.push((col, row));
            }
        }
        rng.shuffle(&mut coords);

        let mut partial = PartialFill {
            cells: vec![vec![None; rows]; cols],
        };
        for (col, row) in coords {
            let ctx = SampleContext::initial_fill(catalog, active, col);
            let id = sample(&ctx, &partial, rng);
            partial.cells[col][row] = Some(id);
        }

        Self {
            cells: partial
                .cells
                .into_iter()
                .map(|col| col.into_iter().flatten().collect())
                .collect(),
        }
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.cells.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Symbol at a cell
    pub fn get(&self, col: usize, row: usize) -> SymbolId {
        self.cells[col][row]
    }

    /// Overwrite a cell
    pub fn set(&mut self, col: usize, row: usize, id: SymbolId) {
        self.cells[col][row] = id;
    }

    /// Raw columns
    pub fn columns(&self) -> &[Vec<SymbolId>] {
        &self.cells
    }

    /// Every position holding `id`, column-major order
    pub fn positions_of(&self, id: SymbolId) -> Vec<(usize, usize)> {
        let mut positions = Vec::new();
        for (col, column) in self.cells.iter().enumerate() {
            for (row, &cell) in column.iter().enumerate() {
                if cell == id {
                    positions.push((col, row));
                }
            }
        }
        positions
    }

    /// Detached snapshot for timeline events
    pub fn snapshot(&self) -> GridSnapshot {
        self.cells.clone()
    }
}

impl OccupancyScope for Grid {
    fn occurrences(&self, id: SymbolId) -> usize {
        self.cells
            .iter()
            .flat_map(|c| c.iter())
            .filter(|&&cell| cell == id)
            .count()
    }

    fn column_contains(&self, col: usize, id: SymbolId) -> bool {
        self.cells[col].contains(&id)
    }
}

/// Board under construction during the initial fill
struct PartialFill {
    cells: Vec<Vec<Option<SymbolId>>>,
}

impl OccupancyScope for PartialFill {
    fn occurrences(&self, id: SymbolId) -> usize {
        self.cells
            .iter()
            .flat_map(|c| c.iter())
            .filter(|cell| **cell == Some(id))
            .count()
    }

    fn column_contains(&self, col: usize, id: SymbolId) -> bool {
        self.cells[col].contains(&Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{standard_symbols, SymbolDef};

    fn catalog() -> SymbolCatalog {
        SymbolCatalog::new(standard_symbols()).unwrap()
    }

    #[test]
    fn test_generate_fills_every_cell() {
        let catalog = catalog();
        let active = vec![true; catalog.len()];
        let mut rng = SpinRng::with_seed(42);
        let grid = Grid::generate(GridSpec::standard_7x7(), &catalog, &active, &mut rng);

        assert_eq!(grid.cols(), 7);
        assert_eq!(grid.rows(), 7);
        for column in grid.columns() {
            for &cell in column {
                assert!((cell as usize) < catalog.len());
            }
        }
    }

    #[test]
    fn test_generate_deterministic() {
        let catalog = catalog();
        let active = vec![true; catalog.len()];
        let a = Grid::generate(
            GridSpec::standard_7x7(),
            &catalog,
            &active,
            &mut SpinRng::with_seed(42),
        );
        let b = Grid::generate(
            GridSpec::standard_7x7(),
            &catalog,
            &active,
            &mut SpinRng::with_seed(42),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_one_per_reel_respected_in_fill() {
        let mut rare = SymbolDef::regular("rare", 1000.0).with_payouts(&[(4, 1.0)]);
        rare.one_per_reel = true;
        let catalog = SymbolCatalog::new(vec![
            SymbolDef::regular("filler", 1.0).with_payouts(&[(4, 1.0)]),
            rare,
        ])
        .unwrap();
        let active = vec![true; catalog.len()];
        let rare_id = catalog.id_of("rare").unwrap();

        for seed in 0..50 {
            let grid = Grid::generate(
                GridSpec { cols: 5, rows: 5 },
                &catalog,
                &active,
                &mut SpinRng::with_seed(seed),
            );
            for column in grid.columns() {
                let count = column.iter().filter(|&&c| c == rare_id).count();
                assert!(count <= 1, "seed {seed}: {count} in one column");
            }
        }
    }

    #[test]
    fn test_stepped_cap_respected_in_fill() {
        let capped = SymbolDef::regular("capped", 0.0)
            .with_stepped_weight(vec![100.0, 100.0, 100.0])
            .with_payouts(&[(4, 1.0)]);
        let catalog = SymbolCatalog::new(vec![
            SymbolDef::regular("filler", 1.0).with_payouts(&[(4, 1.0)]),
            capped,
        ])
        .unwrap();
        let active = vec![true; catalog.len()];
        let capped_id = catalog.id_of("capped").unwrap();

        for seed in 0..50 {
            let grid = Grid::generate(
                GridSpec { cols: 6, rows: 6 },
                &catalog,
                &active,
                &mut SpinRng::with_seed(seed),
            );
            assert!(grid.occurrences(capped_id) <= 3, "seed {seed}");
        }
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let spec = GridSpec { cols: 3, rows: 3 };
        let err = Grid::from_columns(vec![vec![0, 0, 0], vec![0, 0]], spec);
        assert!(matches!(err, Err(EngineError::ShapeMismatch { .. })));

        let err = Grid::from_columns(vec![vec![0, 0, 0]; 2], spec);
        assert!(matches!(err, Err(EngineError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_positions_of_column_major() {
        let grid = Grid::from_raw(vec![vec![1, 0], vec![0, 1]]);
        assert_eq!(grid.positions_of(1), vec![(0, 0), (1, 1)]);
        assert_eq!(grid.occurrences(0), 2);
    }
}
