//! Error types for the ClusterForge engine

use thiserror::Error;

/// Engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Grid shape mismatch: expected {expected_cols}x{expected_rows}, got {actual_cols}x{actual_rows}")]
    ShapeMismatch {
        expected_cols: usize,
        expected_rows: usize,
        actual_cols: usize,
        actual_rows: usize,
    },

    #[error("Spin did not settle within {rounds} rounds")]
    RunawayCascade { rounds: u32 },

    #[error("A spin is already in progress")]
    SpinInProgress,
}

/// Result type alias
pub type EngineResult<T> = Result<T, EngineError>;
