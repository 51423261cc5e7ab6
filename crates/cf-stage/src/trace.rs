//! Timeline trace validation
//!
//! Structural checks a well-formed timeline must satisfy, used by engine
//! tests and batch tooling before a timeline is handed to playback.

use thiserror::Error;

use crate::event::TimelineEvent;
use crate::stage::TimelineStage;
use crate::taxonomy::snapshot_dims;

/// Structural defect in a timeline
#[derive(Error, Debug, PartialEq)]
pub enum TraceError {
    #[error("Timeline is empty")]
    Empty,

    #[error("Timeline does not begin with SPIN_START")]
    MissingSpinStart,

    #[error("Event {index} snapshot is ragged or empty")]
    RaggedSnapshot { index: usize },

    #[error("Event {index} snapshot is {actual_cols}x{actual_rows}, expected {cols}x{rows}")]
    DimensionDrift {
        index: usize,
        cols: usize,
        rows: usize,
        actual_cols: usize,
        actual_rows: usize,
    },

    #[error("Event {index} running total {total} is below the previous total {previous}")]
    TotalRegression {
        index: usize,
        total: f64,
        previous: f64,
    },
}

/// Validate a timeline's structural invariants
///
/// Checks that the log begins with `SPIN_START`, every snapshot is
/// rectangular with constant dimensions, and the running total never
/// decreases. Returns the first defect found.
pub fn validate_timeline(events: &[TimelineEvent]) -> Result<(), TraceError> {
    let first = events.first().ok_or(TraceError::Empty)?;
    if !matches!(first.stage, TimelineStage::SpinStart) {
        return Err(TraceError::MissingSpinStart);
    }

    let (cols, rows) = snapshot_dims(&first.grid).ok_or(TraceError::RaggedSnapshot { index: 0 })?;

    let mut previous = 0.0f64;
    for (index, event) in events.iter().enumerate() {
        let (actual_cols, actual_rows) =
            snapshot_dims(&event.grid).ok_or(TraceError::RaggedSnapshot { index })?;
        if (actual_cols, actual_rows) != (cols, rows) {
            return Err(TraceError::DimensionDrift {
                index,
                cols,
                rows,
                actual_cols,
                actual_rows,
            });
        }

        if event.total_win < previous {
            return Err(TraceError::TotalRegression {
                index,
                total: event.total_win,
                previous,
            });
        }
        previous = event.total_win;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::GridSnapshot;

    fn snap() -> GridSnapshot {
        vec![vec![0, 1], vec![2, 3]]
    }

    #[test]
    fn test_valid_timeline() {
        let events = vec![
            TimelineEvent::new(TimelineStage::SpinStart, snap()),
            TimelineEvent::with_wins(
                TimelineStage::Cascade {
                    clusters: Vec::new(),
                    removed_by_column: vec![vec![0], vec![]],
                    replacements_by_column: vec![vec![1], vec![]],
                },
                snap(),
                5.0,
                5.0,
            ),
        ];
        assert!(validate_timeline(&events).is_ok());
    }

    #[test]
    fn test_empty_timeline() {
        assert_eq!(validate_timeline(&[]), Err(TraceError::Empty));
    }

    #[test]
    fn test_missing_spin_start() {
        let events = vec![TimelineEvent::new(
            TimelineStage::Transform { changes: vec![] },
            snap(),
        )];
        assert_eq!(validate_timeline(&events), Err(TraceError::MissingSpinStart));
    }

    #[test]
    fn test_dimension_drift() {
        let events = vec![
            TimelineEvent::new(TimelineStage::SpinStart, snap()),
            TimelineEvent::new(TimelineStage::Transform { changes: vec![] }, vec![vec![0]]),
        ];
        assert!(matches!(
            validate_timeline(&events),
            Err(TraceError::DimensionDrift { index: 1, .. })
        ));
    }

    #[test]
    fn test_total_regression() {
        let mut win = TimelineEvent::new(TimelineStage::SpinStart, snap());
        win.total_win = 10.0;
        let mut drop = TimelineEvent::new(TimelineStage::Transform { changes: vec![] }, snap());
        drop.total_win = 3.0;
        assert!(matches!(
            validate_timeline(&[win, drop]),
            Err(TraceError::TotalRegression { index: 1, .. })
        ));
    }
}
