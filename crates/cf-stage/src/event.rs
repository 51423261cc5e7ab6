//! TimelineEvent — a stage occurrence with full board context
//!
//! Wraps a stage with the grid snapshot taken at that point and the running
//! win totals, so a timeline is replayable without any engine state.

use serde::{Deserialize, Serialize};

use crate::stage::TimelineStage;
use crate::taxonomy::GridSnapshot;

/// One entry of a spin timeline
///
/// Events are immutable once appended. The snapshot is the board AFTER the
/// stage took effect (for `SpinStart`, the freshly landed board).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// The canonical stage
    pub stage: TimelineStage,

    /// Full board snapshot at this point, column-major
    pub grid: GridSnapshot,

    /// Win accrued by this event alone
    #[serde(default)]
    pub step_win: f64,

    /// Running total across the whole spin, including this event
    #[serde(default)]
    pub total_win: f64,
}

impl TimelineEvent {
    /// Create an event with no win attached
    pub fn new(stage: TimelineStage, grid: GridSnapshot) -> Self {
        Self {
            stage,
            grid,
            step_win: 0.0,
            total_win: 0.0,
        }
    }

    /// Create an event carrying step and running totals
    pub fn with_wins(stage: TimelineStage, grid: GridSnapshot, step_win: f64, total_win: f64) -> Self {
        Self {
            stage,
            grid,
            step_win,
            total_win,
        }
    }

    /// Get stage type name
    pub fn type_name(&self) -> &'static str {
        self.stage.type_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = TimelineEvent::new(TimelineStage::SpinStart, vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(event.type_name(), "SPIN_START");
        assert_eq!(event.step_win, 0.0);
        assert_eq!(event.total_win, 0.0);
    }

    #[test]
    fn test_event_serialization() {
        let event = TimelineEvent::with_wins(
            TimelineStage::Transform { changes: vec![] },
            vec![vec![0]],
            0.0,
            12.5,
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: TimelineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.total_win, 12.5);
    }
}
