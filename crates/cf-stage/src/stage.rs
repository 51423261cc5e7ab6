//! TimelineStage — the core enum defining all canonical spin moments
//!
//! A stage is NOT an animation and NOT an engine internal.
//! A stage is the SEMANTIC MEANING of one step of a resolved spin.

use serde::{Deserialize, Serialize};

use crate::taxonomy::{CellChange, CellRef, ClusterHit, SymbolId};

/// Canonical spin stage — the universal language of cluster-pays game flow
///
/// Every event in a spin timeline is one of these. The renderer plays them
/// back in order; the engine never emits anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineStage {
    /// Initial board landed, spin resolution begins
    SpinStart,

    /// A batch symbol conversion (e.g. every mystery symbol revealed as the
    /// same freshly drawn symbol)
    Transform {
        /// Per-cell rewrites, one entry per converted cell
        changes: Vec<CellChange>,
    },

    /// Winning clusters removed and the board refilled from above
    Cascade {
        /// Accepted clusters with their individual wins
        #[serde(default)]
        clusters: Vec<ClusterHit>,
        /// Exploded row indices per column (empty vec = column untouched)
        removed_by_column: Vec<Vec<u8>>,
        /// Freshly drawn symbols appended per column, bottom-up
        replacements_by_column: Vec<Vec<SymbolId>>,
    },

    /// A single-tile ability fired (search-and-destroy style)
    Ability {
        /// The cell holding the triggering symbol
        trigger: CellRef,
        /// Symbol type the ability locked onto
        target_symbol: SymbolId,
        /// Every board cell holding the target symbol
        targets: Vec<CellRef>,
        /// Win accrued by the ability
        win_amount: f64,
    },

    /// One-time bonus applied from multiplier symbols on the settled board
    BonusAmount {
        /// Sum of the individual multiplier values
        multiplier_sum: f64,
        /// Bonus amount credited
        amount: f64,
        /// Cells contributing to the multiplier sum
        #[serde(default)]
        contributors: Vec<CellRef>,
    },

    /// Count-based trigger handed to the external bonus game
    BonusGame {
        /// Triggering symbol
        symbol_id: SymbolId,
        /// How many instances were on the settled board
        count: u32,
        /// Payout returned by the bonus game collaborator
        amount: f64,
    },
}

impl TimelineStage {
    /// Get canonical stage type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SpinStart => "SPIN_START",
            Self::Transform { .. } => "TRANSFORM",
            Self::Cascade { .. } => "CASCADE",
            Self::Ability { .. } => "ABILITY",
            Self::BonusAmount { .. } => "BONUS_AMOUNT",
            Self::BonusGame { .. } => "BONUS_GAME",
        }
    }

    /// Does this stage mutate the board?
    pub fn mutates_board(&self) -> bool {
        matches!(self, Self::Transform { .. } | Self::Cascade { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(TimelineStage::SpinStart.type_name(), "SPIN_START");
        let t = TimelineStage::Transform { changes: vec![] };
        assert_eq!(t.type_name(), "TRANSFORM");
        assert!(t.mutates_board());
        assert!(!TimelineStage::SpinStart.mutates_board());
    }

    #[test]
    fn test_serde_tagging() {
        let stage = TimelineStage::Cascade {
            clusters: Vec::new(),
            removed_by_column: vec![vec![0, 1], vec![]],
            replacements_by_column: vec![vec![3, 4], vec![]],
        };
        let json = serde_json::to_string(&stage).unwrap();
        assert!(json.contains("\"type\":\"cascade\""));

        let back: TimelineStage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stage);
    }
}
