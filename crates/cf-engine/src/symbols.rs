//! Symbol definitions and the symbol catalog
//!
//! A game is described by an ordered list of [`SymbolDef`]s. The catalog
//! assigns dense integer ids by list position, validates the whole set
//! fail-fast, and answers every per-symbol question the engine asks during
//! a spin (weights, compatibility, minimum cluster sizes, payouts).

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

pub use cf_stage::SymbolId;

use crate::config::GroupRule;
use crate::error::{EngineError, EngineResult};
use crate::rng::SpinRng;

/// Wildcard markers accepted in `matches_with`
const WILDCARD_MARKERS: [&str; 2] = ["*", "ALL"];

/// Sampling mass for a symbol
///
/// `Scalar` is a fixed mass. `Stepped` is indexed by how many instances of
/// the symbol are already in scope: the count selects the mass, and a count
/// at or past the end of the list means the cap is reached (mass 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolWeight {
    Scalar(f64),
    Stepped(Vec<f64>),
}

impl SymbolWeight {
    /// Resolve against an occurrence count in scope
    pub fn resolve(&self, occurrences: usize) -> f64 {
        match self {
            Self::Scalar(w) => *w,
            Self::Stepped(steps) => {
                if occurrences >= steps.len() {
                    0.0
                } else {
                    steps[occurrences]
                }
            }
        }
    }

    fn masses(&self) -> &[f64] {
        match self {
            Self::Scalar(w) => std::slice::from_ref(w),
            Self::Stepped(steps) => steps,
        }
    }
}

/// Special single-tile ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ability {
    /// Lock onto one target symbol type present on the board and explode
    /// every instance of it (plus the trigger cell), paying by target count
    Search {
        /// Names of the symbols the ability may target
        targets: Vec<String>,
        /// Target count → payout value (saturating lookup)
        payouts: BTreeMap<usize, f64>,
    },
}

/// A symbol definition
///
/// Loaded as data; the id is NOT part of the definition — the catalog
/// assigns ids by list position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDef {
    /// Unique symbol name
    pub name: String,

    /// Sampling mass
    pub weight: SymbolWeight,

    /// Variety-control group label
    #[serde(default)]
    pub group: Option<String>,

    /// Per-symbol override of the global minimum cluster size
    #[serde(default)]
    pub cluster_size: Option<usize>,

    /// Never merges with neighbors (unless `cluster_size` is 1, which marks
    /// a self-contained single-tile trigger)
    #[serde(default)]
    pub dont_cluster: bool,

    /// Names this symbol completes clusters of when adjacent; the markers
    /// `"*"` / `"ALL"` make it a pure wild
    #[serde(default)]
    pub matches_with: Vec<String>,

    /// Only eligible for the initial board fill, never for cascade refills
    #[serde(default)]
    pub only_appear_on_roll: bool,

    /// At most one instance per column at fill time
    #[serde(default)]
    pub one_per_reel: bool,

    /// Cluster size → payout value (saturating lookup)
    #[serde(default)]
    pub payouts: BTreeMap<usize, f64>,

    /// Super member: multiplies the step win when part of a winning cluster
    #[serde(default)]
    pub super_multiplier: Option<f64>,

    /// Mystery symbol: every occurrence converts, per round, into one
    /// freshly sampled symbol from this name pool
    #[serde(default)]
    pub transform_into: Vec<String>,

    /// Single-tile ability
    #[serde(default)]
    pub ability: Option<Ability>,

    /// Contributes to the final board multiplier sum
    #[serde(default)]
    pub board_multiplier: Option<f64>,

    /// Count of board instances that triggers the external bonus game
    #[serde(default)]
    pub bonus_trigger_count: Option<usize>,
}

impl SymbolDef {
    /// Create a plain paying symbol
    pub fn regular(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight: SymbolWeight::Scalar(weight),
            group: None,
            cluster_size: None,
            dont_cluster: false,
            matches_with: Vec::new(),
            only_appear_on_roll: false,
            one_per_reel: false,
            payouts: BTreeMap::new(),
            super_multiplier: None,
            transform_into: Vec::new(),
            ability: None,
            board_multiplier: None,
            bonus_trigger_count: None,
        }
    }

    /// Create a pure wild (matches everything)
    pub fn wild(name: impl Into<String>, weight: f64) -> Self {
        let mut def = Self::regular(name, weight);
        def.matches_with = vec!["*".into()];
        def
    }

    /// Builder: payout table from `(size, value)` pairs
    pub fn with_payouts(mut self, pairs: &[(usize, f64)]) -> Self {
        self.payouts = pairs.iter().copied().collect();
        self
    }

    /// Builder: group label
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Builder: occurrence-stepped weight
    pub fn with_stepped_weight(mut self, steps: Vec<f64>) -> Self {
        self.weight = SymbolWeight::Stepped(steps);
        self
    }

    /// Builder: minimum cluster size override
    pub fn with_cluster_size(mut self, size: usize) -> Self {
        self.cluster_size = Some(size);
        self
    }

    /// Is this a pure wild?
    pub fn is_wild(&self) -> bool {
        self.matches_with
            .iter()
            .any(|m| WILDCARD_MARKERS.contains(&m.as_str()))
    }

    /// Is this a super member?
    pub fn is_super(&self) -> bool {
        self.super_multiplier.is_some()
    }

    /// Is this a mystery symbol?
    pub fn is_mystery(&self) -> bool {
        !self.transform_into.is_empty()
    }
}

/// Saturating payout lookup: the value at the largest key ≤ `size`, 0 if no
/// key qualifies
pub fn saturating_payout(table: &BTreeMap<usize, f64>, size: usize) -> f64 {
    table
        .range(..=size)
        .next_back()
        .map(|(_, v)| *v)
        .unwrap_or(0.0)
}

/// The validated symbol catalog
///
/// Static for the lifetime of the engine: exactly one definition per id,
/// ids dense in `[0, N)` by load order.
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    defs: Vec<SymbolDef>,
}

impl SymbolCatalog {
    /// Build and validate a catalog; ids are assigned by list position
    pub fn new(defs: Vec<SymbolDef>) -> EngineResult<Self> {
        if defs.is_empty() {
            return Err(EngineError::Config("symbol catalog is empty".into()));
        }

        let mut names = HashSet::new();
        for def in &defs {
            if !names.insert(def.name.as_str()) {
                return Err(EngineError::Config(format!(
                    "duplicate symbol name '{}'",
                    def.name
                )));
            }
        }

        let catalog = Self { defs };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> EngineResult<()> {
        for def in &self.defs {
            for &mass in def.weight.masses() {
                if !mass.is_finite() || mass < 0.0 {
                    return Err(EngineError::Config(format!(
                        "symbol '{}' has an invalid weight {mass}",
                        def.name
                    )));
                }
            }
            if matches!(&def.weight, SymbolWeight::Stepped(steps) if steps.is_empty()) {
                return Err(EngineError::Config(format!(
                    "symbol '{}' has an empty stepped weight",
                    def.name
                )));
            }

            if def.cluster_size == Some(0) {
                return Err(EngineError::Config(format!(
                    "symbol '{}' has a zero cluster size",
                    def.name
                )));
            }
            if def.bonus_trigger_count == Some(0) {
                return Err(EngineError::Config(format!(
                    "symbol '{}' has a zero bonus trigger count",
                    def.name
                )));
            }

            for (size, value) in &def.payouts {
                if *size == 0 || !value.is_finite() || *value < 0.0 {
                    return Err(EngineError::Config(format!(
                        "symbol '{}' has an invalid payout entry {size} => {value}",
                        def.name
                    )));
                }
            }

            if let Some(mult) = def.super_multiplier {
                if !mult.is_finite() || mult <= 0.0 {
                    return Err(EngineError::Config(format!(
                        "symbol '{}' has an invalid super multiplier {mult}",
                        def.name
                    )));
                }
            }
            if let Some(mult) = def.board_multiplier {
                if !mult.is_finite() || mult <= 0.0 {
                    return Err(EngineError::Config(format!(
                        "symbol '{}' has an invalid board multiplier {mult}",
                        def.name
                    )));
                }
            }

            for target in &def.matches_with {
                if !WILDCARD_MARKERS.contains(&target.as_str()) && self.id_of(target).is_none() {
                    return Err(EngineError::Config(format!(
                        "symbol '{}' matches unknown symbol '{target}'",
                        def.name
                    )));
                }
            }
            for target in &def.transform_into {
                if self.id_of(target).is_none() {
                    return Err(EngineError::Config(format!(
                        "symbol '{}' transforms into unknown symbol '{target}'",
                        def.name
                    )));
                }
            }

            if let Some(Ability::Search { targets, payouts }) = &def.ability {
                if targets.is_empty() || payouts.is_empty() {
                    return Err(EngineError::Config(format!(
                        "symbol '{}' has an underspecified search ability",
                        def.name
                    )));
                }
                for target in targets {
                    if self.id_of(target).is_none() {
                        return Err(EngineError::Config(format!(
                            "symbol '{}' ability targets unknown symbol '{target}'",
                            def.name
                        )));
                    }
                }
            }

            // Any symbol the cluster finder can pay out on needs a table.
            let clusters_plainly = !def.dont_cluster
                && !def.is_wild()
                && !def.is_mystery()
                && def.ability.is_none();
            if clusters_plainly && def.payouts.is_empty() {
                return Err(EngineError::Config(format!(
                    "clustering symbol '{}' has no payout table",
                    def.name
                )));
            }
        }
        Ok(())
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Always false for a validated catalog
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// All definitions in id order
    pub fn defs(&self) -> &[SymbolDef] {
        &self.defs
    }

    /// Definition by id
    pub fn get(&self, id: SymbolId) -> Option<&SymbolDef> {
        self.defs.get(id as usize)
    }

    /// Definition by id; ids produced by this catalog are always valid
    pub fn def(&self, id: SymbolId) -> &SymbolDef {
        &self.defs[id as usize]
    }

    /// Id by name
    pub fn id_of(&self, name: &str) -> Option<SymbolId> {
        self.defs
            .iter()
            .position(|d| d.name == name)
            .map(|i| i as SymbolId)
    }

    /// Resolve a list of names; unknown names were rejected at load time
    pub fn resolve_names(&self, names: &[String]) -> Vec<SymbolId> {
        names.iter().filter_map(|n| self.id_of(n)).collect()
    }

    /// Symbol name by id
    pub fn name_of(&self, id: SymbolId) -> &str {
        &self.def(id).name
    }

    /// Is the symbol a pure wild?
    pub fn is_wild(&self, id: SymbolId) -> bool {
        self.def(id).is_wild()
    }

    /// Effective minimum cluster size for a symbol
    pub fn effective_cluster_size(&self, id: SymbolId, global: usize) -> usize {
        self.def(id).cluster_size.unwrap_or(global)
    }

    /// Adjacency compatibility under the match relation, symmetric
    pub fn compatible(&self, target: SymbolId, neighbor: SymbolId) -> bool {
        if target == neighbor {
            return true;
        }
        let t = self.def(target);
        let n = self.def(neighbor);
        if t.dont_cluster || n.dont_cluster {
            return false;
        }
        Self::matches_one_way(t, n) || Self::matches_one_way(n, t)
    }

    fn matches_one_way(source: &SymbolDef, target: &SymbolDef) -> bool {
        source
            .matches_with
            .iter()
            .any(|m| WILDCARD_MARKERS.contains(&m.as_str()) || *m == target.name)
    }

    /// Saturating payout for a symbol's cluster of `size` cells
    pub fn payout(&self, id: SymbolId, size: usize) -> f64 {
        saturating_payout(&self.def(id).payouts, size)
    }

    /// Ids of mystery symbols, ascending
    pub fn mystery_ids(&self) -> Vec<SymbolId> {
        self.ids_where(|d| d.is_mystery())
    }

    /// Ids of ability symbols, ascending
    pub fn ability_ids(&self) -> Vec<SymbolId> {
        self.ids_where(|d| d.ability.is_some())
    }

    /// Ids of bonus-game trigger symbols, ascending
    pub fn bonus_trigger_ids(&self) -> Vec<SymbolId> {
        self.ids_where(|d| d.bonus_trigger_count.is_some())
    }

    fn ids_where(&self, pred: impl Fn(&SymbolDef) -> bool) -> Vec<SymbolId> {
        self.defs
            .iter()
            .enumerate()
            .filter(|(_, d)| pred(d))
            .map(|(i, _)| i as SymbolId)
            .collect()
    }

    /// Per-spin group activation: for each rule, keep `keep` randomly chosen
    /// members of the group active and mask out the rest. Returns one flag
    /// per symbol id.
    pub fn spin_activation(&self, rules: &[GroupRule], rng: &mut SpinRng) -> Vec<bool> {
        let mut active = vec![true; self.defs.len()];
        for rule in rules {
            let mut members: Vec<usize> = self
                .defs
                .iter()
                .enumerate()
                .filter(|(_, d)| d.group.as_deref() == Some(rule.group.as_str()))
                .map(|(i, _)| i)
                .collect();
            rng.shuffle(&mut members);
            for &idx in members.iter().skip(rule.keep) {
                active[idx] = false;
            }
        }
        active
    }
}

/// Built-in demo symbol set: four clustering troops, four resources, a
/// wildcard super banner, a mystery war camp, a search hammer and the
/// stronghold multiplier/bonus building
pub fn standard_symbols() -> Vec<SymbolDef> {
    vec![
        SymbolDef::regular("knight", 20.0)
            .with_group("troop")
            .with_payouts(&[(4, 2.0), (5, 4.0), (6, 8.0), (8, 20.0), (10, 60.0)]),
        SymbolDef::regular("archer", 20.0)
            .with_group("troop")
            .with_payouts(&[(4, 2.0), (5, 4.0), (6, 8.0), (8, 20.0), (10, 60.0)]),
        SymbolDef::regular("mage", 20.0)
            .with_group("troop")
            .with_payouts(&[(4, 3.0), (5, 6.0), (6, 12.0), (8, 30.0), (10, 90.0)]),
        SymbolDef::regular("rogue", 20.0)
            .with_group("troop")
            .with_payouts(&[(4, 3.0), (5, 6.0), (6, 12.0), (8, 30.0), (10, 90.0)]),
        SymbolDef::regular("gold", 40.0)
            .with_payouts(&[(4, 1.0), (6, 2.5), (8, 8.0), (10, 25.0)]),
        SymbolDef::regular("elixir", 40.0)
            .with_payouts(&[(4, 1.0), (6, 2.5), (8, 8.0), (10, 25.0)]),
        SymbolDef::regular("crystal", 30.0)
            .with_payouts(&[(4, 1.5), (6, 4.0), (8, 12.0), (10, 35.0)]),
        SymbolDef::regular("gem", 30.0)
            .with_payouts(&[(4, 1.5), (6, 4.0), (8, 12.0), (10, 35.0)]),
        {
            let mut banner = SymbolDef::wild("banner", 8.0);
            banner.super_multiplier = Some(2.0);
            banner
        },
        {
            let mut camp = SymbolDef::regular("war_camp", 50.0);
            camp.dont_cluster = true;
            camp.transform_into = vec![
                "knight".into(),
                "archer".into(),
                "mage".into(),
                "rogue".into(),
            ];
            camp
        },
        {
            let mut hammer = SymbolDef::regular("war_hammer", 5.0)
                .with_cluster_size(1);
            hammer.dont_cluster = true;
            hammer.one_per_reel = true;
            hammer.ability = Some(Ability::Search {
                targets: vec!["gold".into(), "elixir".into(), "crystal".into(), "gem".into()],
                payouts: [(1, 1.0), (3, 2.5), (5, 6.0), (8, 15.0)].into_iter().collect(),
            });
            hammer
        },
        {
            let mut stronghold = SymbolDef::regular("stronghold", 0.0)
                .with_stepped_weight(vec![5.0, 4.0, 1.0]);
            stronghold.dont_cluster = true;
            stronghold.only_appear_on_roll = true;
            stronghold.board_multiplier = Some(1.0);
            stronghold.bonus_trigger_count = Some(3);
            stronghold
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_validates() {
        let catalog = SymbolCatalog::new(standard_symbols()).unwrap();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.id_of("knight"), Some(0));
        assert_eq!(catalog.id_of("stronghold"), Some(11));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let defs = vec![
            SymbolDef::regular("twin", 1.0).with_payouts(&[(4, 1.0)]),
            SymbolDef::regular("twin", 1.0).with_payouts(&[(4, 1.0)]),
        ];
        assert!(SymbolCatalog::new(defs).is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let defs = vec![SymbolDef::regular("bad", -1.0).with_payouts(&[(4, 1.0)])];
        assert!(SymbolCatalog::new(defs).is_err());
    }

    #[test]
    fn test_unknown_match_target_rejected() {
        let mut def = SymbolDef::regular("orphan", 1.0).with_payouts(&[(4, 1.0)]);
        def.matches_with = vec!["ghost".into()];
        assert!(SymbolCatalog::new(vec![def]).is_err());
    }

    #[test]
    fn test_missing_payouts_rejected_for_clustering_symbol() {
        let defs = vec![SymbolDef::regular("payless", 1.0)];
        assert!(SymbolCatalog::new(defs).is_err());
    }

    #[test]
    fn test_stepped_weight_resolution() {
        let weight = SymbolWeight::Stepped(vec![5.0, 2.0, 0.0]);
        assert_eq!(weight.resolve(0), 5.0);
        assert_eq!(weight.resolve(1), 2.0);
        assert_eq!(weight.resolve(2), 0.0);
        assert_eq!(weight.resolve(3), 0.0);
        assert_eq!(weight.resolve(100), 0.0);
    }

    #[test]
    fn test_saturating_payout() {
        let table: BTreeMap<usize, f64> = [(4, 2.0), (6, 8.0), (10, 60.0)].into_iter().collect();
        assert_eq!(saturating_payout(&table, 3), 0.0);
        assert_eq!(saturating_payout(&table, 4), 2.0);
        assert_eq!(saturating_payout(&table, 5), 2.0);
        assert_eq!(saturating_payout(&table, 9), 8.0);
        assert_eq!(saturating_payout(&table, 49), 60.0);
    }

    #[test]
    fn test_compatibility_symmetry() {
        let catalog = SymbolCatalog::new(standard_symbols()).unwrap();
        let knight = catalog.id_of("knight").unwrap();
        let archer = catalog.id_of("archer").unwrap();
        let banner = catalog.id_of("banner").unwrap();
        let camp = catalog.id_of("war_camp").unwrap();

        assert!(catalog.compatible(knight, knight));
        assert!(!catalog.compatible(knight, archer));
        assert!(catalog.compatible(knight, banner));
        assert!(catalog.compatible(banner, knight));
        // dont_cluster blocks the wild as well
        assert!(!catalog.compatible(banner, camp));
    }

    #[test]
    fn test_weight_untagged_serde() {
        let scalar: SymbolWeight = serde_json::from_str("12.5").unwrap();
        assert_eq!(scalar, SymbolWeight::Scalar(12.5));
        let stepped: SymbolWeight = serde_json::from_str("[5.0, 4.0, 1.0]").unwrap();
        assert_eq!(stepped, SymbolWeight::Stepped(vec![5.0, 4.0, 1.0]));
    }

    #[test]
    fn test_spin_activation_masks_group() {
        let catalog = SymbolCatalog::new(standard_symbols()).unwrap();
        let rules = vec![GroupRule {
            group: "troop".into(),
            keep: 3,
        }];
        let mut rng = SpinRng::with_seed(17);
        let active = catalog.spin_activation(&rules, &mut rng);

        let masked: usize = (0..4).filter(|&i| !active[i]).count();
        assert_eq!(masked, 1);
        // Non-group symbols stay active
        assert!(active[catalog.id_of("gold").unwrap() as usize]);
    }

    #[test]
    fn test_spin_activation_deterministic() {
        let catalog = SymbolCatalog::new(standard_symbols()).unwrap();
        let rules = vec![GroupRule {
            group: "troop".into(),
            keep: 2,
        }];
        let a = catalog.spin_activation(&rules, &mut SpinRng::with_seed(9));
        let b = catalog.spin_activation(&rules, &mut SpinRng::with_seed(9));
        assert_eq!(a, b);
    }
}
