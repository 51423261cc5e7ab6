//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::symbols::{standard_symbols, SymbolDef};

/// Grid specification (columns × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of columns
    pub cols: u8,
    /// Number of visible rows per column
    pub rows: u8,
}

impl GridSpec {
    /// Standard 7×7 cluster board
    pub fn standard_7x7() -> Self {
        Self { cols: 7, rows: 7 }
    }

    /// Compact 5×5 board
    pub fn compact_5x5() -> Self {
        Self { cols: 5, rows: 5 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_7x7()
    }
}

/// Variety control: keep only `keep` randomly chosen members of a symbol
/// group active per spin, zeroing the weights of the rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRule {
    /// Group label on the symbol definitions
    pub group: String,
    /// How many members stay active
    pub keep: usize,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Board dimensions
    pub grid: GridSpec,

    /// Global minimum connected-group size required to pay
    pub cluster_size: usize,

    /// Defensive cap on resolution rounds per spin
    pub max_rounds: u32,

    /// Per-spin group activation rules
    #[serde(default)]
    pub groups: Vec<GroupRule>,
}

impl EngineConfig {
    /// Validate, fail-fast before any spin
    pub fn validate(&self) -> EngineResult<()> {
        if self.grid.cols == 0 || self.grid.rows == 0 {
            return Err(EngineError::Config(format!(
                "grid must be non-empty, got {}x{}",
                self.grid.cols, self.grid.rows
            )));
        }
        if self.cluster_size == 0 {
            return Err(EngineError::Config("cluster_size must be at least 1".into()));
        }
        if self.max_rounds == 0 {
            return Err(EngineError::Config("max_rounds must be at least 1".into()));
        }
        for rule in &self.groups {
            if rule.group.is_empty() {
                return Err(EngineError::Config("group rule with empty label".into()));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            cluster_size: 4,
            max_rounds: 256,
            groups: Vec::new(),
        }
    }
}

/// A complete, loadable game: engine configuration plus the ordered symbol
/// catalog definitions (ids are assigned by list position)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDefinition {
    /// Engine configuration
    pub config: EngineConfig,
    /// Ordered symbol definitions
    pub symbols: Vec<SymbolDef>,
}

impl GameDefinition {
    /// Built-in demo game: 7×7 board, troop/resource symbols, mystery camp,
    /// stronghold multiplier, search hammer and a wildcard super banner
    pub fn standard() -> Self {
        Self {
            config: EngineConfig {
                groups: vec![GroupRule {
                    group: "troop".into(),
                    keep: 3,
                }],
                ..EngineConfig::default()
            },
            symbols: standard_symbols(),
        }
    }

    /// Load from a JSON string
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Config(format!("invalid JSON game definition: {e}")))
    }

    /// Load from a YAML string
    pub fn from_yaml(yaml: &str) -> EngineResult<Self> {
        serde_yml::from_str(yaml).map_err(|e| EngineError::Config(format!("invalid YAML game definition: {e}")))
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_grid_rejected() {
        let config = EngineConfig {
            grid: GridSpec { cols: 0, rows: 7 },
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_zero_cluster_size_rejected() {
        let config = EngineConfig {
            cluster_size: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_definition_json_round_trip() {
        let def = GameDefinition::standard();
        let json = def.to_json();
        let back = GameDefinition::from_json(&json).unwrap();
        assert_eq!(back.symbols.len(), def.symbols.len());
        assert_eq!(back.config.grid, def.config.grid);
    }

    #[test]
    fn test_definition_yaml_loading() {
        let yaml = r#"
config:
  grid: { cols: 3, rows: 3 }
  cluster_size: 3
  max_rounds: 64
symbols:
  - name: ruby
    weight: 1.0
    payouts: { 3: 5.0 }
  - name: pearl
    weight: 1.0
    payouts: { 3: 2.0 }
"#;
        let def = GameDefinition::from_yaml(yaml).unwrap();
        assert_eq!(def.config.cluster_size, 3);
        assert_eq!(def.symbols.len(), 2);
        assert_eq!(def.symbols[0].name, "ruby");
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            GameDefinition::from_json("{not json"),
            Err(EngineError::Config(_))
        ));
    }
}
