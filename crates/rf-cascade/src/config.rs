//! Engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};
use crate::grid::{COLS, Position, ROWS};
use crate::symbols::{BonusWeighting, Symbol, SymbolCatalog, standard_symbols};

/// Rule constants for cascades and free spins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Smallest connected group that pays
    pub min_cluster_size: usize,
    /// Paid cascades per spin before the loop guard stops resolution
    pub max_cascades: u32,
    /// Scatters on the post-chest grid needed to award free spins
    pub scatter_trigger_count: usize,
    /// Free spins awarded by a base-game trigger
    pub free_spins_award: u32,
    /// Free spins awarded by a bonus-mode retrigger
    pub retrigger_award: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 6,
            max_cascades: 50,
            scatter_trigger_count: 3,
            free_spins_award: 10,
            retrigger_award: 5,
        }
    }
}

/// Promotional override for the first spin of a purchased bonus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForcedWinConfig {
    /// Regular symbol stamped onto the layout
    pub symbol_id: String,
    /// Positions overwritten after the normal draw
    pub positions: Vec<Position>,
}

impl Default for ForcedWinConfig {
    fn default() -> Self {
        // Rows 1, 2 and 4 across columns 1..=3; rows 1-2 form a block of six
        let positions = [1, 2, 4]
            .into_iter()
            .flat_map(|row| (1..=3).map(move |col| Position::new(row, col)))
            .collect();
        Self {
            symbol_id: "BELL".into(),
            positions,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Symbol catalog in draw order
    pub symbols: Vec<Symbol>,
    /// Weight factors applied in bonus mode
    pub bonus_weighting: BonusWeighting,
    pub rules: RuleConfig,
    pub forced_win: ForcedWinConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            symbols: standard_symbols(),
            bonus_weighting: BonusWeighting::default(),
            rules: RuleConfig::default(),
            forced_win: ForcedWinConfig::default(),
        }
    }
}

impl GameConfig {
    /// Standard configuration
    pub fn standard() -> Self {
        Self::default()
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from YAML; missing fields take their defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CascadeError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder: replace the symbol catalog
    pub fn with_symbols(mut self, symbols: Vec<Symbol>) -> Self {
        self.symbols = symbols;
        self
    }

    /// Builder: replace the rule constants
    pub fn with_rules(mut self, rules: RuleConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Builder: replace the forced-win layout
    pub fn with_forced_win(mut self, forced_win: ForcedWinConfig) -> Self {
        self.forced_win = forced_win;
        self
    }

    /// Build the validated symbol catalog
    pub fn catalog(&self) -> Result<SymbolCatalog> {
        SymbolCatalog::new(self.symbols.clone())
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        let catalog = self.catalog()?;
        self.bonus_weighting.validate()?;

        if self.rules.min_cluster_size == 0 {
            return Err(CascadeError::InvalidConfig("min_cluster_size must be > 0".into()));
        }
        if self.rules.max_cascades == 0 {
            return Err(CascadeError::InvalidConfig("max_cascades must be > 0".into()));
        }

        let forced = catalog
            .get(&self.forced_win.symbol_id)
            .ok_or_else(|| CascadeError::UnknownSymbol(self.forced_win.symbol_id.clone()))?;
        if forced.is_special() {
            return Err(CascadeError::InvalidConfig(format!(
                "forced-win symbol {} must be a regular symbol",
                forced.id
            )));
        }
        if let Some(pos) = self
            .forced_win
            .positions
            .iter()
            .find(|p| p.row() >= ROWS || p.col() >= COLS)
        {
            return Err(CascadeError::InvalidConfig(format!(
                "forced-win position {pos} is outside the {ROWS}x{COLS} grid"
            )));
        }

        Ok(())
    }
}
