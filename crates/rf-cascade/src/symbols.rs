//! Symbol catalog, bonus weighting and weighted draws

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CascadeError, Result};

/// Catalog id of the wild symbol
pub const WILD_ID: &str = "WILD";
/// Catalog id of the scatter symbol
pub const SCATTER_ID: &str = "SCATTER";
/// Catalog id of the chest symbol
pub const CHEST_ID: &str = "CHEST";

/// Symbol role classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Ordinary paying symbol (tier 1 or tier 2)
    Regular,
    /// Carries a multiplier value, never pays on its own
    Multiplier,
    /// Extends any cluster it touches
    Wild,
    /// Counts toward free-spin triggers
    Scatter,
    /// Bursts into wilds/scatters after generation
    Chest,
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Catalog key (e.g. "CHERRY", "WILD", "MULT_5")
    pub id: String,
    /// Display glyph
    pub name: String,
    /// Relative draw weight
    pub weight: f64,
    /// Paying tier (1 = common, 2 = common-rare)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u8>,
    /// Multiplier value, only on multiplier symbols
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

impl Symbol {
    /// Create a regular paying symbol
    pub fn regular(id: impl Into<String>, name: impl Into<String>, weight: f64, tier: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
            tier: Some(tier),
            multiplier: None,
        }
    }

    /// Create a multiplier symbol
    pub fn multiplier(id: impl Into<String>, name: impl Into<String>, weight: f64, value: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
            tier: None,
            multiplier: Some(value),
        }
    }

    /// Create the wild symbol. Wilds carry tier 2 so they lift cluster tier.
    pub fn wild(name: impl Into<String>, weight: f64) -> Self {
        Self {
            id: WILD_ID.into(),
            name: name.into(),
            weight,
            tier: Some(2),
            multiplier: None,
        }
    }

    /// Create the scatter symbol
    pub fn scatter(name: impl Into<String>, weight: f64) -> Self {
        Self::special(SCATTER_ID, name, weight)
    }

    /// Create the chest symbol
    pub fn chest(name: impl Into<String>, weight: f64) -> Self {
        Self::special(CHEST_ID, name, weight)
    }

    fn special(id: &str, name: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
            tier: None,
            multiplier: None,
        }
    }

    /// Role implied by id and fields
    pub fn kind(&self) -> SymbolKind {
        if self.multiplier.is_some() {
            return SymbolKind::Multiplier;
        }
        match self.id.as_str() {
            WILD_ID => SymbolKind::Wild,
            SCATTER_ID => SymbolKind::Scatter,
            CHEST_ID => SymbolKind::Chest,
            _ => SymbolKind::Regular,
        }
    }

    /// Check if this is a special symbol (anything but a regular payer)
    pub fn is_special(&self) -> bool {
        self.kind() != SymbolKind::Regular
    }

    pub fn is_wild(&self) -> bool {
        self.kind() == SymbolKind::Wild
    }

    pub fn is_scatter(&self) -> bool {
        self.kind() == SymbolKind::Scatter
    }

    pub fn is_chest(&self) -> bool {
        self.kind() == SymbolKind::Chest
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CATALOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Validated, immutable symbol catalog. Order matters for weighted draws.
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    symbols: Vec<Arc<Symbol>>,
}

impl SymbolCatalog {
    /// Build a catalog, rejecting duplicate ids and malformed entries
    pub fn new(symbols: Vec<Symbol>) -> Result<Self> {
        if symbols.is_empty() {
            return Err(CascadeError::InvalidConfig("symbol catalog is empty".into()));
        }

        let mut seen = HashSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol.id.as_str()) {
                return Err(CascadeError::InvalidConfig(format!(
                    "duplicate symbol id {}",
                    symbol.id
                )));
            }
            if !symbol.weight.is_finite() || symbol.weight < 0.0 {
                return Err(CascadeError::InvalidConfig(format!(
                    "symbol {} has invalid weight {}",
                    symbol.id, symbol.weight
                )));
            }
            if let Some(tier) = symbol.tier {
                if !(1..=2).contains(&tier) {
                    return Err(CascadeError::InvalidConfig(format!(
                        "symbol {} has tier {tier}, expected 1 or 2",
                        symbol.id
                    )));
                }
            }
            if let Some(value) = symbol.multiplier {
                if !value.is_finite() || value <= 0.0 {
                    return Err(CascadeError::InvalidConfig(format!(
                        "symbol {} has invalid multiplier {value}",
                        symbol.id
                    )));
                }
            }
        }

        let total: f64 = symbols.iter().map(|s| s.weight).sum();
        if total <= 0.0 {
            return Err(CascadeError::InvalidConfig("total symbol weight is zero".into()));
        }

        let catalog = Self {
            symbols: symbols.into_iter().map(Arc::new).collect(),
        };

        // A chest can only burst if it has something to burst into
        if catalog.iter().any(|s| s.is_chest()) {
            if catalog.wild().is_none() || catalog.scatter().is_none() {
                return Err(CascadeError::InvalidConfig(
                    "catalog contains CHEST but lacks WILD or SCATTER".into(),
                ));
            }
            // and something ordinary to leave behind
            if !catalog.iter().any(|s| s.kind() == SymbolKind::Regular && s.weight > 0.0) {
                return Err(CascadeError::InvalidConfig(
                    "catalog contains CHEST but no regular symbol with positive weight".into(),
                ));
            }
        }

        Ok(catalog)
    }

    /// The standard 13-symbol catalog
    pub fn standard() -> Self {
        Self {
            symbols: standard_symbols().into_iter().map(Arc::new).collect(),
        }
    }

    /// Look up a symbol by id
    pub fn get(&self, id: &str) -> Option<&Arc<Symbol>> {
        self.symbols.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn wild(&self) -> Option<&Arc<Symbol>> {
        self.get(WILD_ID)
    }

    pub fn scatter(&self) -> Option<&Arc<Symbol>> {
        self.get(SCATTER_ID)
    }

    /// First catalog entry, the fallback for failed selections
    pub fn first(&self) -> &Arc<Symbol> {
        &self.symbols[0]
    }

    /// First regular entry, the fallback for failed ordinary draws
    pub fn first_regular(&self) -> Option<&Arc<Symbol>> {
        self.symbols.iter().find(|s| s.kind() == SymbolKind::Regular)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Symbol>> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a catalog built through `new`; kept next to `len`
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Standard symbol definitions, in draw order
pub fn standard_symbols() -> Vec<Symbol> {
    vec![
        // Tier 1 commons
        Symbol::regular("CHERRY", "🍒", 20.0, 1),
        Symbol::regular("LEMON", "🍋", 20.0, 1),
        Symbol::regular("ORANGE", "🍊", 18.0, 1),
        Symbol::regular("GRAPE", "🍇", 16.0, 1),
        // Tier 2 common-rares
        Symbol::regular("BELL", "🔔", 8.0, 2),
        Symbol::regular("DIAMOND", "💎", 6.0, 2),
        // Multipliers
        Symbol::multiplier("MULT_2", "✖2", 2.0, 2.0),
        Symbol::multiplier("MULT_3", "✖3", 1.2, 3.0),
        Symbol::multiplier("MULT_5", "✖5", 0.6, 5.0),
        Symbol::multiplier("MULT_10", "✖10", 0.2, 10.0),
        // Specials
        Symbol::wild("🃏", 1.5),
        Symbol::scatter("⭐", 1.2),
        Symbol::chest("🎁", 0.8),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// MODE & WEIGHTING
// ═══════════════════════════════════════════════════════════════════════════════

/// Which weight table a draw uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    Base,
    /// Free spins / bought bonus
    Bonus,
}

impl PlayMode {
    pub fn from_bonus_flag(bonus: bool) -> Self {
        if bonus { Self::Bonus } else { Self::Base }
    }

    pub fn is_bonus(&self) -> bool {
        matches!(self, Self::Bonus)
    }
}

/// Per-role weight factors applied to every draw in bonus mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusWeighting {
    pub scatter: f64,
    pub multiplier: f64,
    pub wild: f64,
    pub chest: f64,
    /// Regular tier-2 symbols
    pub tier2: f64,
    /// Every other regular symbol
    pub common: f64,
}

impl Default for BonusWeighting {
    fn default() -> Self {
        Self {
            scatter: 3.5,
            multiplier: 5.0,
            wild: 1.5,
            chest: 2.0,
            tier2: 1.75,
            common: 0.5,
        }
    }
}

impl BonusWeighting {
    /// Effective draw weight of `symbol` in `mode`. Role wins over tier.
    pub fn weight_for(&self, symbol: &Symbol, mode: PlayMode) -> f64 {
        if !mode.is_bonus() {
            return symbol.weight;
        }
        let factor = match symbol.kind() {
            SymbolKind::Scatter => self.scatter,
            SymbolKind::Multiplier => self.multiplier,
            SymbolKind::Wild => self.wild,
            SymbolKind::Chest => self.chest,
            SymbolKind::Regular if symbol.tier == Some(2) => self.tier2,
            SymbolKind::Regular => self.common,
        };
        symbol.weight * factor
    }

    pub fn validate(&self) -> Result<()> {
        let factors = [
            ("scatter", self.scatter),
            ("multiplier", self.multiplier),
            ("wild", self.wild),
            ("chest", self.chest),
            ("tier2", self.tier2),
            ("common", self.common),
        ];
        for (name, factor) in factors {
            if !factor.is_finite() || factor < 0.0 {
                return Err(CascadeError::InvalidConfig(format!(
                    "bonus weighting {name} must be finite and >= 0, got {factor}"
                )));
            }
        }
        Ok(())
    }
}

/// Walk `weights` in order, subtracting from `roll` until it drops to zero or
/// below. Returns `None` when floating-point drift leaves a remainder.
pub fn select_weighted(weights: impl IntoIterator<Item = f64>, roll: f64) -> Option<usize> {
    let mut remaining = roll;
    for (idx, weight) in weights.into_iter().enumerate() {
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(idx);
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════════
// CELLS
// ═══════════════════════════════════════════════════════════════════════════════

/// A placed symbol with its identity token
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub symbol: Arc<Symbol>,
    /// Unique within one spin request; continuity only, no gameplay effect
    pub unique_id: u64,
}

impl Cell {
    pub fn new(symbol: Arc<Symbol>, unique_id: u64) -> Self {
        Self { symbol, unique_id }
    }

    pub fn id(&self) -> &str {
        &self.symbol.id
    }

    pub fn kind(&self) -> SymbolKind {
        self.symbol.kind()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CellView<'a> {
    id: &'a str,
    unique_id: u64,
    name: &'a str,
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        CellView {
            id: &self.symbol.id,
            unique_id: self.unique_id,
            name: &self.symbol.name,
        }
        .serialize(serializer)
    }
}

/// Request-scoped monotonic identity counter
#[derive(Debug, Clone)]
pub struct CellIds {
    next: u64,
}

impl CellIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for CellIds {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DRAWS
// ═══════════════════════════════════════════════════════════════════════════════

/// Weighted symbol source for one spin: catalog, weighting, RNG and ids
pub struct SymbolDraw<'a, R: Rng> {
    catalog: &'a SymbolCatalog,
    weighting: &'a BonusWeighting,
    rng: &'a mut R,
    ids: CellIds,
}

impl<'a, R: Rng> SymbolDraw<'a, R> {
    pub fn new(catalog: &'a SymbolCatalog, weighting: &'a BonusWeighting, rng: &'a mut R) -> Self {
        Self::with_ids(catalog, weighting, rng, CellIds::new())
    }

    pub fn with_ids(
        catalog: &'a SymbolCatalog,
        weighting: &'a BonusWeighting,
        rng: &'a mut R,
        ids: CellIds,
    ) -> Self {
        Self {
            catalog,
            weighting,
            rng,
            ids,
        }
    }

    pub fn catalog(&self) -> &'a SymbolCatalog {
        self.catalog
    }

    pub fn rng(&mut self) -> &mut R {
        &mut *self.rng
    }

    /// Weighted draw over the whole catalog
    pub fn draw(&mut self, mode: PlayMode) -> Cell {
        let weighting = self.weighting;
        let catalog = self.catalog;
        let fallback = catalog.first();
        let symbol = self.pick(|s| weighting.weight_for(s, mode), fallback);
        self.spawn(symbol)
    }

    /// Base-weighted draw over regular symbols only. The fallback is the first
    /// regular entry, so a chest can never be replaced by another chest.
    pub fn draw_ordinary(&mut self) -> Cell {
        let catalog = self.catalog;
        let fallback = catalog.first_regular().unwrap_or(catalog.first());
        let symbol = self.pick(|s| if s.is_special() { 0.0 } else { s.weight }, fallback);
        self.spawn(symbol)
    }

    /// Place `symbol` as a new cell with a fresh identity
    pub fn spawn(&mut self, symbol: Arc<Symbol>) -> Cell {
        Cell::new(symbol, self.ids.next_id())
    }

    fn pick(&mut self, weight: impl Fn(&Symbol) -> f64, fallback: &Arc<Symbol>) -> Arc<Symbol> {
        let total: f64 = self.catalog.iter().map(|s| weight(s.as_ref())).sum();
        let selected = if total > 0.0 {
            let roll = self.rng.random::<f64>() * total;
            select_weighted(self.catalog.iter().map(|s| weight(s.as_ref())), roll)
        } else {
            None
        };

        match selected {
            Some(idx) => Arc::clone(&self.catalog.symbols[idx]),
            None => {
                log::warn!("weighted selection failed (total {total}), falling back to {}", fallback.id);
                Arc::clone(fallback)
            }
        }
    }
}
