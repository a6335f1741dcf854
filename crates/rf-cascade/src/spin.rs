//! Spin request and result records

use serde::{Deserialize, Serialize};

use crate::chest::ChestTransform;
use crate::cluster::Cluster;
use crate::error::{CascadeError, Result};
use crate::grid::{Grid, Position};

/// Input for one spin resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinRequest {
    /// Stake; range and balance checks belong to the caller
    pub bet: f64,
    /// Free spins / bought bonus in progress
    #[serde(default)]
    pub bonus_mode: bool,
    /// First spin of a purchased bonus, stamps the forced-win layout
    #[serde(default)]
    pub guarantee_first_win: bool,
    /// Accumulated multiplier from the previous bonus spin; ignored in base game
    #[serde(default = "default_multiplier")]
    pub carried_multiplier: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl SpinRequest {
    /// Base-game spin
    pub fn base(bet: f64) -> Self {
        Self {
            bet,
            bonus_mode: false,
            guarantee_first_win: false,
            carried_multiplier: 1.0,
        }
    }

    /// Bonus spin carrying `multiplier` from the previous one
    pub fn bonus(bet: f64, multiplier: f64) -> Self {
        Self {
            bet,
            bonus_mode: true,
            guarantee_first_win: false,
            carried_multiplier: multiplier,
        }
    }

    /// Builder: first purchased-bonus spin
    pub fn with_guaranteed_win(mut self) -> Self {
        self.guarantee_first_win = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.bet.is_finite() || self.bet <= 0.0 {
            return Err(CascadeError::InvalidBet(self.bet));
        }
        if self.bonus_mode && !(self.carried_multiplier.is_finite() && self.carried_multiplier >= 1.0) {
            return Err(CascadeError::InvalidMultiplier(self.carried_multiplier));
        }
        Ok(())
    }

    /// Multiplier the spin starts from
    pub fn starting_multiplier(&self) -> f64 {
        if self.bonus_mode { self.carried_multiplier } else { 1.0 }
    }
}

/// Cluster as reported to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub symbol_id: String,
    pub tier: u8,
    pub size: usize,
    pub positions: Vec<Position>,
    /// Unmultiplied payout
    pub payout: f64,
}

impl ClusterSummary {
    pub fn new(cluster: &Cluster, payout: f64) -> Self {
        Self {
            symbol_id: cluster.symbol_id.clone(),
            tier: cluster.tier,
            size: cluster.size(),
            positions: cluster.positions.clone(),
            payout,
        }
    }
}

/// One multiplier symbol counted in a cascade
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MultiplierHit {
    pub position: Position,
    pub value: f64,
}

/// Multiplier symbols on the grid at detection time and their product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplierTrace {
    pub hits: Vec<MultiplierHit>,
    pub factor: f64,
}

impl MultiplierTrace {
    pub fn collect(grid: &Grid) -> Self {
        let hits: Vec<MultiplierHit> = Grid::positions()
            .filter_map(|position| {
                grid.get(position)
                    .symbol
                    .multiplier
                    .map(|value| MultiplierHit { position, value })
            })
            .collect();
        let factor = hits.iter().map(|h| h.value).product();
        Self { hits, factor }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// One detect → pay → remove → refill iteration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeStep {
    /// Zero-based cascade index
    pub index: u32,
    /// Grid at detection time, before removal
    pub grid: Grid,
    pub clusters: Vec<ClusterSummary>,
    /// Summed cluster payouts before any multiplier
    pub base_win: f64,
    /// index + 1
    pub progressive_multiplier: u32,
    pub multipliers: MultiplierTrace,
    /// Win credited for this cascade
    pub win: f64,
    /// Running bonus multiplier after this cascade; bonus mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accumulated_multiplier: Option<f64>,
}

/// Complete spin result with all outcomes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinResult {
    /// Final grid after the last refill
    pub grid: Grid,
    pub bet: f64,
    pub bonus_mode: bool,
    /// Total win
    pub total_win: f64,
    /// Win-to-bet ratio
    pub win_ratio: f64,
    pub cascades: Vec<CascadeStep>,
    /// Scatters on the post-chest grid
    pub scatter_count: usize,
    pub triggered_free_spins: u32,
    pub retriggered_free_spins: u32,
    pub chest_transforms: Vec<ChestTransform>,
    /// Wild positions pinned for the spin (bonus mode)
    pub sticky_wilds: Vec<Position>,
    /// Multiplier to carry into the next bonus spin; 1 in base game
    pub accumulated_multiplier: f64,
    /// Resolution stopped at the cascade cap with clusters still on the grid
    pub cascade_cap_reached: bool,
}

impl SpinResult {
    /// Check if this is a win
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }

    pub fn cascade_count(&self) -> usize {
        self.cascades.len()
    }

    /// Any free spins awarded, first trigger or retrigger
    pub fn free_spins_awarded(&self) -> u32 {
        self.triggered_free_spins + self.retriggered_free_spins
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
