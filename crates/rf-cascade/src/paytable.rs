//! Paytable and cluster win calculation

use serde::{Deserialize, Serialize};

use crate::cluster::Cluster;

/// Bet multiples for one cluster size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayRow {
    /// Cluster size this row pays
    pub size: usize,
    /// Multiple of the bet for tier-1 clusters
    pub tier1: f64,
    /// Multiple of the bet for tier-2 clusters
    pub tier2: f64,
}

impl PayRow {
    const fn new(size: usize, tier1: f64, tier2: f64) -> Self {
        Self { size, tier1, tier2 }
    }

    /// Multiple for a cluster tier; anything but 2 pays as tier 1
    pub fn multiple(&self, tier: u8) -> f64 {
        if tier == 2 { self.tier2 } else { self.tier1 }
    }
}

/// Standard cluster pays, sizes 6 through 30
pub const STANDARD_PAYS: [PayRow; 25] = [
    PayRow::new(6, 0.5, 1.0),
    PayRow::new(7, 0.6, 1.2),
    PayRow::new(8, 0.75, 1.5),
    PayRow::new(9, 1.0, 2.0),
    PayRow::new(10, 1.25, 2.5),
    PayRow::new(11, 1.5, 3.0),
    PayRow::new(12, 2.0, 4.0),
    PayRow::new(13, 2.5, 5.0),
    PayRow::new(14, 3.0, 6.0),
    PayRow::new(15, 4.0, 8.0),
    PayRow::new(16, 5.0, 10.0),
    PayRow::new(17, 6.0, 12.0),
    PayRow::new(18, 7.5, 15.0),
    PayRow::new(19, 9.0, 18.0),
    PayRow::new(20, 10.0, 20.0),
    PayRow::new(21, 12.5, 25.0),
    PayRow::new(22, 15.0, 30.0),
    PayRow::new(23, 17.5, 35.0),
    PayRow::new(24, 20.0, 40.0),
    PayRow::new(25, 25.0, 50.0),
    PayRow::new(26, 30.0, 60.0),
    PayRow::new(27, 40.0, 100.0),
    PayRow::new(28, 50.0, 125.0),
    PayRow::new(29, 75.0, 200.0),
    PayRow::new(30, 100.0, 300.0),
];

/// Complete paytable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayTable {
    rows: Vec<PayRow>,
}

impl PayTable {
    /// Create the standard paytable
    pub fn standard() -> Self {
        Self {
            rows: STANDARD_PAYS.to_vec(),
        }
    }

    /// Row for an exact cluster size. Sizes without a row pay nothing;
    /// that includes everything above 30.
    pub fn row(&self, size: usize) -> Option<&PayRow> {
        self.rows.iter().find(|r| r.size == size)
    }

    /// Bet multiple for a size and tier
    pub fn multiple(&self, size: usize, tier: u8) -> f64 {
        self.row(size).map(|r| r.multiple(tier)).unwrap_or(0.0)
    }

    /// Win for one cluster at `bet`
    pub fn payout(&self, cluster: &Cluster, bet: f64) -> f64 {
        bet * self.multiple(cluster.size(), cluster.tier)
    }

    /// Summed win for a set of clusters
    pub fn total_payout(&self, clusters: &[Cluster], bet: f64) -> f64 {
        clusters.iter().map(|c| self.payout(c, bet)).sum()
    }

    pub fn rows(&self) -> &[PayRow] {
        &self.rows
    }
}

impl Default for PayTable {
    fn default() -> Self {
        Self::standard()
    }
}
