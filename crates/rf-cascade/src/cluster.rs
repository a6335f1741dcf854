//! Cluster detection: 8-way flood fill with wild extension

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::grid::{COLS, Grid, Position, ROWS};
use crate::symbols::{Cell, SymbolKind};

/// A connected same-symbol group (wilds included) that met the size floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Anchor symbol id
    pub symbol_id: String,
    /// Highest tier among members
    pub tier: u8,
    /// Member positions in fill order, anchor first
    pub positions: Vec<Position>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.positions.len()
    }
}

/// Multipliers, scatters, wilds and chests never anchor a cluster
fn can_anchor(cell: &Cell) -> bool {
    cell.kind() == SymbolKind::Regular
}

/// Find every cluster of at least `min_size` cells.
///
/// Cells are scanned row-major and each is visited once per call. A wild is
/// consumed by the first fill that reaches it, even when that fill is later
/// discarded for being too small.
pub fn find_clusters(grid: &Grid, min_size: usize) -> Vec<Cluster> {
    let mut visited = [[false; COLS]; ROWS];
    let mut clusters = Vec::new();

    for anchor in Grid::positions() {
        if visited[anchor.row()][anchor.col()] || !can_anchor(grid.get(anchor)) {
            continue;
        }

        let anchor_cell = grid.get(anchor);
        let symbol_id = anchor_cell.id();
        let mut tier = anchor_cell.symbol.tier.unwrap_or(1);
        let mut members = Vec::new();
        let mut stack = vec![anchor];
        visited[anchor.row()][anchor.col()] = true;

        while let Some(pos) = stack.pop() {
            let cell = grid.get(pos);
            tier = tier.max(cell.symbol.tier.unwrap_or(1));
            members.push(pos);

            for next in pos.neighbors() {
                if visited[next.row()][next.col()] {
                    continue;
                }
                let neighbor = grid.get(next);
                if neighbor.id() == symbol_id || neighbor.symbol.is_wild() {
                    visited[next.row()][next.col()] = true;
                    stack.push(next);
                }
            }
        }

        if members.len() >= min_size {
            log::trace!("cluster {symbol_id} tier {tier} size {}", members.len());
            clusters.push(Cluster {
                symbol_id: symbol_id.to_string(),
                tier,
                positions: members,
            });
        }
    }

    clusters
}

/// Union of all cluster positions
pub fn cluster_positions(clusters: &[Cluster]) -> HashSet<Position> {
    clusters
        .iter()
        .flat_map(|c| c.positions.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{CellIds, SymbolCatalog};

    fn grid(rows: [[&str; COLS]; ROWS]) -> Grid {
        let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_symbol_ids(&SymbolCatalog::standard(), &rows, &mut CellIds::new()).unwrap()
    }

    // Column stripes that never reach six on their own
    const STRIPES: [[&str; COLS]; ROWS] = [
        ["LEMON", "GRAPE", "BELL", "LEMON", "GRAPE", "BELL"],
        ["LEMON", "GRAPE", "BELL", "LEMON", "GRAPE", "BELL"],
        ["LEMON", "GRAPE", "BELL", "LEMON", "GRAPE", "BELL"],
        ["LEMON", "GRAPE", "BELL", "LEMON", "GRAPE", "BELL"],
        ["LEMON", "GRAPE", "BELL", "LEMON", "GRAPE", "BELL"],
    ];

    #[test]
    fn test_stripes_have_no_clusters() {
        assert!(find_clusters(&grid(STRIPES), 6).is_empty());
    }

    #[test]
    fn test_block_of_six() {
        let mut rows = STRIPES;
        for r in 0..2 {
            for c in 0..3 {
                rows[r][c] = "CHERRY";
            }
        }
        let clusters = find_clusters(&grid(rows), 6);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].symbol_id, "CHERRY");
        assert_eq!(clusters[0].size(), 6);
        assert_eq!(clusters[0].tier, 1);
        assert_eq!(clusters[0].positions[0], Position::new(0, 0));
    }

    #[test]
    fn test_diagonal_connectivity() {
        let mut rows = STRIPES;
        // Staircase only connected through corners
        for (r, c) in [(0, 0), (1, 1), (2, 2), (3, 3), (4, 4), (3, 5)] {
            rows[r][c] = "ORANGE";
        }
        let clusters = find_clusters(&grid(rows), 6);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].symbol_id, "ORANGE");
        assert_eq!(clusters[0].size(), 6);
    }

    #[test]
    fn test_wild_extends_and_raises_tier() {
        let mut rows = STRIPES;
        for r in 0..2 {
            for c in 0..3 {
                rows[r][c] = "CHERRY";
            }
        }
        rows[1][1] = "WILD";
        let clusters = find_clusters(&grid(rows), 6);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].size(), 6);
        assert_eq!(clusters[0].tier, 2);

        let g = grid(rows);
        for &pos in &clusters[0].positions {
            let id = g.get(pos).id();
            assert!(id == "CHERRY" || id == "WILD");
        }
    }

    #[test]
    fn test_specials_never_anchor() {
        let mut rows = STRIPES;
        for r in 0..2 {
            for c in 0..4 {
                rows[r][c] = if (r + c) % 2 == 0 { "SCATTER" } else { "MULT_2" };
            }
        }
        rows[4] = ["WILD"; COLS];
        rows[3] = ["CHEST"; COLS];
        assert!(find_clusters(&grid(rows), 6).is_empty());
    }

    #[test]
    fn test_sub_threshold_fill_consumes_wild() {
        let mut rows = STRIPES;
        // Four cherries and a wild, five oranges touching the same wild
        rows[0][0] = "CHERRY";
        rows[0][1] = "CHERRY";
        rows[1][0] = "CHERRY";
        rows[2][0] = "CHERRY";
        rows[2][1] = "WILD";
        rows[1][2] = "ORANGE";
        rows[2][2] = "ORANGE";
        rows[3][2] = "ORANGE";
        rows[3][1] = "ORANGE";
        rows[4][2] = "ORANGE";
        // The cherry fill (4 + wild) is discarded and keeps the wild;
        // the orange fill stays at five
        assert!(find_clusters(&grid(rows), 6).is_empty());
        // With a lower floor both fills are kept and the wild belongs to cherry
        let clusters = find_clusters(&grid(rows), 5);
        let wild = Position::new(2, 1);
        let cherry = clusters.iter().find(|c| c.symbol_id == "CHERRY").unwrap();
        assert_eq!(cherry.size(), 5);
        assert!(cherry.positions.contains(&wild));
        let orange = clusters.iter().find(|c| c.symbol_id == "ORANGE").unwrap();
        assert_eq!(orange.size(), 5);
        assert!(!orange.positions.contains(&wild));
    }

    #[test]
    fn test_full_board_single_cluster() {
        let clusters = find_clusters(&grid([["DIAMOND"; COLS]; ROWS]), 6);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].size(), 30);
        assert_eq!(clusters[0].tier, 2);
        assert_eq!(cluster_positions(&clusters).len(), 30);
    }
}
