//! Chest resolution: chests burst into wilds and scatters

use std::sync::Arc;

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};
use crate::grid::{Grid, Position};
use crate::symbols::{Cell, SCATTER_ID, Symbol, SymbolDraw, SymbolKind, WILD_ID};

/// Cells a single chest tries to transform
pub const CHEST_TARGETS: usize = 3;

/// What a chest bursts into, drawn uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChestCase {
    ThreeScatters,
    OneScatterTwoWilds,
    TwoScattersOneWild,
    ThreeWilds,
}

impl ChestCase {
    pub const ALL: [ChestCase; 4] = [
        Self::ThreeScatters,
        Self::OneScatterTwoWilds,
        Self::TwoScattersOneWild,
        Self::ThreeWilds,
    ];

    /// Symbol ids in assignment order
    pub fn symbol_ids(&self) -> [&'static str; CHEST_TARGETS] {
        match self {
            Self::ThreeScatters => [SCATTER_ID, SCATTER_ID, SCATTER_ID],
            Self::OneScatterTwoWilds => [SCATTER_ID, WILD_ID, WILD_ID],
            Self::TwoScattersOneWild => [SCATTER_ID, SCATTER_ID, WILD_ID],
            Self::ThreeWilds => [WILD_ID, WILD_ID, WILD_ID],
        }
    }
}

/// One overwritten cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChestTarget {
    pub position: Position,
    /// Symbol id before the burst
    pub original_id: String,
    /// Cell placed by the burst
    pub placed: Cell,
}

/// Record of one chest resolution, consumed by the reveal animation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChestTransform {
    /// Where the chest sat
    pub position: Position,
    pub case: ChestCase,
    /// Transformed cells, in selection order
    pub targets: Vec<ChestTarget>,
    /// Ordinary symbol that took the chest's place
    pub replacement: Cell,
}

fn is_tier(cell: &Cell, tier: u8) -> bool {
    cell.kind() == SymbolKind::Regular && cell.symbol.tier == Some(tier)
}

/// Pick up to `CHEST_TARGETS` regular cells: tier 1 first, tier 2 to top up.
fn choose_targets<R: Rng>(grid: &Grid, rng: &mut R) -> Vec<Position> {
    let tier1 = grid.positions_where(|c| is_tier(c, 1));
    let mut targets: Vec<Position> = index::sample(rng, tier1.len(), tier1.len().min(CHEST_TARGETS))
        .iter()
        .map(|i| tier1[i])
        .collect();

    let missing = CHEST_TARGETS - targets.len();
    if missing > 0 {
        let tier2 = grid.positions_where(|c| is_tier(c, 2));
        targets.extend(
            index::sample(rng, tier2.len(), tier2.len().min(missing))
                .iter()
                .map(|i| tier2[i]),
        );
    }

    targets
}

fn lookup<'a>(draw: &SymbolDraw<'a, impl Rng>, id: &str) -> Result<&'a Arc<Symbol>> {
    draw.catalog()
        .get(id)
        .ok_or_else(|| CascadeError::UnknownSymbol(id.to_string()))
}

/// Resolve every chest on the grid, in row-major order.
///
/// Each chest sees the grid as left by the chests before it.
pub fn resolve_chests<R: Rng>(
    grid: &mut Grid,
    draw: &mut SymbolDraw<'_, R>,
) -> Result<Vec<ChestTransform>> {
    let mut transforms = Vec::new();

    while let Some(&position) = grid.positions_where(|c| c.symbol.is_chest()).first() {
        let targets = choose_targets(grid, draw.rng());
        let case = ChestCase::ALL[draw.rng().random_range(0..ChestCase::ALL.len())];

        let mut records = Vec::with_capacity(targets.len());
        for (&target, id) in targets.iter().zip(case.symbol_ids()) {
            let symbol = Arc::clone(lookup(draw, id)?);
            let placed = draw.spawn(symbol);
            records.push(ChestTarget {
                position: target,
                original_id: grid.get(target).id().to_string(),
                placed: placed.clone(),
            });
            grid.set(target, placed);
        }

        let replacement = draw.draw_ordinary();
        grid.set(position, replacement.clone());

        log::trace!(
            "chest at {position}: {case:?} on {} cells, replaced by {}",
            records.len(),
            replacement.id()
        );

        transforms.push(ChestTransform {
            position,
            case,
            targets: records,
            replacement,
        });
    }

    Ok(transforms)
}
