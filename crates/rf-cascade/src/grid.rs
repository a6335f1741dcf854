//! Fixed 5×6 grid and grid generation

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ForcedWinConfig;
use crate::error::{CascadeError, Result};
use crate::symbols::{Cell, CellIds, PlayMode, SymbolCatalog, SymbolDraw};

/// Grid rows
pub const ROWS: usize = 5;
/// Grid columns
pub const COLS: usize = 6;

/// Grid coordinate, serialized as `[row, col]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position(pub usize, pub usize);

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self(row, col)
    }

    pub const fn row(&self) -> usize {
        self.0
    }

    pub const fn col(&self) -> usize {
        self.1
    }

    /// King-move neighbours that lie on the grid
    pub fn neighbors(&self) -> impl Iterator<Item = Position> {
        let (row, col) = (self.0 as isize, self.1 as isize);
        (-1isize..=1)
            .flat_map(move |dr| (-1isize..=1).map(move |dc| (dr, dc)))
            .filter(|&(dr, dc)| dr != 0 || dc != 0)
            .filter_map(move |(dr, dc)| {
                let (r, c) = (row + dr, col + dc);
                (r >= 0 && c >= 0 && (r as usize) < ROWS && (c as usize) < COLS)
                    .then(|| Position::new(r as usize, c as usize))
            })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.0, self.1)
    }
}

/// Row-major grid of cells; every position always holds a cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Build from fully populated rows, checking dimensions
    pub fn from_cells(rows: Vec<Vec<Cell>>) -> Result<Self> {
        if rows.len() != ROWS || rows.iter().any(|r| r.len() != COLS) {
            return Err(CascadeError::InvalidGrid(format!(
                "expected {ROWS} rows of {COLS} cells"
            )));
        }
        Ok(Self { rows })
    }

    /// Build from symbol ids, assigning identities from `ids`
    pub fn from_symbol_ids<S: AsRef<str>>(
        catalog: &SymbolCatalog,
        rows: &[Vec<S>],
        ids: &mut CellIds,
    ) -> Result<Self> {
        let cells = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|id| {
                        let id = id.as_ref();
                        catalog
                            .get(id)
                            .map(|symbol| Cell::new(Arc::clone(symbol), ids.next_id()))
                            .ok_or_else(|| CascadeError::UnknownSymbol(id.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_cells(cells)
    }

    pub fn get(&self, pos: Position) -> &Cell {
        &self.rows[pos.row()][pos.col()]
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.rows[pos.row()][pos.col()] = cell;
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// All positions in row-major order
    pub fn positions() -> impl Iterator<Item = Position> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Position::new(row, col)))
    }

    /// Positions whose cell satisfies `pred`, row-major
    pub fn positions_where(&self, pred: impl Fn(&Cell) -> bool) -> Vec<Position> {
        Self::positions().filter(|&p| pred(self.get(p))).collect()
    }

    pub fn count_where(&self, pred: impl Fn(&Cell) -> bool) -> usize {
        self.rows.iter().flatten().filter(|c| pred(*c)).count()
    }

    /// Highest identity token on the grid
    pub fn max_unique_id(&self) -> u64 {
        self.rows
            .iter()
            .flatten()
            .map(|c| c.unique_id)
            .max()
            .unwrap_or(0)
    }

    /// Symbol ids, row-major
    pub fn symbol_ids(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.id().to_string()).collect())
            .collect()
    }

    pub(crate) fn column(&self, col: usize) -> Vec<Cell> {
        self.rows.iter().map(|row| row[col].clone()).collect()
    }
}

/// Fill all 30 cells with independent weighted draws, then stamp the forced
/// win layout if requested.
pub fn generate_grid<R: Rng>(
    draw: &mut SymbolDraw<'_, R>,
    mode: PlayMode,
    force_guaranteed_win: bool,
    forced: &ForcedWinConfig,
) -> Result<Grid> {
    let rows: Vec<Vec<Cell>> = (0..ROWS)
        .map(|_| (0..COLS).map(|_| draw.draw(mode)).collect())
        .collect();
    let mut grid = Grid { rows };

    if force_guaranteed_win {
        let symbol = draw
            .catalog()
            .get(&forced.symbol_id)
            .ok_or_else(|| CascadeError::UnknownSymbol(forced.symbol_id.clone()))?;
        for &pos in &forced.positions {
            let cell = draw.spawn(Arc::clone(symbol));
            grid.set(pos, cell);
        }
        log::trace!(
            "forced win: stamped {} x {}",
            forced.positions.len(),
            forced.symbol_id
        );
    }

    Ok(grid)
}
