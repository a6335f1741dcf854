//! Cascade Engine: resolves one spin from grid generation to the last refill

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::chest::resolve_chests;
use crate::cluster::{Cluster, cluster_positions, find_clusters};
use crate::config::GameConfig;
use crate::error::{CascadeError, Result};
use crate::grid::{COLS, Grid, Position, ROWS, generate_grid};
use crate::paytable::PayTable;
use crate::spin::{CascadeStep, ClusterSummary, MultiplierTrace, SpinRequest, SpinResult};
use crate::symbols::{Cell, CellIds, PlayMode, SymbolCatalog, SymbolDraw};

/// Cascading cluster-pays engine
///
/// Immutable after construction; every call owns its grid, ids and RNG, so
/// one engine can serve concurrent spins as long as each has its own RNG.
///
/// Resolution runs GENERATE → RESOLVE_CHESTS → {DETECT → PAY → CASCADE}* → DONE.
#[derive(Debug, Clone)]
pub struct CascadeEngine {
    config: GameConfig,
    catalog: SymbolCatalog,
    paytable: PayTable,
}

impl CascadeEngine {
    /// Create an engine from a validated config
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        Ok(Self {
            config,
            catalog,
            paytable: PayTable::standard(),
        })
    }

    /// Engine with the standard catalog, weighting and rules
    pub fn standard() -> Self {
        Self {
            config: GameConfig::standard(),
            catalog: SymbolCatalog::standard(),
            paytable: PayTable::standard(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    pub fn paytable(&self) -> &PayTable {
        &self.paytable
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ENTRY POINTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Resolve a spin with a reproducible ChaCha8 stream
    pub fn resolve_seeded(&self, request: &SpinRequest, seed: u64) -> Result<SpinResult> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.resolve_spin(request, &mut rng)
    }

    /// Resolve a spin: generate a grid, then chests and cascades
    pub fn resolve_spin<R: Rng>(&self, request: &SpinRequest, rng: &mut R) -> Result<SpinResult> {
        request.validate()?;
        let mode = PlayMode::from_bonus_flag(request.bonus_mode);

        let mut draw = SymbolDraw::new(&self.catalog, &self.config.bonus_weighting, rng);
        let grid = generate_grid(
            &mut draw,
            mode,
            request.guarantee_first_win,
            &self.config.forced_win,
        )?;

        self.resolve(grid, request, &mut draw)
    }

    /// Resolve a spin from a given starting grid, skipping generation.
    ///
    /// Refill identities continue above the highest id already on the grid.
    pub fn resolve_grid<R: Rng>(
        &self,
        grid: Grid,
        request: &SpinRequest,
        rng: &mut R,
    ) -> Result<SpinResult> {
        request.validate()?;
        if let Some(cell) = grid
            .rows()
            .iter()
            .flatten()
            .find(|c| !self.catalog.contains(c.id()))
        {
            return Err(CascadeError::UnknownSymbol(cell.id().to_string()));
        }

        let ids = CellIds::starting_at(grid.max_unique_id() + 1);
        let mut draw = SymbolDraw::with_ids(&self.catalog, &self.config.bonus_weighting, rng, ids);
        self.resolve(grid, request, &mut draw)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RESOLUTION
    // ═══════════════════════════════════════════════════════════════════════════

    fn resolve<R: Rng>(
        &self,
        mut grid: Grid,
        request: &SpinRequest,
        draw: &mut SymbolDraw<'_, R>,
    ) -> Result<SpinResult> {
        let mode = PlayMode::from_bonus_flag(request.bonus_mode);
        let rules = &self.config.rules;

        let chest_transforms = resolve_chests(&mut grid, draw)?;

        let sticky_wilds = if mode.is_bonus() {
            grid.positions_where(|c| c.symbol.is_wild())
        } else {
            Vec::new()
        };

        let scatter_count = grid.count_where(|c| c.symbol.is_scatter());
        let (triggered_free_spins, retriggered_free_spins) = self.free_spin_awards(scatter_count, mode);

        let mut accumulated = request.starting_multiplier();
        let mut cascades = Vec::new();
        let mut total_win = 0.0;
        let mut cascade_cap_reached = false;
        let mut index = 0u32;

        loop {
            let clusters = find_clusters(&grid, rules.min_cluster_size);
            if clusters.is_empty() {
                break;
            }
            if index == rules.max_cascades {
                cascade_cap_reached = true;
                log::warn!(
                    "cascade cap of {} reached with {} clusters still on the grid",
                    rules.max_cascades,
                    clusters.len()
                );
                break;
            }

            let step = self.pay_cascade(index, &grid, &clusters, request.bet, mode, &mut accumulated);
            log::trace!(
                "cascade {index}: {} clusters, base {} x{} x{} = {}",
                step.clusters.len(),
                step.base_win,
                step.progressive_multiplier,
                step.multipliers.factor,
                step.win
            );
            total_win += step.win;
            cascades.push(step);

            refill(&mut grid, &clusters, &sticky_wilds, mode, draw);
            index += 1;
        }

        let accumulated_multiplier = if mode.is_bonus() { accumulated } else { 1.0 };

        log::debug!(
            "spin resolved: bet {} win {total_win} cascades {} scatters {scatter_count} chests {} multiplier {accumulated_multiplier}",
            request.bet,
            cascades.len(),
            chest_transforms.len()
        );

        Ok(SpinResult {
            grid,
            bet: request.bet,
            bonus_mode: request.bonus_mode,
            total_win,
            win_ratio: total_win / request.bet,
            cascades,
            scatter_count,
            triggered_free_spins,
            retriggered_free_spins,
            chest_transforms,
            sticky_wilds,
            accumulated_multiplier,
            cascade_cap_reached,
        })
    }

    /// Free spins for the post-chest scatter count: (triggered, retriggered)
    fn free_spin_awards(&self, scatter_count: usize, mode: PlayMode) -> (u32, u32) {
        let rules = &self.config.rules;
        if scatter_count < rules.scatter_trigger_count {
            return (0, 0);
        }
        match mode {
            PlayMode::Base => (rules.free_spins_award, 0),
            PlayMode::Bonus => (0, rules.retrigger_award),
        }
    }

    fn pay_cascade(
        &self,
        index: u32,
        grid: &Grid,
        clusters: &[Cluster],
        bet: f64,
        mode: PlayMode,
        accumulated: &mut f64,
    ) -> CascadeStep {
        let summaries: Vec<ClusterSummary> = clusters
            .iter()
            .map(|c| ClusterSummary::new(c, self.paytable.payout(c, bet)))
            .collect();
        let base_win = self.paytable.total_payout(clusters, bet);
        let progressive_multiplier = index + 1;
        let multipliers = MultiplierTrace::collect(grid);
        let progressive = f64::from(progressive_multiplier);

        let (win, accumulated_multiplier) = match mode {
            PlayMode::Bonus => {
                *accumulated *= multipliers.factor;
                (base_win * progressive * *accumulated, Some(*accumulated))
            }
            PlayMode::Base => (base_win * progressive * multipliers.factor, None),
        };

        CascadeStep {
            index,
            grid: grid.clone(),
            clusters: summaries,
            base_win,
            progressive_multiplier,
            multipliers,
            win,
            accumulated_multiplier,
        }
    }
}

impl Default for CascadeEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Remove clustered cells and refill column by column.
///
/// Fresh draws land on top, survivors keep their order below them, and
/// sticky wilds stay on their rows.
fn refill<R: Rng>(
    grid: &mut Grid,
    clusters: &[Cluster],
    sticky: &[Position],
    mode: PlayMode,
    draw: &mut SymbolDraw<'_, R>,
) {
    let removed = cluster_positions(clusters);

    for col in 0..COLS {
        let is_pinned = |row: usize| sticky.contains(&Position::new(row, col));
        let column = grid.column(col);

        let survivors: Vec<Cell> = column
            .iter()
            .enumerate()
            .filter(|&(row, _)| !is_pinned(row) && !removed.contains(&Position::new(row, col)))
            .map(|(_, cell)| cell.clone())
            .collect();
        let open = (0..ROWS).filter(|&row| !is_pinned(row)).count();
        let fresh: Vec<Cell> = (0..open - survivors.len()).map(|_| draw.draw(mode)).collect();

        let mut incoming = fresh.into_iter().chain(survivors);
        let slots: Vec<Option<Cell>> = column
            .into_iter()
            .enumerate()
            .map(|(row, cell)| if is_pinned(row) { Some(cell) } else { incoming.next() })
            .collect();

        for (row, slot) in slots.into_iter().enumerate() {
            let cell = match slot {
                Some(cell) => cell,
                None => {
                    log::error!("refill left [{row}, {col}] empty, drawing a replacement");
                    draw.draw(mode)
                }
            };
            grid.set(Position::new(row, col), cell);
        }
    }
}
