//! # rf-cascade: Cascading Cluster Spin Resolver
//!
//! Resolves one spin of a 5×6 cluster-pays reel game: draws the grid, bursts
//! chests into wilds and scatters, then pays and refills clusters until the
//! grid settles.
//!
//! ## Features
//!
//! - **Weighted Draws**: Static catalog weights with a bonus-mode transform
//! - **Chests**: Tier-1-first bursts into wild/scatter combinations
//! - **Clusters**: 8-way flood fill, wilds extend and raise tier
//! - **Cascades**: Progressive multiplier, multiplier symbols, sticky wilds
//! - **Bonus State**: Accumulated multiplier carried between bonus spins
//!
//! ## Architecture
//!
//! ```text
//! CascadeEngine
//!     │
//!     ├── SymbolCatalog + BonusWeighting (weighted draws)
//!     ├── RuleConfig (cluster floor, cascade cap, free spins)
//!     └── PayTable (size × tier)
//!           │
//!           v
//!     generate_grid → resolve_chests → {find_clusters → pay → refill}*
//!           │
//!           v
//!     SpinResult (cascades, chest transforms, multiplier)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rf_cascade::{CascadeEngine, SpinRequest};
//!
//! let engine = CascadeEngine::standard();
//! let result = engine.resolve_seeded(&SpinRequest::base(1.0), 42)?;
//! println!("won {} over {} cascades", result.total_win, result.cascade_count());
//! # Ok::<(), rf_cascade::CascadeError>(())
//! ```

pub mod chest;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod paytable;
pub mod spin;
pub mod symbols;

pub use chest::*;
pub use cluster::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use paytable::*;
pub use spin::*;
pub use symbols::*;
