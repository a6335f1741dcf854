//! Error types for spin resolution and configuration

use thiserror::Error;

/// Errors raised by the cascade engine.
///
/// Spin resolution itself never fails for a well-formed request; these cover
/// malformed requests, invalid configuration and grid construction.
#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("Invalid bet amount: {0}")]
    InvalidBet(f64),

    #[error("Invalid carried multiplier: {0} (must be finite and >= 1)")]
    InvalidMultiplier(f64),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown symbol id: {0}")]
    UnknownSymbol(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

pub type Result<T> = std::result::Result<T, CascadeError>;
