//! Contract errors raised by the execution simulator.

use thiserror::Error;

/// Errors from the simulation core. Plumbing (store, import, batch) wraps
/// these in `anyhow` with context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid side: {0} (expected buy/sell or 1/-1)")]
    InvalidSide(String),

    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("tick series out of order at index {index}")]
    Unordered { index: usize },
}

pub type Result<T> = std::result::Result<T, SimError>;
