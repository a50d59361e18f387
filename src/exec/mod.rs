//! Participation-rate execution simulation.
//!
//! A run walks forward from a start key through the qualifying trade prints
//! of one series. Each qualification point closes a candidate window; the
//! side-directed price pick inside that window becomes a child fill sized at
//! `participation_rate` of the picked print. Fills accumulate until the
//! target is reached or the qualification points run out, then a single
//! pass attaches notional, trading cost and running VWAP.

pub mod costs;
pub mod participation;
pub mod window;

pub use costs::CostSchedule;
pub use participation::simulate;

use crate::error::{Result, SimError};
use crate::types::TargetQuantity;

/// Fixed-point base of prices.
pub const PRICE_SCALE: f64 = 1e6;
/// Fixed-point base of sizes.
pub const SIZE_SCALE: f64 = 1e9;

pub const DEFAULT_PARTICIPATION_RATE: f64 = 0.05;
pub const DEFAULT_CRYPTO_CRYPTO_COST: f64 = 0.0010;
pub const DEFAULT_OTHER_COST: f64 = 0.0050;

/// Participation rate must lie in (0, 1].
pub fn check_participation_rate(p: f64) -> Result<f64> {
    if !p.is_finite() || p <= 0.0 || p > 1.0 {
        return Err(SimError::InvalidParameter {
            name: "participation_rate",
            value: p,
            reason: "must be in (0, 1]",
        });
    }
    Ok(p)
}

pub fn check_cost_rate(rate: f64) -> Result<f64> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(SimError::InvalidParameter {
            name: "cost_rate",
            value: rate,
            reason: "must be finite and non-negative",
        });
    }
    Ok(rate)
}

pub fn check_target(target: TargetQuantity) -> Result<TargetQuantity> {
    if let TargetQuantity::Limit(q) = target {
        if !q.is_finite() || q < 0.0 {
            return Err(SimError::InvalidParameter {
                name: "target_quantity",
                value: q,
                reason: "must be finite and non-negative (use Unbounded for no limit)",
            });
        }
    }
    Ok(target)
}
