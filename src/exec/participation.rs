use crate::error::Result;
use crate::series::TickSeries;
use crate::types::{Fill, Side, TargetQuantity, TimeKey};

use super::costs::{price_fills, RawFill};
use super::window::{select_price, CandidateWindows};
use super::{check_cost_rate, check_participation_rate, check_target};

/// Simulate a participation-rate parent order over `series`.
///
/// Scanning starts at `start` (inclusive). Every qualification point yields
/// one fill at the `side`-selected price of its candidate window, sized at
/// `participation_rate` of that tick. The run stops once accumulated size
/// reaches `target` or the qualification points are exhausted; an
/// unreachable target is not an error.
pub fn simulate(
    series: &TickSeries,
    target: TargetQuantity,
    participation_rate: f64,
    start: TimeKey,
    side: Side,
    cost_rate: f64,
) -> Result<Vec<Fill>> {
    let participation_rate = check_participation_rate(participation_rate)?;
    let cost_rate = check_cost_rate(cost_rate)?;
    let target = check_target(target)?;

    let mut accumulated = 0.0;
    let mut raw = Vec::new();

    for window in CandidateWindows::new(series.since(start)) {
        if target.is_reached(accumulated) {
            break;
        }
        let Some(tick) = select_price(window, side) else {
            continue;
        };
        let size = tick.size_billionths as f64 * participation_rate;
        raw.push(RawFill {
            key: tick.key,
            price_millionths: tick.price_millionths,
            size_billionths: size,
        });
        accumulated += size;
    }

    Ok(price_fills(raw, cost_rate))
}
