//! Domain types for participation-rate execution simulation.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Direction of the simulated parent order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Buy, Side::Sell];

    /// Signed integer form used by the snapshot store.
    pub fn code(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// Rank two prices for this side. `Ordering::Greater` means `a` is the
    /// price this side selects over `b`.
    ///
    /// Buy ranks the highest price first, Sell the lowest. Fills are assumed
    /// to happen at the worst print in the window.
    pub fn price_ordering(&self, a: i64, b: i64) -> Ordering {
        match self {
            Side::Buy => a.cmp(&b),
            Side::Sell => b.cmp(&a),
        }
    }

    /// True only if `candidate` ranks strictly ahead of `incumbent`.
    pub fn prefers(&self, candidate: i64, incumbent: i64) -> bool {
        self.price_ordering(candidate, incumbent) == Ordering::Greater
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl TryFrom<i64> for Side {
    type Error = SimError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Side::Buy),
            -1 => Ok(Side::Sell),
            other => Err(SimError::InvalidSide(other.to_string())),
        }
    }
}

impl FromStr for Side {
    type Err = SimError;

    /// `buy` / `sell` in any case, or the signed codes `1` / `-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Ok(code) = t.parse::<i64>() {
            return Side::try_from(code);
        }
        match t.to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(SimError::InvalidSide(s.to_string())),
        }
    }
}

/// Ordering key of a tick: coarse timestamp, then sub-tick sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeKey {
    /// Unix milliseconds (UTC).
    pub timestamp_ms: i64,
    /// Sequence number within the timestamp.
    pub seq: i64,
}

impl TimeKey {
    pub fn new(timestamp_ms: i64, seq: i64) -> Self {
        Self { timestamp_ms, seq }
    }

    /// Smallest key at `timestamp_ms`, so a range starting here covers every
    /// sequence number sharing that timestamp.
    pub fn start_of(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            seq: i64::MIN,
        }
    }
}

impl std::fmt::Display for TimeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.timestamp_ms, self.seq)
    }
}

/// One trade print from the historical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub key: TimeKey,
    /// Price scaled by 1e6.
    pub price_millionths: i64,
    /// Size scaled by 1e9.
    pub size_billionths: i64,
    /// Whether this record may anchor a simulated fill.
    pub qualifies: bool,
}

/// One simulated child-order fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Key of the tick the fill was priced from.
    pub key: TimeKey,
    pub price_millionths: i64,
    /// Source tick size scaled by the participation rate (billionths).
    pub size_billionths: f64,
    pub notional_millionths: f64,
    pub trading_cost_millionths: f64,
    /// Running VWAP over fills so far, truncated toward zero.
    pub vwap_millionths: i64,
}

/// How much the simulated parent order wants to transact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetQuantity {
    /// Run until qualification points run out.
    Unbounded,
    /// Stop once accumulated size (billionths) reaches this value.
    Limit(f64),
}

impl TargetQuantity {
    pub fn is_reached(&self, accumulated: f64) -> bool {
        match self {
            TargetQuantity::Unbounded => false,
            TargetQuantity::Limit(q) => accumulated >= *q,
        }
    }
}

/// Identifies one tick dataset: an instrument over one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Instrument identifier such as `ETH-BTC`.
    pub instrument: String,
    pub year: String,
}

impl SeriesKey {
    pub fn new(instrument: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            year: year.into(),
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.instrument, self.year)
    }
}
