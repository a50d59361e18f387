//! Time-ordered tick sequence with binary-search range slicing.

use std::ops::Bound;

use crate::error::{Result, SimError};
use crate::types::{Tick, TimeKey};

/// Ticks in non-decreasing [`TimeKey`] order.
#[derive(Debug, Clone, Default)]
pub struct TickSeries {
    ticks: Vec<Tick>,
}

impl TickSeries {
    /// Wrap `ticks`, rejecting any key that goes backwards.
    pub fn new(ticks: Vec<Tick>) -> Result<Self> {
        if let Some(i) = ticks.windows(2).position(|w| w[1].key < w[0].key) {
            return Err(SimError::Unordered { index: i + 1 });
        }
        Ok(Self { ticks })
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn first_key(&self) -> Option<TimeKey> {
        self.ticks.first().map(|t| t.key)
    }

    /// All ticks with `key >= start`.
    pub fn since(&self, start: TimeKey) -> &[Tick] {
        self.slice(Bound::Included(start), Bound::Unbounded)
    }

    /// Contiguous run of ticks whose keys fall within the given bounds.
    pub fn slice(&self, lower: Bound<TimeKey>, upper: Bound<TimeKey>) -> &[Tick] {
        let lo = match lower {
            Bound::Included(k) => self.ticks.partition_point(|t| t.key < k),
            Bound::Excluded(k) => self.ticks.partition_point(|t| t.key <= k),
            Bound::Unbounded => 0,
        };
        let hi = match upper {
            Bound::Included(k) => self.ticks.partition_point(|t| t.key <= k),
            Bound::Excluded(k) => self.ticks.partition_point(|t| t.key < k),
            Bound::Unbounded => self.ticks.len(),
        };
        if lo >= hi {
            return &[];
        }
        &self.ticks[lo..hi]
    }
}

#[cfg(test)]
pub(crate) fn make_tick(timestamp_ms: i64, seq: i64, price: i64, size: i64, qualifies: bool) -> Tick {
    Tick {
        key: TimeKey::new(timestamp_ms, seq),
        price_millionths: price,
        size_billionths: size,
        qualifies,
    }
}
