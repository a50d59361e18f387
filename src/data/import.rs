//! Import adapter for delimited trade-print files.
//!
//! Expected columns (header row required):
//! `datetime, seq, price_millionths, size_billionths, qualifies`.
//! Rows that fail to parse, and rows repeating an earlier time key, are
//! skipped and counted.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::types::{SeriesKey, Side, Tick, TimeKey};

use super::store::TickStore;

/// One row of a tick file.
#[derive(Debug, Deserialize)]
pub struct TickRow {
    #[serde(alias = "timestamp", alias = "Datetime")]
    pub datetime: String,
    #[serde(alias = "Nano seconds", alias = "nanos")]
    pub seq: i64,
    #[serde(alias = "PriceMillionths")]
    pub price_millionths: i64,
    #[serde(alias = "SizeBillionths")]
    pub size_billionths: i64,
    #[serde(alias = "qualify")]
    pub qualifies: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub rows_read: usize,
    pub ticks_imported: usize,
    pub rows_skipped: usize,
}

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a datetime cell into Unix milliseconds (UTC).
///
/// Accepts RFC 3339, naive `YYYY-MM-DD HH:MM:SS[.fff]` (taken as UTC), or a
/// bare integer already in milliseconds.
pub fn parse_timestamp_ms(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<i64>() {
        return Some(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
}

pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "t" | "yes" => Some(true),
        "false" | "0" | "f" | "no" => Some(false),
        _ => None,
    }
}

/// Convert one row into a [`Tick`], or `None` if any cell is unusable.
pub fn map_row(row: &TickRow) -> Option<Tick> {
    let timestamp_ms = parse_timestamp_ms(&row.datetime)?;
    let qualifies = parse_flag(&row.qualifies)?;
    Some(Tick {
        key: TimeKey::new(timestamp_ms, row.seq),
        price_millionths: row.price_millionths,
        size_billionths: row.size_billionths,
        qualifies,
    })
}

/// Read a tick file and store it as one side of `key`.
pub fn import_tick_file(
    path: &Path,
    store: &dyn TickStore,
    key: &SeriesKey,
    side: Side,
    delimiter: u8,
) -> Result<ImportStats> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut stats = ImportStats::default();
    let mut ticks = Vec::new();

    for (line, record) in rdr.deserialize::<TickRow>().enumerate() {
        stats.rows_read += 1;
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                debug!(line = line + 2, error = %e, "unparseable row, skipping");
                stats.rows_skipped += 1;
                continue;
            }
        };
        match map_row(&row) {
            Some(tick) => ticks.push(tick),
            None => {
                debug!(line = line + 2, ?row, "bad datetime or qualifies flag, skipping");
                stats.rows_skipped += 1;
            }
        }
    }

    // Stable sort: on a repeated time key the first row in the file is kept.
    ticks.sort_by_key(|t| t.key);
    let parsed = ticks.len();
    ticks.dedup_by(|later, kept| {
        let dup = later.key == kept.key;
        if dup {
            warn!(key = %later.key, "duplicate time key, skipping");
        }
        dup
    });
    stats.rows_skipped += parsed - ticks.len();

    store
        .insert_ticks(key, side, &ticks)
        .with_context(|| format!("failed to store ticks for {} {}", key, side))?;
    stats.ticks_imported = ticks.len();

    info!(
        series = %key,
        %side,
        imported = stats.ticks_imported,
        skipped = stats.rows_skipped,
        "imported {}",
        path.display()
    );
    Ok(stats)
}
