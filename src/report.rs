use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Fill, SeriesKey, Side, TimeKey};

/// One output table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillRow {
    pub datetime: String,
    pub seq: i64,
    pub price_millionths: i64,
    pub size_billionths: f64,
    pub notional_millionths: f64,
    pub trading_cost_millionths: f64,
    pub vwap_millionths: i64,
}

impl From<&Fill> for FillRow {
    fn from(f: &Fill) -> Self {
        Self {
            datetime: format_timestamp(f.key.timestamp_ms),
            seq: f.key.seq,
            price_millionths: f.price_millionths,
            size_billionths: f.size_billionths,
            notional_millionths: f.notional_millionths,
            trading_cost_millionths: f.trading_cost_millionths,
            vwap_millionths: f.vwap_millionths,
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS.fff` in UTC, or the raw milliseconds if out of range.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(timestamp_ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        None => timestamp_ms.to_string(),
    }
}

/// Write a fill sequence as a delimited table with a header row.
pub fn write_fills(path: &Path, fills: &[Fill], delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    if fills.is_empty() {
        // serialize() only emits headers alongside the first row
        wtr.write_record([
            "datetime",
            "seq",
            "price_millionths",
            "size_billionths",
            "notional_millionths",
            "trading_cost_millionths",
            "vwap_millionths",
        ])?;
    }
    for f in fills {
        wtr.serialize(FillRow::from(f))
            .with_context(|| format!("failed to write row for {}", f.key))?;
    }

    wtr.flush().context("failed to flush fill table")?;
    Ok(())
}

/// Aggregate view of one simulated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub instrument: String,
    pub year: String,
    pub side: Side,
    pub cost_rate: f64,
    pub fills: usize,
    pub total_size_billionths: f64,
    pub total_notional_millionths: f64,
    pub total_cost_millionths: f64,
    /// Running VWAP of the last fill, 0 when there are none.
    pub vwap_millionths: i64,
    pub first_fill: Option<TimeKey>,
    pub last_fill: Option<TimeKey>,
    pub output: Option<PathBuf>,
}

impl RunSummary {
    pub fn from_fills(key: &SeriesKey, side: Side, cost_rate: f64, fills: &[Fill]) -> Self {
        Self {
            instrument: key.instrument.clone(),
            year: key.year.clone(),
            side,
            cost_rate,
            fills: fills.len(),
            total_size_billionths: fills.iter().map(|f| f.size_billionths).sum(),
            total_notional_millionths: fills.iter().map(|f| f.notional_millionths).sum(),
            total_cost_millionths: fills.iter().map(|f| f.trading_cost_millionths).sum(),
            vwap_millionths: fills.last().map_or(0, |f| f.vwap_millionths),
            first_fill: fills.first().map(|f| f.key),
            last_fill: fills.last().map(|f| f.key),
            output: None,
        }
    }

    /// Print a formatted text report to stdout.
    pub fn print(&self) {
        println!();
        println!("{}", "=".repeat(55));
        println!(
            "  {} {} {} @ {:.2} bps",
            self.instrument,
            self.year,
            self.side,
            self.cost_rate * 10_000.0
        );
        println!("{}", "=".repeat(55));
        println!("  Fills:          {}", self.fills);
        if let (Some(first), Some(last)) = (self.first_fill, self.last_fill) {
            println!("  First fill:     {}", format_timestamp(first.timestamp_ms));
            println!("  Last fill:      {}", format_timestamp(last.timestamp_ms));
        }
        println!("  Size:           {:.3}", self.total_size_billionths / 1e9);
        println!("  Notional:       {:.6}", self.total_notional_millionths / 1e6);
        println!("  Trading cost:   {:.6}", self.total_cost_millionths / 1e6);
        println!("  VWAP:           {:.6}", self.vwap_millionths as f64 / 1e6);
        if let Some(ref path) = self.output {
            println!("  Written to:     {}", path.display());
        }
        println!("{}", "=".repeat(55));
    }
}
