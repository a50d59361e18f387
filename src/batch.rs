//! Batch driver: one simulation per (instrument, year, side) in a snapshot.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::BatchConfig;
use crate::data::TickStore;
use crate::exec::simulate;
use crate::report::{write_fills, RunSummary};
use crate::series::TickSeries;
use crate::types::{Fill, SeriesKey, Side, TargetQuantity, TimeKey};

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: Vec<RunSummary>,
    /// Series with no ticks on a side.
    pub skipped: usize,
    /// Series whose load, simulation or write failed.
    pub failed: usize,
}

pub struct BatchDriver {
    config: BatchConfig,
}

impl BatchDriver {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Simulate one side of one series from its first timestamp with an
    /// unbounded target. Returns `None` for an empty series.
    pub fn simulate_series(
        &self,
        key: &SeriesKey,
        side: Side,
        series: &TickSeries,
    ) -> Result<Option<(Vec<Fill>, f64)>> {
        let Some(first) = series.first_key() else {
            return Ok(None);
        };
        let cost_rate = self.config.costs.rate_for(&key.instrument);
        let fills = simulate(
            series,
            TargetQuantity::Unbounded,
            self.config.participation_rate,
            TimeKey::start_of(first.timestamp_ms),
            side,
            cost_rate,
        )
        .with_context(|| format!("simulation failed for {} {}", key, side))?;
        Ok(Some((fills, cost_rate)))
    }

    fn run_one(&self, store: &dyn TickStore, key: &SeriesKey, side: Side) -> Result<Option<RunSummary>> {
        let series = store
            .load_series(key, side)
            .with_context(|| format!("failed to load {} {}", key, side))?;
        debug!(series = %key, %side, ticks = series.len(), "loaded");

        let Some((fills, cost_rate)) = self.simulate_series(key, side, &series)? else {
            return Ok(None);
        };

        let path = self.config.output.path_for(key, side);
        write_fills(&path, &fills, self.config.output.delimiter_byte()?)?;

        let mut summary = RunSummary::from_fills(key, side, cost_rate, &fills);
        summary.output = Some(path);
        Ok(Some(summary))
    }

    /// Run every key in `store`, Buy then Sell. Per-series failures are
    /// logged and counted; only output-directory and summary I/O abort.
    pub fn run(&self, store: &dyn TickStore) -> Result<BatchSummary> {
        self.config.validate()?;
        let out_dir = &self.config.output.dir;
        fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;

        let keys = store.list_keys().context("failed to list series")?;
        let total = keys.len();
        let mut summary = BatchSummary::default();

        for (i, key) in keys.iter().enumerate() {
            info!("processing series {}/{} ({})", i + 1, total, key);
            for side in Side::ALL {
                match self.run_one(store, key, side) {
                    Ok(Some(run)) => {
                        debug!(series = %key, %side, fills = run.fills, "done");
                        summary.runs.push(run);
                    }
                    Ok(None) => {
                        warn!(series = %key, %side, "no ticks, skipping");
                        summary.skipped += 1;
                    }
                    Err(e) => {
                        warn!(series = %key, %side, error = %format!("{:#}", e), "run failed, skipping");
                        summary.failed += 1;
                    }
                }
            }
        }

        let manifest = self.summary_path();
        let file = fs::File::create(&manifest)
            .with_context(|| format!("failed to create {}", manifest.display()))?;
        serde_json::to_writer_pretty(file, &summary).context("failed to write batch summary")?;

        info!(
            "batch complete: {} runs written, {} skipped, {} failed",
            summary.runs.len(),
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.config.output.dir.join("summary.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputSettings;
    use crate::data::SqliteStore;
    use crate::series::make_tick;
    use crate::types::Tick;

    fn config_in(dir: &std::path::Path) -> BatchConfig {
        BatchConfig {
            output: OutputSettings {
                dir: dir.to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn ticks() -> Vec<Tick> {
        vec![
            make_tick(1_514_764_800_000, 0, 100_000_000, 20_000_000_000, false),
            make_tick(1_514_764_800_000, 1, 101_000_000, 20_000_000_000, true),
            make_tick(1_514_764_801_000, 0, 99_000_000, 40_000_000_000, true),
        ]
    }

    /// Store whose loads always fail.
    struct BrokenStore;

    impl TickStore for BrokenStore {
        fn init(&self) -> Result<()> {
            Ok(())
        }
        fn insert_ticks(&self, _key: &SeriesKey, _side: Side, _ticks: &[Tick]) -> Result<()> {
            Ok(())
        }
        fn list_keys(&self) -> Result<Vec<SeriesKey>> {
            Ok(vec![SeriesKey::new("ETH-BTC", "2018")])
        }
        fn load_series(&self, _key: &SeriesKey, _side: Side) -> Result<TickSeries> {
            anyhow::bail!("disk on fire")
        }
        fn count_ticks(&self, _key: &SeriesKey, _side: Side) -> Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_simulate_series_uses_instrument_cost() {
        let driver = BatchDriver::new(BatchConfig::default());
        let series = TickSeries::new(ticks()).unwrap();

        let (fills, rate) = driver
            .simulate_series(&SeriesKey::new("ETH-BTC", "2018"), Side::Buy, &series)
            .unwrap()
            .unwrap();
        assert_eq!(rate, 0.0010);
        assert_eq!(fills.len(), 2);
        // First window holds both seq 0 and seq 1 of the first timestamp.
        assert_eq!(fills[0].price_millionths, 101_000_000);
        assert_eq!(fills[0].size_billionths, 1e9);

        let (_, rate) = driver
            .simulate_series(&SeriesKey::new("BTC-USD", "2018"), Side::Sell, &series)
            .unwrap()
            .unwrap();
        assert_eq!(rate, 0.0050);
    }

    #[test]
    fn test_simulate_series_empty() {
        let driver = BatchDriver::new(BatchConfig::default());
        let res = driver
            .simulate_series(&SeriesKey::new("ETH-BTC", "2018"), Side::Buy, &TickSeries::default())
            .unwrap();
        assert!(res.is_none());
    }

    #[test]
    fn test_run_writes_one_file_per_side() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::in_memory().unwrap();
        store.init().unwrap();
        let eth = SeriesKey::new("ETH-BTC", "2018");
        let btc = SeriesKey::new("BTC-USD", "2018");
        store.insert_ticks(&eth, Side::Buy, &ticks()).unwrap();
        store.insert_ticks(&eth, Side::Sell, &ticks()).unwrap();
        store.insert_ticks(&btc, Side::Buy, &ticks()).unwrap();

        let driver = BatchDriver::new(config_in(dir.path()));
        let summary = driver.run(&store).unwrap();

        assert_eq!(summary.runs.len(), 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);

        // BTC-USD sorts first; Buy before Sell within a key.
        assert_eq!(summary.runs[0].instrument, "BTC-USD");
        assert_eq!(summary.runs[1].side, Side::Buy);
        assert_eq!(summary.runs[2].side, Side::Sell);

        for name in [
            "ETH-BTC_2018_total_buy_opportunities.csv",
            "ETH-BTC_2018_total_sell_opportunities.csv",
            "BTC-USD_2018_total_buy_opportunities.csv",
        ] {
            let content = std::fs::read_to_string(dir.path().join(name)).unwrap();
            assert_eq!(content.lines().count(), 3, "{}", name);
        }
        assert!(!dir.path().join("BTC-USD_2018_total_sell_opportunities.csv").exists());

        let manifest = std::fs::read_to_string(driver.summary_path()).unwrap();
        let parsed: BatchSummary = serde_json::from_str(&manifest).unwrap();
        assert_eq!(parsed.runs.len(), 3);
    }

    #[test]
    fn test_sell_side_picks_lowest() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::in_memory().unwrap();
        store.init().unwrap();
        let key = SeriesKey::new("ETH-BTC", "2018");
        store.insert_ticks(&key, Side::Sell, &ticks()).unwrap();

        let summary = BatchDriver::new(config_in(dir.path())).run(&store).unwrap();
        assert_eq!(summary.runs.len(), 1);
        assert_eq!(summary.runs[0].side, Side::Sell);
        assert_eq!(summary.runs[0].fills, 2);
        // Window 1 min is 100.0, window 2 is 99.0 at twice the size.
        let expected = ((100e6 * 1e9 / 1e9 + 99e6 * 2e9 / 1e9) / 3e9 * 1e9) as i64;
        assert_eq!(summary.runs[0].vwap_millionths, expected);
    }

    #[test]
    fn test_run_slash_instrument_writes_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::in_memory().unwrap();
        store.init().unwrap();
        let key = SeriesKey::new("ETH/BTC", "2018");
        store.insert_ticks(&key, Side::Buy, &ticks()).unwrap();

        let summary = BatchDriver::new(config_in(dir.path())).run(&store).unwrap();
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.runs.len(), 1);
        assert_eq!(summary.runs[0].instrument, "ETH/BTC");
        assert_eq!(summary.runs[0].cost_rate, 0.0010);

        let path = dir.path().join("ETH-BTC_2018_total_buy_opportunities.csv");
        assert_eq!(summary.runs[0].output.as_deref(), Some(path.as_path()));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_run_counts_failures_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let summary = BatchDriver::new(config_in(dir.path())).run(&BrokenStore).unwrap();
        assert!(summary.runs.is_empty());
        assert_eq!(summary.failed, 2);
        assert!(dir.path().join("summary.json").exists());
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.participation_rate = 0.0;
        let store = SqliteStore::in_memory().unwrap();
        store.init().unwrap();
        assert!(BatchDriver::new(config).run(&store).is_err());
    }
}
