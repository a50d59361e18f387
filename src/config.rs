//! Batch configuration, loadable from a TOML file.
//!
//! ```toml
//! participation_rate = 0.05
//!
//! [costs]
//! crypto_crypto_rate = 0.001
//! other_rate = 0.005
//! crypto_assets = ["BTC", "ETH"]
//!
//! [output]
//! dir = "./data"
//! extension = "csv"
//! delimiter = ","
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::exec::{check_cost_rate, check_participation_rate, CostSchedule, DEFAULT_PARTICIPATION_RATE};
use crate::types::{SeriesKey, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Fraction of each selected print's size taken as the child fill.
    #[serde(default = "default_participation_rate")]
    pub participation_rate: f64,
    #[serde(default)]
    pub costs: CostSchedule,
    #[serde(default)]
    pub output: OutputSettings,
}

fn default_participation_rate() -> f64 { DEFAULT_PARTICIPATION_RATE }

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            participation_rate: DEFAULT_PARTICIPATION_RATE,
            costs: CostSchedule::default(),
            output: OutputSettings::default(),
        }
    }
}

/// Where and how fill tables are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_dir() -> PathBuf { PathBuf::from("./data") }
fn default_extension() -> String { "csv".to_string() }
fn default_delimiter() -> char { ',' }

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            extension: default_extension(),
            delimiter: default_delimiter(),
        }
    }
}

impl OutputSettings {
    /// `<dir>/<instrument>_<year>_total_<side>_opportunities.<ext>`
    ///
    /// Path separators inside the instrument or year become `-`, so
    /// `ETH/BTC` lands in `dir` as `ETH-BTC_...`.
    pub fn path_for(&self, key: &SeriesKey, side: Side) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_total_{}_opportunities.{}",
            file_component(&key.instrument),
            file_component(&key.year),
            side.label(),
            self.extension
        ))
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        Ok(self.delimiter as u8)
    }
}

fn file_component(s: &str) -> String {
    s.replace(['/', '\\'], "-")
}

impl BatchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_participation_rate(self.participation_rate)?;
        check_cost_rate(self.costs.crypto_crypto_rate)?;
        check_cost_rate(self.costs.other_rate)?;
        self.output.delimiter_byte()?;
        if self.output.extension.is_empty() {
            bail!("output extension must not be empty");
        }
        Ok(())
    }
}
