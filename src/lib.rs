//! Participation-rate execution simulation over historical trade prints.
//!
//! [`exec::simulate`] is the core: a pure function from a tick series and
//! order parameters to a fill sequence with cost and running VWAP. The
//! [`data`], [`batch`] and [`report`] modules load snapshots, drive the
//! simulator across every series and write the results.

pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod exec;
pub mod report;
pub mod series;
pub mod types;

pub use error::SimError;
pub use exec::simulate;
pub use series::TickSeries;
pub use types::{Fill, SeriesKey, Side, TargetQuantity, Tick, TimeKey};
