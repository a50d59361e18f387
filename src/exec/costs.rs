//! Notional, trading cost and running VWAP over a fill sequence, plus the
//! per-instrument cost schedule.

use serde::{Deserialize, Serialize};

use super::{DEFAULT_CRYPTO_CRYPTO_COST, DEFAULT_OTHER_COST, SIZE_SCALE};
use crate::types::{Fill, TimeKey};

/// A fill before cost post-processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFill {
    pub key: TimeKey,
    pub price_millionths: i64,
    pub size_billionths: f64,
}

/// Attach notional, trading cost and running VWAP to each fill, in order.
///
/// VWAP is cumulative notional over cumulative size, rescaled to millionths
/// and truncated toward zero. While cumulative size is zero the VWAP is 0.
pub fn price_fills(raw: Vec<RawFill>, cost_rate: f64) -> Vec<Fill> {
    let mut cum_notional = 0.0;
    let mut cum_size = 0.0;

    raw.into_iter()
        .map(|r| {
            let notional = r.price_millionths as f64 * r.size_billionths / SIZE_SCALE;
            cum_notional += notional;
            cum_size += r.size_billionths;

            let vwap_millionths = if cum_size > 0.0 {
                (cum_notional / cum_size * SIZE_SCALE) as i64
            } else {
                0
            };

            Fill {
                key: r.key,
                price_millionths: r.price_millionths,
                size_billionths: r.size_billionths,
                notional_millionths: notional,
                trading_cost_millionths: notional * cost_rate,
                vwap_millionths,
            }
        })
        .collect()
}

/// Transaction cost rates keyed by instrument type.
///
/// An instrument `BASE-QUOTE` (or `BASE/QUOTE`) whose legs are both listed in
/// `crypto_assets` pays `crypto_crypto_rate`; everything else pays
/// `other_rate`. With the default asset set, any pair of BTC, ETH, LTC and
/// BCH counts as crypto-to-crypto, not only `ETH-BTC`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSchedule {
    #[serde(default = "default_crypto_crypto_rate")]
    pub crypto_crypto_rate: f64,
    #[serde(default = "default_other_rate")]
    pub other_rate: f64,
    #[serde(default = "default_crypto_assets")]
    pub crypto_assets: Vec<String>,
}

fn default_crypto_crypto_rate() -> f64 { DEFAULT_CRYPTO_CRYPTO_COST }
fn default_other_rate() -> f64 { DEFAULT_OTHER_COST }
fn default_crypto_assets() -> Vec<String> {
    ["BTC", "ETH", "LTC", "BCH"].iter().map(|s| s.to_string()).collect()
}

impl Default for CostSchedule {
    fn default() -> Self {
        Self {
            crypto_crypto_rate: default_crypto_crypto_rate(),
            other_rate: default_other_rate(),
            crypto_assets: default_crypto_assets(),
        }
    }
}

impl CostSchedule {
    pub fn is_crypto_crypto(&self, instrument: &str) -> bool {
        let mut legs = instrument.split(['-', '/']);
        match (legs.next(), legs.next(), legs.next()) {
            (Some(base), Some(quote), None) => self.is_crypto(base) && self.is_crypto(quote),
            _ => false,
        }
    }

    pub fn rate_for(&self, instrument: &str) -> f64 {
        if self.is_crypto_crypto(instrument) {
            self.crypto_crypto_rate
        } else {
            self.other_rate
        }
    }

    fn is_crypto(&self, asset: &str) -> bool {
        let asset = asset.trim();
        self.crypto_assets.iter().any(|a| a.eq_ignore_ascii_case(asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(ts: i64, price: i64, size: f64) -> RawFill {
        RawFill {
            key: TimeKey::new(ts, 0),
            price_millionths: price,
            size_billionths: size,
        }
    }

    #[test]
    fn test_empty_sequence() {
        assert!(price_fills(Vec::new(), 0.001).is_empty());
    }

    #[test]
    fn test_notional_cost_and_vwap() {
        let fills = price_fills(
            vec![
                raw(1, 100_000_000, 5_000_000_000.0),
                raw(2, 120_000_000, 10_000_000_000.0),
                raw(3, 90_000_000, 2_500_000_000.0),
            ],
            0.001,
        );
        assert_eq!(fills.len(), 3);

        assert_eq!(fills[0].notional_millionths, 500_000_000.0);
        assert_eq!(fills[1].notional_millionths, 1_200_000_000.0);
        assert_eq!(fills[2].notional_millionths, 225_000_000.0);

        assert!((fills[0].trading_cost_millionths - 500_000.0).abs() < 1e-6);
        assert!((fills[1].trading_cost_millionths - 1_200_000.0).abs() < 1e-6);
        assert!((fills[2].trading_cost_millionths - 225_000.0).abs() < 1e-6);

        // (100*5 + 120*10) / 15 = 113.333.. truncated
        assert_eq!(fills[0].vwap_millionths, 100_000_000);
        assert_eq!(fills[1].vwap_millionths, 113_333_333);
        assert_eq!(fills[2].vwap_millionths, 110_000_000);
    }

    #[test]
    fn test_zero_size_does_not_divide() {
        let fills = price_fills(vec![raw(1, 100, 0.0), raw(2, 200, 0.0)], 0.001);
        assert_eq!(fills[0].vwap_millionths, 0);
        assert_eq!(fills[1].vwap_millionths, 0);
        assert_eq!(fills[1].notional_millionths, 0.0);
    }

    #[test]
    fn test_vwap_recovers_after_zero_size_prefix() {
        let fills = price_fills(vec![raw(1, 100, 0.0), raw(2, 200_000_000, 1e9)], 0.0);
        assert_eq!(fills[0].vwap_millionths, 0);
        assert_eq!(fills[1].vwap_millionths, 200_000_000);
    }

    #[test]
    fn test_cost_schedule_defaults() {
        let s = CostSchedule::default();
        assert_eq!(s.rate_for("ETH-BTC"), 0.0010);
        assert_eq!(s.rate_for("BTC-USD"), 0.0050);
        assert_eq!(s.rate_for("ETH-USD"), 0.0050);
        assert_eq!(s.rate_for("eth/btc"), 0.0010);
        assert_eq!(s.rate_for("LTC-BTC"), 0.0010);
        assert_eq!(s.rate_for("BTC-ETH"), 0.0010);
    }

    #[test]
    fn test_cost_schedule_malformed_instrument_is_other() {
        let s = CostSchedule::default();
        assert_eq!(s.rate_for("BTC"), s.other_rate);
        assert_eq!(s.rate_for("ETH-BTC-LTC"), s.other_rate);
        assert_eq!(s.rate_for(""), s.other_rate);
    }

    #[test]
    fn test_cost_schedule_custom_assets() {
        let s = CostSchedule {
            crypto_assets: vec!["SOL".into(), "USDT".into()],
            ..Default::default()
        };
        assert!(s.is_crypto_crypto("SOL-USDT"));
        assert!(!s.is_crypto_crypto("ETH-BTC"));
    }
}
