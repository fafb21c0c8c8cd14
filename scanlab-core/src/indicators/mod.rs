//! Rolling-window metrics computed per ticker.
//!
//! Every metric implements `Indicator`: a pure function from a single
//! ticker's date-ordered bars to a series of the same length. Positions
//! without a full trailing window hold `None`, and `None` is never coerced
//! to zero downstream.
//!
//! `IndicatorCalculator` bundles the metrics the screener needs and turns
//! a ticker's history into a `DerivedSeries`.

pub mod adr;
pub mod calculator;
pub mod dollar_volume;
pub mod gain;
pub mod rolling;
pub mod sma;

pub use adr::{daily_range_factor, Adr, RANGE_EPSILON};
pub use calculator::{group_by_ticker, IndicatorCalculator};
pub use dollar_volume::AvgDollarVolume;
pub use gain::TroughGain;
pub use sma::Sma;

use crate::domain::PriceBar;

/// Trait for per-ticker metrics.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on data from bar t+1 or later. Every
/// indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_200", "adr_20").
    fn name(&self) -> &str;

    /// Number of leading bars that can never carry a value.
    fn lookback(&self) -> usize;

    /// Compute the metric for one ticker's full, date-ordered history.
    ///
    /// Returns a series the same length as `bars`; the first `lookback()`
    /// entries are `None`.
    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>>;
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                ticker: "TEST".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Create bars from explicit (high, low, close) triples for testing.
#[cfg(test)]
pub fn make_hlc_bars(data: &[(f64, f64, f64)]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| PriceBar {
            ticker: "TEST".to_string(),
            date: base_date + chrono::Duration::days(i as i64),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert a metric value is defined and approximately equal to `expected`.
#[cfg(test)]
pub fn assert_approx(actual: Option<f64>, expected: f64, epsilon: f64) {
    let actual = actual.unwrap_or_else(|| panic!("expected {expected}, got no value"));
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-9;
