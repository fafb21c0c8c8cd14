//! Gain from trough: momentum over a horizon.
//!
//! `(close / min(low[t-period+1..=t]) - 1) * 100`. The trough is taken over
//! lows, so the figure measures recovery from the worst intraday print in
//! the window. A non-positive trough yields no value.
//!
//! Lookback: period - 1.

use super::rolling::rolling_min;
use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct TroughGain {
    period: usize,
    name: String,
}

impl TroughGain {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "gain period must be >= 1");
        Self {
            period,
            name: format!("gain_{period}"),
        }
    }
}

impl Indicator for TroughGain {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        rolling_min(&lows, self.period)
            .into_iter()
            .zip(bars)
            .map(|(trough, bar)| match trough {
                Some(t) if t > 0.0 && bar.close.is_finite() => Some((bar.close / t - 1.0) * 100.0),
                _ => None,
            })
            .collect()
    }
}
