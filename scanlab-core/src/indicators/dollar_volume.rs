//! Average dollar volume: liquidity proxy.
//!
//! Trailing mean of `close * volume`. A 1-bar window gives same-day
//! dollar volume.

use super::rolling::rolling_mean;
use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct AvgDollarVolume {
    period: usize,
    name: String,
}

impl AvgDollarVolume {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "dollar volume period must be >= 1");
        Self {
            period,
            name: format!("avg_dollar_volume_{period}"),
        }
    }
}

impl Indicator for AvgDollarVolume {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let dv: Vec<f64> = bars.iter().map(PriceBar::dollar_volume).collect();
        rolling_mean(&dv, self.period)
    }
}
