//! Average Daily Range percent (ADR%).
//!
//! `daily_range_factor = high / (low + ε)`; ADR% is the trailing mean of
//! that factor minus one, times 100. The ε term keeps a zero low finite and
//! slightly shrinks the ratio.

use super::rolling::rolling_sum;
use super::Indicator;
use crate::domain::PriceBar;

/// Guard added to the low before dividing.
pub const RANGE_EPSILON: f64 = 1e-9;

/// `high / (low + ε)` for one bar.
pub fn daily_range_factor(bar: &PriceBar) -> f64 {
    bar.high / (bar.low + RANGE_EPSILON)
}

#[derive(Debug, Clone)]
pub struct Adr {
    period: usize,
    name: String,
}

impl Adr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADR period must be >= 1");
        Self {
            period,
            name: format!("adr_{period}"),
        }
    }
}

impl Indicator for Adr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let factors: Vec<f64> = bars.iter().map(daily_range_factor).collect();
        let w = self.period as f64;
        rolling_sum(&factors, self.period)
            .into_iter()
            .map(|s| s.map(|s| (s / w - 1.0) * 100.0))
            .collect()
    }
}
