//! Hard liquidity / volatility / price floors.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ScreenRule, ScreenStage, Verdict};
use crate::config::ScreeningConfig;
use crate::domain::Snapshot;

/// Metric checked by the hard-threshold stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMetric {
    AvgDollarVolume,
    AdrPercent,
    ClosePrice,
}

impl fmt::Display for ThresholdMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThresholdMetric::AvgDollarVolume => "avg dollar volume",
            ThresholdMetric::AdrPercent => "ADR%",
            ThresholdMetric::ClosePrice => "close price",
        })
    }
}

/// `value >= minimum`, where a missing value never meets the floor.
pub fn meets_minimum(value: Option<f64>, minimum: f64) -> bool {
    match value {
        Some(v) => v >= minimum,
        None => false,
    }
}

/// Keeps a snapshot only if dollar volume, ADR% and close all clear their floors.
#[derive(Debug, Clone, PartialEq)]
pub struct HardThresholds {
    pub min_dollar_volume: f64,
    pub min_adr_percent: f64,
    pub min_close_price: f64,
}

impl HardThresholds {
    pub fn from_config(config: &ScreeningConfig) -> Self {
        Self {
            min_dollar_volume: config.min_dollar_volume,
            min_adr_percent: config.min_adr_percent,
            min_close_price: config.min_close_price,
        }
    }

    /// Check one metric against its floor.
    pub fn check(&self, metric: ThresholdMetric, snapshot: &Snapshot) -> bool {
        match metric {
            ThresholdMetric::AvgDollarVolume => {
                meets_minimum(snapshot.avg_dollar_volume, self.min_dollar_volume)
            }
            ThresholdMetric::AdrPercent => meets_minimum(snapshot.adr_percent, self.min_adr_percent),
            ThresholdMetric::ClosePrice => meets_minimum(Some(snapshot.close), self.min_close_price),
        }
    }
}

impl ScreenRule for HardThresholds {
    fn name(&self) -> &str {
        "hard_thresholds"
    }

    fn stage(&self) -> ScreenStage {
        ScreenStage::Thresholds
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Verdict {
        for metric in [
            ThresholdMetric::AvgDollarVolume,
            ThresholdMetric::AdrPercent,
            ThresholdMetric::ClosePrice,
        ] {
            if !self.check(metric, snapshot) {
                return Verdict::BelowThreshold { metric };
            }
        }
        Verdict::Passed
    }
}
