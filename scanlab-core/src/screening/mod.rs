//! Screening filter: reduces the snapshot set to liquid, volatile,
//! categorically allowed names in a long-term uptrend.
//!
//! Rules are independent predicates combined by conjunction, so rule order
//! never changes the surviving set. Each rule belongs to a stage; exclusion
//! counts are reported per stage group for diagnostics.

pub mod exclusion;
pub mod ma_regime;
pub mod thresholds;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::config::ScreeningConfig;
use crate::domain::Snapshot;

pub use exclusion::CategoryExclusion;
pub use ma_regime::TrendFilter;
pub use thresholds::{meets_minimum, HardThresholds, ThresholdMetric};

/// Stage a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenStage {
    /// Liquidity, volatility and price floors.
    Thresholds,
    /// Sector / industry exclusions.
    Categories,
    /// Close versus long moving average.
    Trend,
}

impl ScreenStage {
    /// Stages 2 and 3 are reported together as policy exclusions.
    pub fn is_policy(self) -> bool {
        !matches!(self, ScreenStage::Thresholds)
    }
}

/// Outcome of one rule for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    Passed,
    /// Metric missing or below its floor.
    BelowThreshold { metric: ThresholdMetric },
    ExcludedSector(String),
    ExcludedIndustry(String),
    /// Close below the long moving average.
    BelowTrend,
}

impl Verdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => f.write_str("PASS"),
            Verdict::BelowThreshold { metric } => write!(f, "FAIL ({metric})"),
            Verdict::ExcludedSector(s) => write!(f, "EXCLUDED (sector {s})"),
            Verdict::ExcludedIndustry(i) => write!(f, "EXCLUDED (industry {i})"),
            Verdict::BelowTrend => f.write_str("FAIL (close below long MA)"),
        }
    }
}

/// Trait for screening rules.
///
/// A rule sees one snapshot at a time and never the rest of the universe.
pub trait ScreenRule: Send + Sync {
    /// Human-readable name (e.g., "hard_thresholds", "ma_trend").
    fn name(&self) -> &str;

    fn stage(&self) -> ScreenStage;

    fn evaluate(&self, snapshot: &Snapshot) -> Verdict;
}

/// Per-rule evaluation record, used by ticker inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenEvaluation {
    pub rule: String,
    pub stage: ScreenStage,
    pub verdict: Verdict,
}

/// Per-stage counts for one screening pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenReport {
    pub input: usize,
    pub excluded_by_thresholds: usize,
    /// Passed the thresholds but removed by category or trend rules.
    pub excluded_by_policy: usize,
    pub survivors: usize,
}

impl ScreenReport {
    /// Snapshots that cleared the hard thresholds.
    pub fn passed_thresholds(&self) -> usize {
        self.input - self.excluded_by_thresholds
    }
}

/// Surviving snapshots plus the counts that produced them.
#[derive(Debug, Clone, Default)]
pub struct ScreenOutcome {
    pub survivors: Vec<Snapshot>,
    pub report: ScreenReport,
}

/// Ordered collection of screening rules.
pub struct ScreeningFilter {
    rules: Vec<Box<dyn ScreenRule>>,
}

impl ScreeningFilter {
    /// Standard three-stage filter. The trend stage is omitted when
    /// `use_ma_filter` is off.
    pub fn new(config: &ScreeningConfig) -> Self {
        let mut rules: Vec<Box<dyn ScreenRule>> = vec![
            Box::new(HardThresholds::from_config(config)),
            Box::new(CategoryExclusion::new(
                config.excluded_sectors.clone(),
                config.excluded_industries.clone(),
            )),
        ];
        if config.use_ma_filter {
            rules.push(Box::new(TrendFilter));
        }
        Self { rules }
    }

    /// Filter from an explicit rule list.
    pub fn with_rules(rules: Vec<Box<dyn ScreenRule>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Box<dyn ScreenRule>] {
        &self.rules
    }

    /// Evaluate every rule against one snapshot.
    pub fn evaluate(&self, snapshot: &Snapshot) -> Vec<ScreenEvaluation> {
        self.rules
            .iter()
            .map(|r| ScreenEvaluation {
                rule: r.name().to_string(),
                stage: r.stage(),
                verdict: r.evaluate(snapshot),
            })
            .collect()
    }

    pub fn passes(&self, snapshot: &Snapshot) -> bool {
        self.rules.iter().all(|r| r.evaluate(snapshot).is_passed())
    }

    /// Keep the snapshots every rule passes, preserving input order.
    pub fn apply(&self, snapshots: Vec<Snapshot>) -> ScreenOutcome {
        let mut report = ScreenReport {
            input: snapshots.len(),
            ..ScreenReport::default()
        };
        let mut survivors = Vec::with_capacity(snapshots.len());

        for snap in snapshots {
            let evals = self.evaluate(&snap);
            let failed_threshold = evals
                .iter()
                .any(|e| !e.stage.is_policy() && !e.verdict.is_passed());
            let failed_policy = evals
                .iter()
                .any(|e| e.stage.is_policy() && !e.verdict.is_passed());

            if failed_threshold {
                report.excluded_by_thresholds += 1;
            } else if failed_policy {
                debug!(ticker = %snap.ticker, "excluded by policy");
                report.excluded_by_policy += 1;
            } else {
                survivors.push(snap);
            }
        }
        report.survivors = survivors.len();

        info!(
            input = report.input,
            passed_thresholds = report.passed_thresholds(),
            excluded_by_policy = report.excluded_by_policy,
            survivors = report.survivors,
            "screening complete"
        );
        ScreenOutcome { survivors, report }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{HorizonSet, Snapshot, TickerProfile};
    use chrono::NaiveDate;

    /// Snapshot that clears the default thresholds and trend filter.
    pub fn passing_snapshot(ticker: &str) -> Snapshot {
        Snapshot {
            ticker: ticker.into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            close: 50.0,
            bar_count: 250,
            dollar_volume: 4_000_000.0,
            ma200: Some(45.0),
            avg_dollar_volume: Some(4_000_000.0),
            adr_percent: Some(9.0),
            gains: HorizonSet::new(Some(12.0), Some(30.0), Some(60.0)),
            profile: TickerProfile::new(ticker, "NASDAQ", "Stock")
                .with_sector("Technology")
                .with_industry("Semiconductors"),
        }
    }
}
