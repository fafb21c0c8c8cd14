//! Single-ticker inspection: why is (or isn't) a ticker on the watchlist?
//!
//! Computes the metrics for one ticker's latest bar and checks each hard
//! threshold separately, then runs every screening rule for the full verdict.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use scanlab_core::config::ScanConfig;
use scanlab_core::data::PriceStore;
use scanlab_core::domain::{DerivedSeries, Horizon, Snapshot, TickerProfile};
use scanlab_core::indicators::{group_by_ticker, IndicatorCalculator};
use scanlab_core::screening::{
    HardThresholds, ScreenEvaluation, ScreeningFilter, ThresholdMetric,
};

use crate::report::{format_dollars, format_percent};
use crate::runner::ScanError;

/// One hard-threshold check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionCheck {
    pub metric: ThresholdMetric,
    pub minimum: f64,
    pub value: Option<f64>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspection {
    pub ticker: String,
    pub bar_count: usize,
    /// Bars needed for every gain horizon to be defined, when history is shorter.
    pub insufficient_history: Option<usize>,
    pub snapshot: Snapshot,
    /// `None` when the ticker has no profile; the scan would skip it.
    pub profile: Option<TickerProfile>,
    pub criteria: Vec<CriterionCheck>,
    pub evaluations: Vec<ScreenEvaluation>,
}

impl Inspection {
    /// Passes the hard thresholds.
    pub fn passes_thresholds(&self) -> bool {
        self.criteria.iter().all(|c| c.passed)
    }

    /// Passes every screening rule and has a profile.
    pub fn passes_screening(&self) -> bool {
        self.profile.is_some() && self.evaluations.iter().all(|e| e.verdict.is_passed())
    }

    pub fn render(&self) -> String {
        let s = &self.snapshot;
        let mut out = String::new();
        let _ = writeln!(out, "--- Inspecting Ticker: {} ---", self.ticker);
        if let Some(required) = self.insufficient_history {
            let _ = writeln!(
                out,
                "Warning: not enough history for every gain horizon. Required: {required} bars, found: {}.",
                self.bar_count
            );
        }

        let _ = writeln!(out, "\n--- Metrics as of {} ---", s.date);
        let _ = writeln!(out, "Close: {}", format_dollars(s.close, 2));
        let _ = writeln!(out, "Avg dollar volume: {}", show(s.avg_dollar_volume, |v| format_dollars(v, 0)));
        let _ = writeln!(out, "ADR: {}", show(s.adr_percent, format_percent));
        let _ = writeln!(out, "Long MA: {}", show(s.ma200, |v| format_dollars(v, 2)));
        for h in Horizon::ALL {
            let _ = writeln!(out, "{h} gain: {}", show(s.gain(h), format_percent));
        }

        let _ = writeln!(out, "\n--- Criteria Check ---");
        for (i, c) in self.criteria.iter().enumerate() {
            let (minimum, value) = match c.metric {
                ThresholdMetric::ClosePrice => (
                    format_dollars(c.minimum, 2),
                    show(c.value, |v| format_dollars(v, 2)),
                ),
                ThresholdMetric::AvgDollarVolume => (
                    format_dollars(c.minimum, 0),
                    show(c.value, |v| format_dollars(v, 0)),
                ),
                ThresholdMetric::AdrPercent => {
                    (format_percent(c.minimum), show(c.value, format_percent))
                }
            };
            let _ = writeln!(
                out,
                "{}. Min {} >= {minimum}: {} (Value: {value})",
                i + 1,
                c.metric,
                pass_fail(c.passed)
            );
        }

        let _ = writeln!(out, "\n--- Screening Rules ---");
        match &self.profile {
            Some(_) => {
                for e in &self.evaluations {
                    let _ = writeln!(out, "{}: {}", e.rule, e.verdict);
                }
            }
            None => {
                let _ = writeln!(out, "No profile registered: the scan skips this ticker.");
            }
        }

        let _ = write!(
            out,
            "\nThis ticker {} screening and {} be considered for the gainer rankings.",
            if self.passes_screening() { "passes" } else { "fails" },
            if self.passes_screening() { "would" } else { "would not" }
        );
        out
    }
}

fn show(value: Option<f64>, f: impl Fn(f64) -> String) -> String {
    match value {
        Some(v) => f(v),
        None => "no value".to_string(),
    }
}

fn pass_fail(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}

/// Inspect one ticker from `store` under `config`.
pub fn inspect_ticker(
    config: &ScanConfig,
    store: &dyn PriceStore,
    ticker: &str,
) -> Result<Inspection, ScanError> {
    config.validate()?;
    let bars: Vec<_> = store
        .load_all_bars()?
        .into_iter()
        .filter(|b| b.ticker == ticker)
        .collect();
    let profile = store
        .load_all_profiles()?
        .into_iter()
        .find(|p| p.ticker == ticker);

    let history = group_by_ticker(bars).remove(ticker).unwrap_or_default();
    let series = IndicatorCalculator::new(&config.indicators).compute(ticker, &history);
    inspect_series(config, &series, profile)
}

/// Inspect an already-computed series.
pub fn inspect_series(
    config: &ScanConfig,
    series: &DerivedSeries,
    profile: Option<TickerProfile>,
) -> Result<Inspection, ScanError> {
    let joined = profile
        .clone()
        .unwrap_or_else(|| TickerProfile::new(series.ticker.as_str(), "", ""));
    let snapshot = Snapshot::from_series(series, joined)
        .ok_or_else(|| ScanError::UnknownTicker(series.ticker.clone()))?;

    let thresholds = HardThresholds::from_config(&config.screening);
    let criteria = [
        (ThresholdMetric::ClosePrice, thresholds.min_close_price, Some(snapshot.close)),
        (
            ThresholdMetric::AvgDollarVolume,
            thresholds.min_dollar_volume,
            snapshot.avg_dollar_volume,
        ),
        (ThresholdMetric::AdrPercent, thresholds.min_adr_percent, snapshot.adr_percent),
    ]
    .into_iter()
    .map(|(metric, minimum, value)| CriterionCheck {
        metric,
        minimum,
        value,
        passed: thresholds.check(metric, &snapshot),
    })
    .collect();

    let evaluations = ScreeningFilter::new(&config.screening).evaluate(&snapshot);

    let required = config.indicators.longest_gain_window();
    Ok(Inspection {
        ticker: series.ticker.clone(),
        bar_count: series.len(),
        insufficient_history: (series.len() < required).then_some(required),
        snapshot,
        profile,
        criteria,
        evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scanlab_core::data::MemoryStore;
    use scanlab_core::domain::PriceBar;

    fn history(ticker: &str, n: usize, close: f64) -> Vec<PriceBar> {
        let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n)
            .map(|i| PriceBar {
                ticker: ticker.into(),
                date: base + chrono::Duration::days(i as i64),
                open: close,
                high: close * 1.1,
                low: close * 0.99,
                close,
                volume: 200_000,
            })
            .collect()
    }

    #[test]
    fn passing_ticker_reports_all_pass() {
        let store = MemoryStore::new(
            history("UUUU", 250, 20.0),
            vec![TickerProfile::new("UUUU", "AMEX", "Stock")],
        );
        let inspection = inspect_ticker(&ScanConfig::default(), &store, "UUUU").unwrap();

        assert_eq!(inspection.bar_count, 250);
        assert_eq!(inspection.insufficient_history, None);
        assert!(inspection.passes_thresholds());
        assert!(inspection.passes_screening());

        let text = inspection.render();
        assert!(text.contains("--- Inspecting Ticker: UUUU ---"));
        assert!(text.contains("1. Min close price >= $3.00: PASS (Value: $20.00)"));
        assert!(text.contains("would be considered"));
    }

    #[test]
    fn short_history_is_flagged() {
        let store = MemoryStore::new(
            history("NEW", 30, 20.0),
            vec![TickerProfile::new("NEW", "NYSE", "Stock")],
        );
        let inspection = inspect_ticker(&ScanConfig::default(), &store, "NEW").unwrap();
        assert_eq!(inspection.insufficient_history, Some(126));
        assert!(inspection.render().contains("Required: 126 bars, found: 30"));
    }

    #[test]
    fn history_covering_every_gain_window_is_not_flagged() {
        let store = MemoryStore::new(
            history("MID", 150, 20.0),
            vec![TickerProfile::new("MID", "NYSE", "Stock")],
        );
        let inspection = inspect_ticker(&ScanConfig::default(), &store, "MID").unwrap();
        assert_eq!(inspection.insufficient_history, None);
        assert!(inspection.snapshot.gains.six_month.is_some());
        assert!(inspection.snapshot.ma200.is_none());
    }

    #[test]
    fn cheap_ticker_fails_price_check() {
        let store = MemoryStore::new(
            history("PENNY", 250, 1.0),
            vec![TickerProfile::new("PENNY", "NYSE", "Stock")],
        );
        let inspection = inspect_ticker(&ScanConfig::default(), &store, "PENNY").unwrap();
        let price = &inspection.criteria[0];
        assert_eq!(price.metric, ThresholdMetric::ClosePrice);
        assert!(!price.passed);
        assert!(!inspection.passes_screening());
        assert!(inspection.render().contains("would not be considered"));
    }

    #[test]
    fn missing_profile_noted() {
        let store = MemoryStore::new(history("ORPH", 250, 20.0), vec![]);
        let inspection = inspect_ticker(&ScanConfig::default(), &store, "ORPH").unwrap();
        assert!(inspection.profile.is_none());
        assert!(!inspection.passes_screening());
        assert!(inspection.render().contains("No profile registered"));
    }

    #[test]
    fn unknown_ticker_is_an_error() {
        let store = MemoryStore::default();
        assert!(matches!(
            inspect_ticker(&ScanConfig::default(), &store, "NOPE"),
            Err(ScanError::UnknownTicker(t)) if t == "NOPE"
        ));
    }
}
