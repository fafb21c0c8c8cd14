//! Percentile ranker: dynamic per-horizon momentum thresholds.
//!
//! For each horizon, the threshold is the configured quantile of that
//! horizon's gain over the screened set, ignoring snapshots where the gain is
//! undefined. A snapshot qualifies for a horizon if its gain is defined and
//! at or above the threshold. The result is the union over horizons,
//! deduplicated by ticker and ordered by 1-month gain descending.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::info;

use crate::config::RankingConfig;
use crate::domain::{Horizon, HorizonSet, Snapshot};

/// Quantile of `values` at level `q`, by linear interpolation between the
/// closest ranks (position `q * (n - 1)` in sorted order).
///
/// Returns `None` for an empty slice or a level outside `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        Some(sorted[lower])
    } else {
        let (lo, hi) = (sorted[lower], sorted[upper]);
        // Keep rounding from stepping outside the bracketing ranks.
        Some((lo + (hi - lo) * (pos - lower as f64)).max(lo).min(hi))
    }
}

/// A snapshot that made the watchlist, with the horizons it qualified on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub snapshot: Snapshot,
    pub qualified: Vec<Horizon>,
}

/// Ordered, deduplicated ranking output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub entries: Vec<RankedEntry>,
    /// Threshold per horizon; `None` when no snapshot had a defined gain.
    pub thresholds: HorizonSet<Option<f64>>,
    /// Number of qualifiers per horizon, before the union.
    pub qualifier_counts: HorizonSet<usize>,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tickers(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.snapshot.ticker.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct PercentileRanker {
    percentiles: HorizonSet<f64>,
}

impl PercentileRanker {
    pub fn new(config: &RankingConfig) -> Self {
        Self {
            percentiles: config.percentiles,
        }
    }

    /// Threshold per horizon over the defined gains in `snapshots`.
    pub fn thresholds(&self, snapshots: &[Snapshot]) -> HorizonSet<Option<f64>> {
        HorizonSet::from_fn(|h| {
            let defined: Vec<f64> = snapshots.iter().filter_map(|s| s.gain(h)).collect();
            quantile(&defined, *self.percentiles.get(h))
        })
    }

    /// Select and order the qualifiers.
    ///
    /// An empty input skips threshold computation and yields an empty result.
    pub fn rank(&self, snapshots: Vec<Snapshot>) -> RankedResult {
        if snapshots.is_empty() {
            info!("no screened snapshots; ranking skipped");
            return RankedResult::default();
        }

        let thresholds = self.thresholds(&snapshots);
        let mut qualifier_counts = HorizonSet::<usize>::default();
        let mut entries = Vec::new();

        let mut seen = HashSet::new();
        for snapshot in snapshots {
            if !seen.insert(snapshot.ticker.clone()) {
                continue;
            }
            let qualified: Vec<Horizon> = Horizon::ALL
                .into_iter()
                .filter(|&h| qualifies(snapshot.gain(h), *thresholds.get(h)))
                .collect();
            for &h in &qualified {
                *qualifier_counts.get_mut(h) += 1;
            }
            if !qualified.is_empty() {
                entries.push(RankedEntry {
                    snapshot,
                    qualified,
                });
            }
        }

        entries.sort_by(|a, b| compare_by_one_month_gain(&a.snapshot, &b.snapshot));

        for (h, t) in thresholds.iter() {
            if let Some(t) = t {
                info!(
                    horizon = %h,
                    threshold = *t,
                    qualifiers = *qualifier_counts.get(h),
                    "gain threshold"
                );
            }
        }
        info!(ranked = entries.len(), "ranking complete");

        RankedResult {
            entries,
            thresholds,
            qualifier_counts,
        }
    }
}

/// Defined gain at or above a defined threshold.
fn qualifies(gain: Option<f64>, threshold: Option<f64>) -> bool {
    match (gain, threshold) {
        (Some(g), Some(t)) => g >= t,
        _ => false,
    }
}

/// 1-month gain descending; undefined gains last; ties by ticker.
fn compare_by_one_month_gain(a: &Snapshot, b: &Snapshot) -> Ordering {
    let by_gain = match (a.gain(Horizon::OneMonth), b.gain(Horizon::OneMonth)) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_gain.then_with(|| a.ticker.cmp(&b.ticker))
}
