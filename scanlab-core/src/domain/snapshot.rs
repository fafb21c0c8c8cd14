//! Derived per-ticker series and the latest-row snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::horizon::{Horizon, HorizonSet};
use super::profile::TickerProfile;

/// One bar plus every metric derived from the trailing history up to it.
///
/// Trailing statistics are `None` until the ticker has a full window of bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub dollar_volume: f64,
    pub daily_range_factor: f64,
    pub ma200: Option<f64>,
    pub avg_dollar_volume: Option<f64>,
    pub adr_percent: Option<f64>,
    pub gains: HorizonSet<Option<f64>>,
}

/// Date-ordered derived rows for a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub ticker: String,
    pub rows: Vec<DerivedRow>,
}

impl DerivedSeries {
    /// Most recent row, if the ticker has any bars.
    pub fn latest(&self) -> Option<&DerivedRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Latest derived row for a ticker joined with its profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: f64,
    /// Number of bars of history behind this row.
    pub bar_count: usize,
    pub dollar_volume: f64,
    pub ma200: Option<f64>,
    pub avg_dollar_volume: Option<f64>,
    pub adr_percent: Option<f64>,
    pub gains: HorizonSet<Option<f64>>,
    pub profile: TickerProfile,
}

impl Snapshot {
    /// Build from the latest row of `series`. Returns `None` for an empty series.
    pub fn from_series(series: &DerivedSeries, profile: TickerProfile) -> Option<Self> {
        let row = series.latest()?;
        Some(Self {
            ticker: series.ticker.clone(),
            date: row.date,
            close: row.close,
            bar_count: series.len(),
            dollar_volume: row.dollar_volume,
            ma200: row.ma200,
            avg_dollar_volume: row.avg_dollar_volume,
            adr_percent: row.adr_percent,
            gains: row.gains,
            profile,
        })
    }

    pub fn gain(&self, horizon: Horizon) -> Option<f64> {
        *self.gains.get(horizon)
    }
}

/// Result of joining derived series with ticker profiles.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSet {
    pub snapshots: Vec<Snapshot>,
    /// Tickers with bars but no profile; they cannot be exported and are skipped.
    pub missing_profiles: Vec<String>,
}

/// Extract the latest row per ticker and join it with its profile.
///
/// Output is ordered by ticker. Tickers without bars produce nothing.
pub fn build_snapshots(
    series: &BTreeMap<String, DerivedSeries>,
    profiles: &[TickerProfile],
) -> SnapshotSet {
    let by_ticker: HashMap<&str, &TickerProfile> =
        profiles.iter().map(|p| (p.ticker.as_str(), p)).collect();

    let mut set = SnapshotSet::default();
    for (ticker, s) in series {
        if s.is_empty() {
            continue;
        }
        match by_ticker.get(ticker.as_str()) {
            Some(profile) => {
                if let Some(snap) = Snapshot::from_series(s, (*profile).clone()) {
                    set.snapshots.push(snap);
                }
            }
            None => set.missing_profiles.push(ticker.clone()),
        }
    }
    set
}
