//! History audit: find tickers whose stored history looks truncated.
//!
//! A ticker is flagged when its first bar is older than `min_age_days`
//! (so it is not a recent listing) yet it has fewer than `min_records` bars.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::domain::PriceBar;

pub const DEFAULT_MIN_RECORDS: usize = 220;
pub const DEFAULT_MIN_AGE_DAYS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryAudit {
    pub min_records: usize,
    pub min_age_days: i64,
}

impl Default for HistoryAudit {
    fn default() -> Self {
        Self {
            min_records: DEFAULT_MIN_RECORDS,
            min_age_days: DEFAULT_MIN_AGE_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub ticker: String,
    pub first_date: NaiveDate,
    pub bar_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub audited: usize,
    pub flagged: Vec<AuditFinding>,
}

impl AuditReport {
    /// Newline-terminated ticker list, one per line.
    pub fn ticker_list(&self) -> String {
        self.flagged
            .iter()
            .map(|f| format!("{}\n", f.ticker))
            .collect()
    }
}

impl HistoryAudit {
    /// Audit per-ticker histories against `reference` (usually today).
    pub fn run(&self, histories: &BTreeMap<String, Vec<PriceBar>>, reference: NaiveDate) -> AuditReport {
        let mut report = AuditReport {
            audited: histories.len(),
            flagged: Vec::new(),
        };

        for (ticker, bars) in histories {
            let Some(first_date) = bars.iter().map(|b| b.date).min() else {
                continue;
            };
            let age_days = (reference - first_date).num_days();
            if age_days > self.min_age_days && bars.len() < self.min_records {
                info!(ticker = %ticker, %first_date, bars = bars.len(), "incomplete history");
                report.flagged.push(AuditFinding {
                    ticker: ticker.clone(),
                    first_date,
                    bar_count: bars.len(),
                });
            }
        }

        info!(audited = report.audited, flagged = report.flagged.len(), "history audit complete");
        report
    }
}
