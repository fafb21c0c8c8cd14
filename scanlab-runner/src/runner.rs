//! Scan runner: wires the store, the four pipeline stages and the sink.
//!
//! Two entry points:
//! - `run_scan()`: loads from a store, ranks, exports. Used by the CLI.
//! - `scan_universe()`: ranks pre-loaded data with no I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use scanlab_core::config::{ConfigError, ScanConfig};
use scanlab_core::data::{PriceStore, StoreError};
use scanlab_core::domain::{build_snapshots, HorizonSet};
use scanlab_core::indicators::IndicatorCalculator;
use scanlab_core::ranking::{PercentileRanker, RankedResult};
use scanlab_core::screening::{ScreenReport, ScreeningFilter};
use scanlab_core::watchlist::{ExportSummary, SinkError, WatchlistExporter, WatchlistSink};

use crate::data_loader::{load_universe, LoadedUniverse};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("watchlist error: {0}")]
    Sink(#[from] SinkError),
    #[error("no bars for ticker '{0}'")]
    UnknownTicker(String),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Compute per-ticker metrics on the rayon pool.
    pub parallel: bool,
}

/// Counts and fingerprints for one scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub tickers_loaded: usize,
    pub bars_loaded: usize,
    pub snapshots: usize,
    /// Tickers with bars but no profile; skipped.
    pub missing_profiles: Vec<String>,
    pub screening: ScreenReport,
    pub thresholds: HorizonSet<Option<f64>>,
    pub qualifier_counts: HorizonSet<usize>,
    pub ranked: usize,
    pub export: ExportSummary,
    pub dataset_hash: String,
    pub config_hash: String,
}

#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub result: RankedResult,
    pub summary: ScanSummary,
}

/// Load, compute, screen, rank and export.
///
/// A store failure aborts before anything is computed or written.
pub fn run_scan(
    config: &ScanConfig,
    store: &dyn PriceStore,
    sink: &mut dyn WatchlistSink,
    opts: &ScanOptions,
) -> Result<ScanOutput, ScanError> {
    config.validate()?;
    let loaded = load_universe(store)?;
    let mut output = scan_universe(config, &loaded, opts);

    output.summary.export = WatchlistExporter.export(&output.result, sink)?;
    info!(
        exported = output.summary.export.tickers_exported,
        dataset_hash = %output.summary.dataset_hash,
        "scan complete"
    );
    Ok(output)
}

/// Rank a pre-loaded universe. Pure: no I/O.
pub fn scan_universe(config: &ScanConfig, loaded: &LoadedUniverse, opts: &ScanOptions) -> ScanOutput {
    let calculator = IndicatorCalculator::new(&config.indicators);
    let series = calculator.compute_universe(&loaded.histories, opts.parallel);

    let snapshot_set = build_snapshots(&series, &loaded.profiles);
    if !snapshot_set.missing_profiles.is_empty() {
        warn!(
            count = snapshot_set.missing_profiles.len(),
            "tickers without a profile skipped"
        );
    }
    let snapshots = snapshot_set.snapshots.len();

    let outcome = ScreeningFilter::new(&config.screening).apply(snapshot_set.snapshots);
    let result = PercentileRanker::new(&config.ranking).rank(outcome.survivors);

    let summary = ScanSummary {
        tickers_loaded: loaded.histories.len(),
        bars_loaded: loaded.bar_count,
        snapshots,
        missing_profiles: snapshot_set.missing_profiles,
        screening: outcome.report,
        thresholds: result.thresholds,
        qualifier_counts: result.qualifier_counts,
        ranked: result.len(),
        export: ExportSummary::default(),
        dataset_hash: loaded.dataset_hash.clone(),
        config_hash: config.fingerprint(),
    };

    ScanOutput { result, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scanlab_core::data::MemoryStore;
    use scanlab_core::domain::{PriceBar, TickerProfile};
    use scanlab_core::watchlist::MemorySink;

    fn uptrend(ticker: &str, n: usize) -> Vec<PriceBar> {
        let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n)
            .map(|i| {
                let close = 20.0 + i as f64 * 0.1;
                PriceBar {
                    ticker: ticker.into(),
                    date: base + chrono::Duration::days(i as i64),
                    open: close,
                    high: close * 1.06,
                    low: close * 0.96,
                    close,
                    volume: 300_000,
                }
            })
            .collect()
    }

    struct FailingStore;

    impl PriceStore for FailingStore {
        fn load_all_bars(&self) -> Result<Vec<PriceBar>, StoreError> {
            Err(StoreError::MissingRoot("/nowhere".into()))
        }

        fn load_all_profiles(&self) -> Result<Vec<TickerProfile>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn scan_exports_survivors() {
        let mut bars = uptrend("AAA", 240);
        bars.extend(uptrend("BBB", 5));
        let store = MemoryStore::new(
            bars,
            vec![
                TickerProfile::new("AAA", "NASDAQ", "Stock"),
                TickerProfile::new("BBB", "NYSE", "Stock"),
            ],
        );
        let mut sink = MemorySink::default();

        let out = run_scan(&ScanConfig::default(), &store, &mut sink, &ScanOptions::default())
            .unwrap();

        assert_eq!(out.summary.tickers_loaded, 2);
        assert_eq!(out.summary.bars_loaded, 245);
        assert_eq!(out.summary.screening.excluded_by_thresholds, 1);
        assert_eq!(out.result.tickers(), vec!["AAA"]);
        assert_eq!(out.summary.export.tickers_exported, 1);
        assert_eq!(sink.written, vec!["###Stocks,NASDAQ:AAA"]);
        assert_eq!(out.summary.dataset_hash.len(), 64);
        assert_eq!(out.summary.config_hash, ScanConfig::default().fingerprint());
    }

    #[test]
    fn bars_loaded_counts_deduplicated_rows() {
        let mut bars = uptrend("AAA", 240);
        bars.extend(uptrend("AAA", 10));
        let store = MemoryStore::new(bars, vec![TickerProfile::new("AAA", "NASDAQ", "Stock")]);

        let out = run_scan(
            &ScanConfig::default(),
            &store,
            &mut MemorySink::default(),
            &ScanOptions::default(),
        )
        .unwrap();
        assert_eq!(out.summary.bars_loaded, 240);
    }

    #[test]
    fn store_failure_writes_nothing() {
        let mut sink = MemorySink::default();
        let result = run_scan(
            &ScanConfig::default(),
            &FailingStore,
            &mut sink,
            &ScanOptions::default(),
        );
        assert!(matches!(result, Err(ScanError::Store(_))));
        assert!(sink.written.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected_before_loading() {
        let mut config = ScanConfig::default();
        config.indicators.adr_window = 0;
        let mut sink = MemorySink::default();
        let result = run_scan(&config, &FailingStore, &mut sink, &ScanOptions::default());
        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    #[test]
    fn empty_store_is_empty_scan() {
        let mut sink = MemorySink::default();
        let out = run_scan(
            &ScanConfig::default(),
            &MemoryStore::default(),
            &mut sink,
            &ScanOptions::default(),
        )
        .unwrap();
        assert!(out.result.is_empty());
        assert_eq!(out.summary.export, ExportSummary::default());
        assert!(sink.written.is_empty());
    }

    #[test]
    fn missing_profiles_are_reported() {
        let store = MemoryStore::new(uptrend("LONER", 240), vec![]);
        let out = scan_universe(
            &ScanConfig::default(),
            &load_universe(&store).unwrap(),
            &ScanOptions { parallel: true },
        );
        assert_eq!(out.summary.missing_profiles, vec!["LONER"]);
        assert_eq!(out.summary.snapshots, 0);
    }
}
