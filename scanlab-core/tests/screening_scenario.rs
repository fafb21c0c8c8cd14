//! End-to-end scenarios over the core pipeline:
//! bars → derived series → snapshots → screening → ranking → watchlist.

use chrono::NaiveDate;
use scanlab_core::config::ScanConfig;
use scanlab_core::domain::{build_snapshots, PriceBar, TickerProfile};
use scanlab_core::indicators::{group_by_ticker, IndicatorCalculator};
use scanlab_core::ranking::{PercentileRanker, RankedResult};
use scanlab_core::screening::ScreeningFilter;
use scanlab_core::watchlist::{MemorySink, WatchlistExporter};

/// Steady uptrend with a wide daily range and ~$5M traded per day at the end.
fn trending_history(ticker: &str, n: usize) -> Vec<PriceBar> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 40.0 + 10.0 * i as f64 / (n - 1) as f64;
            PriceBar {
                ticker: ticker.to_string(),
                date: base + chrono::Duration::days(i as i64),
                open: close,
                high: close * 1.05,
                low: close * 0.96,
                close,
                volume: 100_000,
            }
        })
        .collect()
}

struct Pipeline {
    ranked: RankedResult,
    input: usize,
    excluded_by_thresholds: usize,
    excluded_by_policy: usize,
    missing_profiles: Vec<String>,
}

fn run(config: &ScanConfig, bars: Vec<PriceBar>, profiles: &[TickerProfile]) -> Pipeline {
    let universe = group_by_ticker(bars);
    let series = IndicatorCalculator::new(&config.indicators).compute_universe(&universe, false);
    let snapshots = build_snapshots(&series, profiles);
    let outcome = ScreeningFilter::new(&config.screening).apply(snapshots.snapshots);
    let ranked = PercentileRanker::new(&config.ranking).rank(outcome.survivors);
    Pipeline {
        ranked,
        input: outcome.report.input,
        excluded_by_thresholds: outcome.report.excluded_by_thresholds,
        excluded_by_policy: outcome.report.excluded_by_policy,
        missing_profiles: snapshots.missing_profiles,
    }
}

#[test]
fn established_trender_passes_new_issue_fails_thresholds() {
    let config = ScanConfig::default();
    let mut bars = trending_history("A", 220);
    bars.extend(trending_history("B", 10));
    let profiles = vec![
        TickerProfile::new("A", "NASDAQ", "Stock").with_sector("Technology"),
        TickerProfile::new("B", "NYSE", "Stock").with_sector("Technology"),
    ];

    let result = run(&config, bars, &profiles);

    assert_eq!(result.input, 2);
    assert_eq!(result.excluded_by_thresholds, 1);
    assert_eq!(result.excluded_by_policy, 0);
    assert_eq!(result.ranked.tickers(), vec!["A"]);

    let a = &result.ranked.entries[0].snapshot;
    assert_eq!(a.close, 50.0);
    assert!(a.ma200.unwrap() < a.close);
    assert!(a.avg_dollar_volume.unwrap() >= 3_000_000.0);
    assert!((a.adr_percent.unwrap() - 9.375).abs() < 1e-6);
    assert!(a.gain(scanlab_core::domain::Horizon::OneMonth).unwrap() > 0.0);
}

#[test]
fn excluded_industry_counts_as_policy() {
    let config = ScanConfig::default();
    let mut bars = trending_history("BIO", 220);
    bars.extend(trending_history("SEMI", 220));
    let profiles = vec![
        TickerProfile::new("BIO", "NASDAQ", "Stock").with_industry("Biotechnology"),
        TickerProfile::new("SEMI", "NASDAQ", "Stock").with_industry("Semiconductors"),
    ];

    let result = run(&config, bars, &profiles);
    assert_eq!(result.excluded_by_thresholds, 0);
    assert_eq!(result.excluded_by_policy, 1);
    assert_eq!(result.ranked.tickers(), vec!["SEMI"]);
}

#[test]
fn ticker_without_profile_is_skipped() {
    let config = ScanConfig::default();
    let result = run(
        &config,
        trending_history("ORPHAN", 220),
        &[TickerProfile::new("OTHER", "NYSE", "Stock")],
    );
    assert_eq!(result.missing_profiles, vec!["ORPHAN"]);
    assert_eq!(result.input, 0);
    assert!(result.ranked.is_empty());
}

#[test]
fn nothing_passing_exports_nothing() {
    let config = ScanConfig::default();
    let result = run(
        &config,
        trending_history("TINY", 15),
        &[TickerProfile::new("TINY", "NYSE", "Stock")],
    );
    assert!(result.ranked.is_empty());

    let mut sink = MemorySink::default();
    let summary = WatchlistExporter.export(&result.ranked, &mut sink).unwrap();
    assert_eq!(summary.tickers_exported, 0);
    assert!(sink.written.is_empty());
}

#[test]
fn mixed_asset_classes_export_grouped() {
    let config = ScanConfig::from_toml(
        r#"
[ranking]
percentiles = { one_month = 0.0, three_month = 0.0, six_month = 0.0 }
"#,
    )
    .unwrap();

    // X climbs faster than Y so it ranks first.
    let mut bars = trending_history("X", 220);
    for bar in &mut bars {
        bar.close *= 1.0 + (bar.date - NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()).num_days() as f64 / 1000.0;
        bar.high = bar.close * 1.05;
        bar.low = bar.close * 0.96;
    }
    bars.extend(trending_history("Y", 220));
    let profiles = vec![
        TickerProfile::new("X", "NASDAQ", "Stock"),
        TickerProfile::new("Y", "AMEX", "Fund"),
    ];

    let result = run(&config, bars, &profiles);
    assert_eq!(result.ranked.tickers(), vec!["X", "Y"]);

    let mut sink = MemorySink::default();
    let summary = WatchlistExporter.export(&result.ranked, &mut sink).unwrap();
    assert_eq!(summary.tickers_exported, 2);
    assert_eq!(sink.written, vec!["###Stocks,NASDAQ:X,###Funds,AMEX:Y"]);
}
