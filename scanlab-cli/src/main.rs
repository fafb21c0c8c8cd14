//! ScanLab CLI: scan, inspect, audit, and store management commands.
//!
//! Commands:
//! - `scan`: screen the stored universe and export the watchlist
//! - `inspect`: explain the metrics and verdicts for one ticker
//! - `audit`: list tickers whose stored history looks truncated
//! - `config`: print the effective scan configuration as TOML
//! - `store status`: report ticker count, bar counts, date ranges
//! - `store synth`: write a deterministic synthetic universe
//! - `store repair`: quarantine unreadable Parquet files

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use scanlab_core::config::ScanConfig;
use scanlab_core::data::{HistoryAudit, ParquetStore, PriceStore};
use scanlab_core::indicators::group_by_ticker;
use scanlab_core::watchlist::FileSink;
use scanlab_runner::{
    export_summary_json, format_summary, format_table, generate_synthetic_universe,
    inspect_ticker, run_scan, write_csv, ScanOptions, SyntheticSpec,
};

#[derive(Parser)]
#[command(
    name = "scanlab",
    about = "ScanLab CLI: momentum breakout screener and watchlist exporter"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen the stored universe and export a grouped watchlist.
    Scan {
        /// Path to a TOML scan config. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Price store directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,

        /// Directory for the watchlist file.
        #[arg(long, default_value = "watchlists")]
        output_dir: PathBuf,

        /// Date stamped into the watchlist filename (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Also write the ranked table as CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Compute per-ticker metrics in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Print the run summary as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show metrics and pass/fail verdicts for a single ticker.
    Inspect {
        /// Ticker to inspect.
        ticker: String,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = "data")]
        store_dir: PathBuf,
    },
    /// Flag tickers that are old enough but have too few stored bars.
    Audit {
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,

        /// Minimum bar count for an established ticker.
        #[arg(long, default_value_t = 220)]
        min_records: usize,

        /// Tickers whose first bar is newer than this are not audited.
        #[arg(long, default_value_t = 60)]
        min_age_days: i64,

        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Where to write the flagged ticker list.
        #[arg(long, default_value = "tickers_to_fix.txt")]
        output: PathBuf,
    },
    /// Print the effective scan configuration as TOML.
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Price store management commands.
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Report ticker count, bar counts and date ranges.
    Status {
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,
    },
    /// Quarantine unreadable Parquet files so the store loads again.
    Repair {
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,
    },
    /// Write a deterministic synthetic universe into the store.
    Synth {
        #[arg(long, default_value = "data")]
        store_dir: PathBuf,

        /// Number of tickers to generate.
        #[arg(long, default_value_t = 50)]
        tickers: usize,

        /// Start date (YYYY-MM-DD). Defaults to two years ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            config,
            store_dir,
            output_dir,
            date,
            csv,
            parallel,
            json,
        } => run_scan_cmd(config, store_dir, output_dir, date, csv, parallel, json),
        Commands::Inspect {
            ticker,
            config,
            store_dir,
        } => run_inspect(&ticker, config, &store_dir),
        Commands::Audit {
            store_dir,
            min_records,
            min_age_days,
            as_of,
            output,
        } => run_audit(&store_dir, min_records, min_age_days, as_of, &output),
        Commands::Config { config } => {
            print!("{}", load_config(config.as_deref())?.to_toml()?);
            Ok(())
        }
        Commands::Store { action } => match action {
            StoreAction::Status { store_dir } => run_store_status(&store_dir),
            StoreAction::Repair { store_dir } => run_store_repair(&store_dir),
            StoreAction::Synth {
                store_dir,
                tickers,
                start,
                end,
            } => run_store_synth(&store_dir, tickers, start, end),
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(p) => ScanConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn parse_date(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("--{flag} must be YYYY-MM-DD, got '{s}'"))
        })
        .transpose()
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn run_scan_cmd(
    config_path: Option<PathBuf>,
    store_dir: PathBuf,
    output_dir: PathBuf,
    date: Option<String>,
    csv: Option<PathBuf>,
    parallel: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let date = parse_date(date.as_deref(), "date")?.unwrap_or_else(today);

    let store = ParquetStore::new(&store_dir);
    let mut sink = FileSink::for_date(&output_dir, date);
    let output = run_scan(&config, &store, &mut sink, &ScanOptions { parallel })?;

    if json {
        println!("{}", export_summary_json(&output.summary)?);
    } else {
        if !output.result.is_empty() {
            print!("{}", format_table(&output.result));
            println!();
        }
        println!("{}", format_summary(&output.summary));
    }

    if let Some(path) = csv {
        write_csv(&output.result, &path)?;
        info!(path = %path.display(), rows = output.result.len(), "CSV written");
    }

    Ok(())
}

fn run_inspect(ticker: &str, config_path: Option<PathBuf>, store_dir: &Path) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let store = ParquetStore::new(store_dir);
    let inspection = inspect_ticker(&config, &store, ticker)?;
    println!("{}", inspection.render());
    Ok(())
}

fn run_audit(
    store_dir: &Path,
    min_records: usize,
    min_age_days: i64,
    as_of: Option<String>,
    output: &Path,
) -> Result<()> {
    if min_age_days < 0 {
        bail!("--min-age-days must be non-negative");
    }
    let reference = parse_date(as_of.as_deref(), "as-of")?.unwrap_or_else(today);

    let store = ParquetStore::new(store_dir);
    let histories = group_by_ticker(store.load_all_bars()?);
    if histories.is_empty() {
        println!("No data found in {} to audit.", store_dir.display());
        return Ok(());
    }

    let audit = HistoryAudit {
        min_records,
        min_age_days,
    };
    let report = audit.run(&histories, reference);

    if report.flagged.is_empty() {
        println!("Audit complete. No tickers with incomplete data found.");
        return Ok(());
    }

    for finding in &report.flagged {
        println!(
            "  -> Flagged {}: first data from {}, but only {} records.",
            finding.ticker, finding.first_date, finding.bar_count
        );
    }
    std::fs::write(output, report.ticker_list())
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "\nAudit complete. {} of {} tickers flagged; list saved to {}",
        report.flagged.len(),
        report.audited,
        output.display()
    );
    Ok(())
}

fn run_store_status(store_dir: &Path) -> Result<()> {
    if !store_dir.exists() {
        println!("Store directory does not exist: {}", store_dir.display());
        return Ok(());
    }

    let store = ParquetStore::new(store_dir);
    let rows = store.status()?;
    let profiles = store.load_all_profiles()?;
    if rows.is_empty() {
        println!("Store is empty: {}", store_dir.display());
        return Ok(());
    }

    let total_bars: usize = rows.iter().filter_map(|r| r.bar_count).sum();
    println!("Store: {}", store_dir.display());
    println!("Tickers: {} ({} with profiles)", rows.len(), profiles.len());
    println!("Bars: {total_bars}");
    println!();
    println!("{:<8} {:<25} {:>8}", "Ticker", "Date Range", "Bars");
    println!("{}", "-".repeat(43));
    for row in &rows {
        let range = match (row.start_date, row.end_date) {
            (Some(start), Some(end)) => format!("{start} to {end}"),
            _ => "(no meta)".to_string(),
        };
        let bars = row
            .bar_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".into());
        println!("{:<8} {:<25} {:>8}", row.ticker, range, bars);
    }

    Ok(())
}

fn run_store_repair(store_dir: &Path) -> Result<()> {
    let store = ParquetStore::new(store_dir);
    let quarantined = store.repair()?;
    if quarantined.is_empty() {
        println!("No corrupt files found in {}", store_dir.display());
        return Ok(());
    }
    for path in &quarantined {
        println!("  -> Quarantined {}", path.display());
    }
    println!(
        "\n{} file(s) quarantined. Re-ingest the affected tickers before scanning.",
        quarantined.len()
    );
    Ok(())
}

fn run_store_synth(
    store_dir: &Path,
    tickers: usize,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    if tickers == 0 {
        bail!("--tickers must be at least 1");
    }
    let end = parse_date(end.as_deref(), "end")?.unwrap_or_else(today);
    let start =
        parse_date(start.as_deref(), "start")?.unwrap_or(end - chrono::Duration::days(730));
    if start > end {
        bail!("--start ({start}) is after --end ({end})");
    }

    let spec = SyntheticSpec {
        tickers,
        start,
        end,
    };
    let (bars, profiles) = generate_synthetic_universe(&spec);

    let store = ParquetStore::new(store_dir);
    let grouped = group_by_ticker(bars);
    for (ticker, history) in &grouped {
        store.write_bars(ticker, history)?;
    }
    store.write_profiles(&profiles)?;

    let total: usize = grouped.values().map(|h| h.len()).sum();
    println!(
        "Wrote {} synthetic tickers ({total} bars) to {}",
        grouped.len(),
        store_dir.display()
    );
    Ok(())
}
