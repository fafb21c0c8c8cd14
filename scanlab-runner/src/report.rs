//! Result tables and CSV export for ranked scans.
//!
//! Columns: ticker, close, adr_percent, avg_dollar_volume, gain_1m, gain_3m,
//! gain_6m, sector, industry. Undefined metrics render as `n/a` in the
//! table and as an empty cell in CSV.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use scanlab_core::domain::Horizon;
use scanlab_core::ranking::{RankedEntry, RankedResult};

use crate::runner::ScanSummary;

const COLUMNS: [&str; 9] = [
    "ticker",
    "close",
    "adr_percent",
    "avg_dollar_volume",
    "gain_1m",
    "gain_3m",
    "gain_6m",
    "sector",
    "industry",
];

const MISSING: &str = "n/a";

// ─── Number formatting ──────────────────────────────────────────────

/// Insert thousands separators into the integer part of a formatted number.
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `$1,234.57` style, with `decimals` fractional digits.
pub fn format_dollars(value: f64, decimals: usize) -> String {
    format!("${}", group_thousands(&format!("{value:.decimals$}")))
}

/// `12.34%`
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

fn opt(value: Option<f64>, f: impl Fn(f64) -> String) -> String {
    match value {
        Some(v) => f(v),
        None => MISSING.to_string(),
    }
}

// ─── Table ──────────────────────────────────────────────────────────

fn table_row(entry: &RankedEntry) -> [String; 9] {
    let s = &entry.snapshot;
    [
        s.ticker.clone(),
        format_dollars(s.close, 2),
        opt(s.adr_percent, format_percent),
        opt(s.avg_dollar_volume, |v| format_dollars(v, 0)),
        opt(s.gain(Horizon::OneMonth), format_percent),
        opt(s.gain(Horizon::ThreeMonth), format_percent),
        opt(s.gain(Horizon::SixMonth), format_percent),
        s.profile.sector.clone().unwrap_or_else(|| MISSING.into()),
        s.profile.industry.clone().unwrap_or_else(|| MISSING.into()),
    ]
}

/// Render the ranked set as a fixed-width text table.
pub fn format_table(result: &RankedResult) -> String {
    let rows: Vec<[String; 9]> = result.entries.iter().map(table_row).collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = COLUMNS
        .iter()
        .zip(widths.iter())
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").trim_end());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(i, (cell, &w))| {
                // Text columns left-aligned, numbers right-aligned.
                if i == 0 || i >= 7 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join("  ").trim_end());
    }

    out
}

/// Multi-line run summary for the terminal.
pub fn format_summary(summary: &ScanSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Loaded {} tickers ({} bars), {} snapshots",
        summary.tickers_loaded, summary.bars_loaded, summary.snapshots
    );
    if !summary.missing_profiles.is_empty() {
        let _ = writeln!(
            out,
            "Skipped {} tickers without a profile",
            summary.missing_profiles.len()
        );
    }
    let s = &summary.screening;
    let _ = writeln!(
        out,
        "Screening: {} in, {} passed thresholds, {} excluded by policy, {} survivors",
        s.input,
        s.passed_thresholds(),
        s.excluded_by_policy,
        s.survivors
    );
    for (h, t) in summary.thresholds.iter() {
        let _ = writeln!(
            out,
            "  {h} threshold: {} ({} qualifiers)",
            opt(*t, format_percent),
            summary.qualifier_counts.get(h)
        );
    }
    let _ = writeln!(out, "Ranked: {}", summary.ranked);
    match &summary.export.location {
        Some(location) => {
            let _ = writeln!(
                out,
                "Exported {} tickers in {} groups to {location}",
                summary.export.tickers_exported, summary.export.groups
            );
        }
        None => {
            let _ = writeln!(out, "No tickers to export");
        }
    }
    let _ = writeln!(out, "Dataset hash: {}", summary.dataset_hash);
    let _ = write!(out, "Config hash:  {}", summary.config_hash);
    out
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a run summary to pretty JSON.
pub fn export_summary_json(summary: &ScanSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize ScanSummary to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

fn csv_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => String::new(),
    }
}

/// Export the ranked set as CSV with unformatted numbers.
pub fn export_csv(result: &RankedResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(COLUMNS)?;

    for entry in &result.entries {
        let s = &entry.snapshot;
        let record = [
            s.ticker.clone(),
            format!("{:.2}", s.close),
            csv_number(s.adr_percent, 2),
            csv_number(s.avg_dollar_volume, 0),
            csv_number(s.gain(Horizon::OneMonth), 2),
            csv_number(s.gain(Horizon::ThreeMonth), 2),
            csv_number(s.gain(Horizon::SixMonth), 2),
            s.profile.sector.clone().unwrap_or_default(),
            s.profile.industry.clone().unwrap_or_default(),
        ];
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write the CSV export to `path`, creating parent directories.
pub fn write_csv(result: &RankedResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let csv = export_csv(result)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}
