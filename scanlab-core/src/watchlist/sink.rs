//! Watchlist destinations.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("create watchlist dir {path}: {reason}")]
    CreateDir { path: String, reason: String },

    #[error("write watchlist {path}: {reason}")]
    Write { path: String, reason: String },
}

/// Receives a rendered watchlist.
pub trait WatchlistSink {
    /// Persist `contents` and return a description of where it went.
    fn write_watchlist(&mut self, contents: &str) -> Result<String, SinkError>;
}

/// Writes `TradingView_Watchlist_{YYYY-MM-DD}.txt` into a directory.
///
/// Writes are atomic: write to .tmp then rename.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    date: NaiveDate,
}

impl FileSink {
    /// Sink stamped with today's local date.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::for_date(dir, chrono::Local::now().date_naive())
    }

    pub fn for_date(dir: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            dir: dir.into(),
            date,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir
            .join(format!("TradingView_Watchlist_{}.txt", self.date.format("%Y-%m-%d")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl WatchlistSink for FileSink {
    fn write_watchlist(&mut self, contents: &str) -> Result<String, SinkError> {
        fs::create_dir_all(&self.dir).map_err(|e| SinkError::CreateDir {
            path: self.dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let path = self.path();
        let tmp_path = path.with_extension("txt.tmp");
        let write_err = |e: std::io::Error| SinkError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        fs::write(&tmp_path, contents).map_err(write_err)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            write_err(e)
        })?;

        Ok(path.display().to_string())
    }
}

/// Collects watchlists in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub written: Vec<String>,
}

impl WatchlistSink for MemorySink {
    fn write_watchlist(&mut self, contents: &str) -> Result<String, SinkError> {
        self.written.push(contents.to_string());
        Ok(format!("memory[{}]", self.written.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_names_file_by_date() {
        let sink = FileSink::for_date("out", NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(
            sink.path(),
            PathBuf::from("out").join("TradingView_Watchlist_2024-06-03.txt")
        );
    }

    #[test]
    fn file_sink_writes_contents() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::for_date(
            dir.path().join("lists"),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        );
        let location = sink.write_watchlist("###Stocks,NASDAQ:X").unwrap();
        assert_eq!(
            fs::read_to_string(&location).unwrap(),
            "###Stocks,NASDAQ:X"
        );
        assert!(!sink.path().with_extension("txt.tmp").exists());
    }

    #[test]
    fn memory_sink_collects() {
        let mut sink = MemorySink::default();
        sink.write_watchlist("a").unwrap();
        sink.write_watchlist("b").unwrap();
        assert_eq!(sink.written, vec!["a", "b"]);
    }
}
