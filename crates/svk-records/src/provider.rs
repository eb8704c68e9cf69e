//! Producer boundary for scraped record batches.
//!
//! This module defines **only** the request/response shape and the trait,
//! plus a file-backed producer that replays a batch a scraper wrote to disk.
//! How an upstream source is fetched is out of scope; the pipeline depends on
//! `dyn Producer` alone.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};

use crate::csv_store;
use crate::record_set::RecordSet;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A window of calendar days to produce records for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProduceRequest {
    /// First day of the window (inclusive).
    pub start: NaiveDate,
    /// Number of days; `0` is an empty window.
    pub days: u32,
}

impl ProduceRequest {
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self { start, days }
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self::new(date, 1)
    }

    /// The `days`-long window ending on `today` (inclusive).
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let back = u64::from(days.saturating_sub(1));
        let start = today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        Self::new(start, days)
    }

    /// Last day of the window, or `None` for an empty window.
    pub fn end(&self) -> Option<NaiveDate> {
        if self.days == 0 {
            return None;
        }
        self.start
            .checked_add_days(Days::new(u64::from(self.days - 1)))
            .or(Some(NaiveDate::MAX))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.end() {
            Some(end) => date >= self.start && date <= end,
            None => false,
        }
    }
}

impl fmt::Display for ProduceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end() {
            Some(end) => write!(f, "{}..={} ({} days)", self.start, end, self.days),
            None => write!(f, "{} (empty window)", self.start),
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`Producer`] may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerError {
    /// The source could not be reached or opened.
    Unavailable(String),
    /// The source answered but its payload could not be decoded.
    Decode(String),
    /// The source rejected the request.
    Rejected(String),
}

impl fmt::Display for ProducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProducerError::Unavailable(msg) => write!(f, "producer unavailable: {msg}"),
            ProducerError::Decode(msg) => write!(f, "producer decode error: {msg}"),
            ProducerError::Rejected(msg) => write!(f, "producer rejected request: {msg}"),
        }
    }
}

impl std::error::Error for ProducerError {}

// ---------------------------------------------------------------------------
// Producer trait
// ---------------------------------------------------------------------------

/// Source of candidate records for a window of days.
///
/// Object-safe so the pipeline can hold a `&dyn Producer`.
pub trait Producer: Send + Sync {
    /// Short name for logs (e.g. `"csv-batch"`).
    fn name(&self) -> &'static str;

    /// Produce zero or more records for `req`.
    ///
    /// An empty set means "no new data" and is not an error. Rows may be
    /// duplicated or unordered; the merge resolves both.
    fn produce(&self, req: &ProduceRequest) -> Result<RecordSet, ProducerError>;
}

// ---------------------------------------------------------------------------
// CSV batch producer
// ---------------------------------------------------------------------------

/// Replays a scraped batch file, yielding the rows whose date falls in the
/// requested window. Rows with an unparseable date cannot be placed in any
/// window and are never yielded.
#[derive(Debug, Clone)]
pub struct CsvBatchProducer {
    path: PathBuf,
}

impl CsvBatchProducer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Producer for CsvBatchProducer {
    fn name(&self) -> &'static str {
        "csv-batch"
    }

    fn produce(&self, req: &ProduceRequest) -> Result<RecordSet, ProducerError> {
        if !self.path.exists() {
            return Err(ProducerError::Unavailable(format!(
                "batch file not found: {}",
                self.path.display()
            )));
        }
        let batch = csv_store::read_path(&self.path)
            .map_err(|e| ProducerError::Decode(e.to_string()))?;

        match req.end() {
            Some(end) => Ok(batch.filter_dates(req.start, end)),
            None => Ok(RecordSet::new(batch.columns().to_vec(), Vec::new())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn trailing_window_ends_today() {
        let req = ProduceRequest::trailing(d(2024, 3, 10), 3);
        assert_eq!(req.start, d(2024, 3, 8));
        assert_eq!(req.end(), Some(d(2024, 3, 10)));
        assert!(req.contains(d(2024, 3, 8)));
        assert!(!req.contains(d(2024, 3, 11)));
    }

    #[test]
    fn zero_day_window_contains_nothing() {
        let req = ProduceRequest::new(d(2024, 3, 10), 0);
        assert_eq!(req.end(), None);
        assert!(!req.contains(d(2024, 3, 10)));
        assert_eq!(req.to_string(), "2024-03-10 (empty window)");
    }

    #[test]
    fn display_window() {
        let req = ProduceRequest::single_day(d(2024, 1, 2));
        assert_eq!(req.to_string(), "2024-01-02..=2024-01-02 (1 days)");
    }

    #[test]
    fn csv_batch_filters_to_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(
            &path,
            "Date,Timme,Prognos (MW)\n2024-01-01,0,1\n2024-01-02,0,2\nbad,0,3\n2024-01-03,0,4\n",
        )
        .unwrap();

        let producer: Box<dyn Producer> = Box::new(CsvBatchProducer::new(&path));
        let out = producer
            .produce(&ProduceRequest::new(d(2024, 1, 2), 2))
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.records()[0].date, "2024-01-02");
        assert_eq!(out.records()[1].date, "2024-01-03");
    }

    #[test]
    fn csv_batch_missing_file_is_unavailable() {
        let producer = CsvBatchProducer::new("/definitely/not/here.csv");
        let err = producer
            .produce(&ProduceRequest::single_day(d(2024, 1, 1)))
            .unwrap_err();
        assert!(matches!(err, ProducerError::Unavailable(_)));
    }

    #[test]
    fn producer_error_display() {
        let e = ProducerError::Decode("bad header".to_string());
        assert_eq!(e.to_string(), "producer decode error: bad header");
    }
}
