//! Shared fixtures for unit and scenario tests.
//!
//! Builders produce canonical hourly record sets with plausible MW values;
//! the `without_*` helpers punch holes into them. `producers` has in-memory
//! [`Producer`] implementations for driving the ingest pipeline.
//!
//! [`Producer`]: svk_records::Producer

pub mod producers;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use svk_records::{csv_store, Record, RecordSet, CONSUMPTION_COLUMN, FORECAST_COLUMN};

pub use producers::{FailingProducer, RecordingProducer, StaticProducer};

/// `NaiveDate` from literal parts. Panics on an invalid date.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(|| panic!("invalid test date {y}-{m}-{d}"))
}

/// One record for `day` at `hour`, with forecast and consumption values that
/// vary by hour and stay well inside the plausible MW range.
pub fn hourly_record(day: NaiveDate, hour: u32) -> Record {
    let forecast = 14_000 + hour * 150;
    let consumption = forecast - 120 + (hour % 5) * 40;
    Record::new(day.format("%Y-%m-%d").to_string(), hour.to_string())
        .with_field(FORECAST_COLUMN, forecast.to_string())
        .with_field(CONSUMPTION_COLUMN, consumption.to_string())
}

/// 24 records per day for `days` consecutive days starting at `start`.
pub fn hourly_days(start: NaiveDate, days: u32) -> RecordSet {
    let mut rows = Vec::with_capacity(days as usize * 24);
    for offset in 0..days {
        let day = start + Days::new(u64::from(offset));
        rows.extend((0..24).map(|h| hourly_record(day, h)));
    }
    RecordSet::from_records(rows)
}

/// Full hourly coverage of `[today - days_back, today]`.
pub fn trailing_window(today: NaiveDate, days_back: u32) -> RecordSet {
    hourly_days(today - Days::new(u64::from(days_back)), days_back + 1)
}

/// Copy of `set` with every row for `day` removed.
pub fn without_date(set: &RecordSet, day: NaiveDate) -> RecordSet {
    retain(set, |r| r.parsed_date() != Some(day))
}

/// Copy of `set` with the given hours of `day` removed.
pub fn without_hours(set: &RecordSet, day: NaiveDate, hours: &[u32]) -> RecordSet {
    retain(set, |r| {
        !(r.parsed_date() == Some(day) && r.parsed_hour().is_some_and(|h| hours.contains(&h)))
    })
}

/// Copy of `set` with `column` overwritten to `value` on every row of `day`.
pub fn with_values(set: &RecordSet, day: NaiveDate, column: &str, value: &str) -> RecordSet {
    let records = set
        .iter()
        .map(|r| {
            if r.parsed_date() == Some(day) {
                r.clone().with_field(column, value)
            } else {
                r.clone()
            }
        })
        .collect();
    RecordSet::new(set.columns().to_vec(), records)
}

fn retain(set: &RecordSet, keep: impl Fn(&Record) -> bool) -> RecordSet {
    let records = set.iter().filter(|r| keep(r)).cloned().collect();
    RecordSet::new(set.columns().to_vec(), records)
}

/// Write `set` as a CSV file named `name` under `dir`.
pub fn write_csv_fixture(dir: &Path, name: &str, set: &RecordSet) -> Result<PathBuf> {
    let path = dir.join(name);
    csv_store::write_path(&path, set)
        .with_context(|| format!("write csv fixture: {}", path.display()))?;
    Ok(path)
}

/// A scratch data directory that is removed on drop.
pub fn scratch_dir() -> Result<tempfile::TempDir> {
    tempfile::tempdir().context("create scratch dir")
}
