//! svk-records
//!
//! Record model for the hourly grid time series.
//!
//! This crate owns:
//! - the `(date, hour)` identity key and its ordering
//! - the [`RecordSet`] table (header + rows, other columns pass through)
//! - last-write-wins [`merge`] of an existing set with a new batch
//! - the canonical CSV codec (`csv_store`)
//! - the producer boundary (`provider`)
//!
//! It does **not** log, validate quality, or rotate backups.

pub mod csv_store;
pub mod merge;
pub mod provider;
pub mod record;
pub mod record_set;

pub use merge::merge;
pub use provider::{CsvBatchProducer, ProduceRequest, Producer, ProducerError};
pub use record::{
    parse_date, parse_hour, parse_number, DateKey, HourKey, KeyPart, Record, RecordKey,
};
pub use record_set::RecordSet;

/// Header of the calendar-date column in the canonical store.
pub const DATE_COLUMN: &str = "Date";
/// Header of the hour-of-day column in the canonical store.
pub const HOUR_COLUMN: &str = "Timme";
/// Forecast measurement column (megawatts).
pub const FORECAST_COLUMN: &str = "Prognos (MW)";
/// Consumption measurement column (megawatts).
pub const CONSUMPTION_COLUMN: &str = "Förbrukning (MW)";
