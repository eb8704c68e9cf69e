//! A single hourly observation and its identity key.
//!
//! Cells are kept as the source text. Typed views (`parsed_date`,
//! `parsed_hour`, `numeric`) coerce on demand so that unparseable input stays
//! visible to the quality checks instead of being dropped at load time.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::{CONSUMPTION_COLUMN, DATE_COLUMN, FORECAST_COLUMN, HOUR_COLUMN};

// ---------------------------------------------------------------------------
// Identity key
// ---------------------------------------------------------------------------

/// One component of a [`RecordKey`].
///
/// Well-formed cells compare by their parsed value; anything else keeps its
/// trimmed source text. `Parsed` sorts before `Raw`, so sorting is total even
/// when a batch carries garbage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyPart<T> {
    Parsed(T),
    Raw(String),
}

impl<T: fmt::Display> fmt::Display for KeyPart<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Parsed(v) => write!(f, "{v}"),
            KeyPart::Raw(s) => write!(f, "{s:?}"),
        }
    }
}

pub type DateKey = KeyPart<NaiveDate>;
pub type HourKey = KeyPart<u32>;

/// The `(date, hour)` identity of a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub date: DateKey,
    pub hour: HourKey,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.date, self.hour)
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Parse a `Date` cell.
///
/// Accepts `YYYY-MM-DD` and `YYYY/MM/DD`, optionally followed by a time
/// component (`2024-01-01 00:00:00`, `2024-01-01T00:00`), which is ignored.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let head = s.split([' ', 'T']).next().unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%Y/%m/%d"))
        .ok()
}

/// Parse a `Timme` cell into an hour slot.
///
/// Accepts `5`, `05`, `5.0` and the leading hour of `05:00` or `05-06`.
/// The range is not checked here; hours above 23 are an anomaly reported by
/// the continuity checks, not a parse failure.
pub fn parse_hour(s: &str) -> Option<u32> {
    let s = s.trim();
    let head = s.split([':', '-']).next().unwrap_or(s).trim();
    if head.is_empty() {
        return None;
    }
    if let Ok(h) = head.parse::<u32>() {
        return Some(h);
    }
    // Float-typed exports write whole hours as "5.0".
    let f: f64 = head.parse().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}

/// Coerce a measurement cell to a finite number.
///
/// Empty, non-numeric, `NaN` and infinite cells all yield `None`.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let v: f64 = s.parse().ok()?;
    v.is_finite().then_some(v)
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One observation row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// `Date` cell as read from the source.
    pub date: String,
    /// `Timme` cell as read from the source.
    pub hour: String,
    /// Every other column by header name. An absent or blank entry is null.
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(date: impl Into<String>, hour: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            hour: hour.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a cell by header name. `Date` and `Timme` go to the key cells.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match column.as_str() {
            DATE_COLUMN => self.date = value,
            HOUR_COLUMN => self.hour = value,
            _ => {
                self.fields.insert(column, value);
            }
        }
    }

    /// Identity key used for deduplication and ordering.
    pub fn key(&self) -> RecordKey {
        let date = match parse_date(&self.date) {
            Some(d) => KeyPart::Parsed(d),
            None => KeyPart::Raw(self.date.trim().to_string()),
        };
        let hour = match parse_hour(&self.hour) {
            Some(h) => KeyPart::Parsed(h),
            None => KeyPart::Raw(self.hour.trim().to_string()),
        };
        RecordKey { date, hour }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    pub fn parsed_hour(&self) -> Option<u32> {
        parse_hour(&self.hour)
    }

    /// Raw cell for `column`, or `None` when the cell is null (absent or blank).
    pub fn cell(&self, column: &str) -> Option<&str> {
        let raw = match column {
            DATE_COLUMN => self.date.as_str(),
            HOUR_COLUMN => self.hour.as_str(),
            _ => self.fields.get(column).map(String::as_str)?,
        };
        if raw.trim().is_empty() {
            None
        } else {
            Some(raw)
        }
    }

    /// Numeric view of `column`; `None` for null or unparseable cells.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.cell(column).and_then(parse_number)
    }

    pub fn forecast_mw(&self) -> Option<f64> {
        self.numeric(FORECAST_COLUMN)
    }

    pub fn consumption_mw(&self) -> Option<f64> {
        self.numeric(CONSUMPTION_COLUMN)
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
    fn parse_date_variants() {
        assert_eq!(parse_date("2024-01-02"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date(" 2024/01/02 "), Some(d(2024, 1, 2)));
        assert_eq!(parse_date("2024-01-02 00:00:00"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date("2024-01-02T13:00"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date("02.01.2024"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn parse_hour_variants() {
        assert_eq!(parse_hour("5"), Some(5));
        assert_eq!(parse_hour("05"), Some(5));
        assert_eq!(parse_hour("5.0"), Some(5));
        assert_eq!(parse_hour("05:00"), Some(5));
        assert_eq!(parse_hour("05-06"), Some(5));
        assert_eq!(parse_hour("24"), Some(24));
        assert_eq!(parse_hour("5.5"), None);
        assert_eq!(parse_hour("x"), None);
        assert_eq!(parse_hour("-1"), None);
        assert_eq!(parse_hour(" "), None);
    }

    #[test]
    fn parse_number_rejects_non_finite() {
        assert_eq!(parse_number("1234.5"), Some(1234.5));
        assert_eq!(parse_number(" -5 "), Some(-5.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("12 MW"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn key_normalizes_equivalent_cells() {
        let a = Record::new("2024-01-01", "5");
        let b = Record::new("2024-01-01 00:00:00", "05");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn unparseable_key_parts_sort_after_parsed() {
        let good = Record::new("2024-01-01", "0").key();
        let bad_date = Record::new("garbage", "0").key();
        let bad_hour = Record::new("2024-01-01", "n/a").key();
        assert!(good < bad_hour);
        assert!(bad_hour < bad_date);
    }

    #[test]
    fn key_display() {
        let k = Record::new("2024-01-01", "7").key();
        assert_eq!(k.to_string(), "(2024-01-01, 7)");
        let raw = Record::new("soon", "7").key();
        assert_eq!(raw.to_string(), "(\"soon\", 7)");
    }

    #[test]
    fn cell_treats_blank_as_null() {
        let r = Record::new("2024-01-01", " ")
            .with_field(FORECAST_COLUMN, "")
            .with_field(CONSUMPTION_COLUMN, "17000");
        assert_eq!(r.cell(HOUR_COLUMN), None);
        assert_eq!(r.cell(FORECAST_COLUMN), None);
        assert_eq!(r.cell("Område"), None);
        assert_eq!(r.consumption_mw(), Some(17000.0));
        assert_eq!(r.forecast_mw(), None);
    }

    #[test]
    fn set_routes_key_columns() {
        let mut r = Record::new("", "");
        r.set(DATE_COLUMN, "2024-03-01");
        r.set(HOUR_COLUMN, "3");
        r.set("Område", "SE3");
        assert_eq!(r.date, "2024-03-01");
        assert_eq!(r.hour, "3");
        assert_eq!(r.fields.get("Område").map(String::as_str), Some("SE3"));
        assert!(!r.fields.contains_key(DATE_COLUMN));
    }
}
