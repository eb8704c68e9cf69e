//! Calendar and intra-day continuity.
//!
//! Two views of "is anything missing":
//! - across days: every calendar date between the first and last observed
//!   date should carry at least one record ([`missing_dates`])
//! - within a day: every date should carry `expected_hours_per_day` records
//!   ([`incomplete_days`], with the opposite case in [`overfull_days`])
//!
//! Rows whose `Date` does not parse are left out of both computations and
//! counted by [`unparseable_dates`] instead.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use svk_records::RecordSet;

/// Most distinct raw values kept as samples in [`UnparseableDates`].
pub const UNPARSEABLE_SAMPLE_LIMIT: usize = 20;

/// A date with fewer records than expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteDay {
    pub date: NaiveDate,
    pub hours_found: usize,
    pub hours_missing: usize,
}

/// A date with more records than expected (DST fold or an identity-key
/// violation upstream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverfullDay {
    pub date: NaiveDate,
    pub hours_found: usize,
    pub hours_extra: usize,
}

/// Rows whose non-empty `Date` cell could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnparseableDates {
    pub count: usize,
    /// Up to [`UNPARSEABLE_SAMPLE_LIMIT`] distinct raw values, sorted.
    pub samples: Vec<String>,
}

/// Calendar dates in `[min_date, max_date]` with no record at all, ascending.
pub fn missing_dates(set: &RecordSet) -> Vec<NaiveDate> {
    let present = set.dates();
    let (Some(&first), Some(&last)) = (present.first(), present.last()) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| !present.contains(d))
        .collect()
}

fn rows_per_date(set: &RecordSet) -> BTreeMap<NaiveDate, usize> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in set.iter().filter_map(|r| r.parsed_date()) {
        *counts.entry(date).or_insert(0) += 1;
    }
    counts
}

/// Dates with strictly fewer than `expected_hours_per_day` records.
pub fn incomplete_days(set: &RecordSet, expected_hours_per_day: u32) -> Vec<IncompleteDay> {
    let expected = expected_hours_per_day as usize;
    rows_per_date(set)
        .into_iter()
        .filter(|(_, found)| *found < expected)
        .map(|(date, found)| IncompleteDay {
            date,
            hours_found: found,
            hours_missing: expected - found,
        })
        .collect()
}

/// Dates with strictly more than `expected_hours_per_day` records.
pub fn overfull_days(set: &RecordSet, expected_hours_per_day: u32) -> Vec<OverfullDay> {
    let expected = expected_hours_per_day as usize;
    rows_per_date(set)
        .into_iter()
        .filter(|(_, found)| *found > expected)
        .map(|(date, found)| OverfullDay {
            date,
            hours_found: found,
            hours_extra: found - expected,
        })
        .collect()
}

/// Rows with a non-empty `Date` that does not parse. Blank dates are a
/// missing value, not a parse failure, and are not counted here.
pub fn unparseable_dates(set: &RecordSet) -> UnparseableDates {
    let mut count = 0;
    let mut distinct = BTreeSet::new();
    for r in set {
        let raw = r.date.trim();
        if raw.is_empty() || r.parsed_date().is_some() {
            continue;
        }
        count += 1;
        distinct.insert(raw.to_string());
    }
    UnparseableDates {
        count,
        samples: distinct.into_iter().take(UNPARSEABLE_SAMPLE_LIMIT).collect(),
    }
}

/// Rows whose `Timme` parses but falls outside `0..hours_per_day`.
pub fn out_of_range_hours(set: &RecordSet, hours_per_day: u32) -> usize {
    set.iter()
        .filter_map(|r| r.parsed_hour())
        .filter(|h| *h >= hours_per_day)
        .count()
}
