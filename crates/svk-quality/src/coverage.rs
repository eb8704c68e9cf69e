//! Fraction of expected hourly slots present in a trailing window.

use chrono::{Days, NaiveDate};
use svk_records::RecordSet;

use crate::check::CheckError;

/// Coverage of `[today - days_back, today]` (inclusive, date-based), as a
/// percentage rounded to two decimals.
///
/// The expected slot count is `(days_back + 1) * hours_per_day`. Every row
/// whose date falls in the window counts as one slot. Returns `0.0` for an
/// empty set or a zero denominator and clamps over-populated windows to
/// `100.0`.
///
/// The window is anchored on `today`, not on the data's own last date: a
/// feed that stopped updating shows falling coverage.
pub fn coverage_percentage(
    set: &RecordSet,
    today: NaiveDate,
    days_back: u32,
    hours_per_day: u32,
) -> Result<f64, CheckError> {
    let start = today
        .checked_sub_days(Days::new(u64::from(days_back)))
        .ok_or_else(|| {
            CheckError::InvalidWindow(format!("{today} minus {days_back} days is out of range"))
        })?;

    let expected = (u64::from(days_back) + 1) * u64::from(hours_per_day);
    if set.is_empty() || expected == 0 {
        return Ok(0.0);
    }

    let actual = set
        .iter()
        .filter_map(|r| r.parsed_date())
        .filter(|d| *d >= start && *d <= today)
        .count();

    let pct = 100.0 * actual as f64 / expected as f64;
    Ok(((pct * 100.0).round() / 100.0).min(100.0))
}
