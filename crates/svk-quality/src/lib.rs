//! svk-quality
//!
//! Completeness and plausibility analysis over a [`RecordSet`].
//!
//! Every analyzer is a pure function of the set plus explicit parameters
//! (`today`, thresholds). Nothing here logs, reads the clock, or touches the
//! filesystem; callers decide what to do with the findings.
//!
//! [`RecordSet`]: svk_records::RecordSet

pub mod check;
pub mod completeness;
pub mod continuity;
pub mod coverage;
pub mod ranges;
pub mod report;

pub use check::{CheckError, CheckName, CheckOutcome, CheckStatus, QualityPolicy};
pub use completeness::{duplicate_count, duplicate_groups, missing_values, DuplicateGroup};
pub use continuity::{
    incomplete_days, missing_dates, out_of_range_hours, overfull_days, unparseable_dates,
    IncompleteDay, OverfullDay, UnparseableDates,
};
pub use coverage::coverage_percentage;
pub use ranges::{analyze, ValueStats};
pub use report::{build_quality_report, Anomalies, DateRange, QualityReport, NO_DATA_MESSAGE};

/// Format a percentage the way reports print it: whole values keep one
/// decimal (`100.0`), others print as computed (`87.5`, `93.06`).
pub fn format_pct(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{pct:.1}")
    } else {
        format!("{pct}")
    }
}

/// Format a count with thousands separators: `12345` -> `12,345`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{format_count, format_pct};

    #[test]
    fn count_formatting() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn pct_formatting() {
        assert_eq!(format_pct(100.0), "100.0");
        assert_eq!(format_pct(0.0), "0.0");
        assert_eq!(format_pct(87.5), "87.5");
        assert_eq!(format_pct(93.06), "93.06");
    }
}
