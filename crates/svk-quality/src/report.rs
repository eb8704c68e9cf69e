//! Quality report aggregation.
//!
//! [`build_quality_report`] runs every analyzer over one immutable snapshot
//! and rolls the results into a [`QualityReport`]:
//! - gating checks: date continuity, duplicates, missing values, data gaps,
//!   coverage (each passes, fails, or degrades independently)
//! - informational metrics: value ranges, anomalies (unparseable dates,
//!   out-of-range hours, over-populated days)
//!
//! The report is a pure function of `(set, today, policy)`. Timestamps and
//! run identifiers are added by whoever persists it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use svk_records::{RecordSet, DATE_COLUMN, HOUR_COLUMN};

use crate::check::{CheckError, CheckName, CheckOutcome, CheckStatus, QualityPolicy};
use crate::completeness::{duplicate_count, duplicate_groups, missing_values, DuplicateGroup};
use crate::continuity::{
    incomplete_days, missing_dates, out_of_range_hours, overfull_days, unparseable_dates,
    IncompleteDay, OverfullDay, UnparseableDates,
};
use crate::coverage::coverage_percentage;
use crate::format_pct;
use crate::ranges::{analyze, ValueStats};

/// Failed-check message used when there is nothing to analyze.
pub const NO_DATA_MESSAGE: &str = "No data found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Findings that are surfaced as warnings but never gate the verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Anomalies {
    pub unparseable_dates: UnparseableDates,
    pub out_of_range_hours: usize,
    pub overfull_days: Vec<OverfullDay>,
}

impl Anomalies {
    pub fn is_empty(&self) -> bool {
        self.unparseable_dates.count == 0
            && self.out_of_range_hours == 0
            && self.overfull_days.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    /// The day the coverage window is anchored on.
    pub as_of: NaiveDate,
    pub total_records: usize,
    pub date_range: Option<DateRange>,
    pub missing_dates: Vec<NaiveDate>,
    /// Rows participating in a duplicate group (inclusive count).
    pub duplicate_records: usize,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub missing_values: BTreeMap<String, usize>,
    pub data_gaps: Vec<IncompleteDay>,
    pub value_ranges: BTreeMap<String, ValueStats>,
    pub coverage_percentage: f64,
    pub coverage_days_back: u32,
    pub anomalies: Anomalies,
    pub checks: Vec<CheckOutcome>,
    pub checks_passed: Vec<String>,
    pub checks_failed: Vec<String>,
    pub checks_degraded: Vec<String>,
    pub warnings: Vec<String>,
    /// `true` when any check failed or could not run.
    pub issues_found: bool,
}

impl QualityReport {
    /// Report for a run with nothing to analyze: one failed check, no metrics.
    pub fn no_data(as_of: NaiveDate, coverage_days_back: u32) -> Self {
        Self {
            as_of,
            total_records: 0,
            date_range: None,
            missing_dates: Vec::new(),
            duplicate_records: 0,
            duplicate_groups: Vec::new(),
            missing_values: BTreeMap::new(),
            data_gaps: Vec::new(),
            value_ranges: BTreeMap::new(),
            coverage_percentage: 0.0,
            coverage_days_back,
            anomalies: Anomalies::default(),
            checks: Vec::new(),
            checks_passed: Vec::new(),
            checks_failed: vec![NO_DATA_MESSAGE.to_string()],
            checks_degraded: Vec::new(),
            warnings: Vec::new(),
            issues_found: true,
        }
    }

    /// `true` when every check passed.
    pub fn is_clean(&self) -> bool {
        !self.issues_found
    }

    pub fn outcome(&self, name: CheckName) -> Option<&CheckOutcome> {
        self.checks.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QualityReport {{")?;
        writeln!(f, "  as_of: {}", self.as_of)?;
        writeln!(f, "  total_records: {}", self.total_records)?;
        writeln!(
            f,
            "  date_range: {}",
            self.date_range
                .map(|r| r.to_string())
                .unwrap_or_else(|| "none".to_string())
        )?;
        writeln!(f, "  missing_dates: {}", self.missing_dates.len())?;
        writeln!(f, "  duplicate_records: {}", self.duplicate_records)?;
        writeln!(f, "  data_gaps: {}", self.data_gaps.len())?;
        writeln!(
            f,
            "  coverage ({} days): {}%",
            self.coverage_days_back,
            format_pct(self.coverage_percentage)
        )?;
        for c in &self.checks_passed {
            writeln!(f, "  passed: {c}")?;
        }
        for c in &self.checks_failed {
            writeln!(f, "  failed: {c}")?;
        }
        for c in &self.checks_degraded {
            writeln!(f, "  degraded: {c}")?;
        }
        for w in &self.warnings {
            writeln!(f, "  warning: {w}")?;
        }
        write!(f, "}}")
    }
}

fn require(set: &RecordSet, column: &str) -> Result<(), CheckError> {
    if set.has_column(column) {
        Ok(())
    } else {
        Err(CheckError::MissingColumn(column.to_string()))
    }
}

/// Build a [`QualityReport`] for `set` as of `today`.
///
/// Checks never short-circuit each other: a degraded check contributes an
/// empty metric and the rest still run.
pub fn build_quality_report(
    set: &RecordSet,
    today: NaiveDate,
    policy: &QualityPolicy,
) -> QualityReport {
    let hours = policy.expected_hours_per_day;
    let mut checks = Vec::with_capacity(CheckName::ALL.len());

    // --- Date continuity ---
    let missing = require(set, DATE_COLUMN).map(|()| missing_dates(set));
    checks.push(CheckOutcome::from_result(
        CheckName::DateContinuity,
        missing.as_ref().map_err(Clone::clone).map(|m| {
            CheckOutcome::verdict(
                CheckName::DateContinuity,
                m.is_empty(),
                "Date continuity".to_string(),
                format!("Missing {} dates", m.len()),
            )
        }),
    ));

    // --- Duplicates ---
    let dups = require(set, DATE_COLUMN)
        .and_then(|()| require(set, HOUR_COLUMN))
        .map(|()| (duplicate_count(set), duplicate_groups(set)));
    checks.push(CheckOutcome::from_result(
        CheckName::Duplicates,
        dups.as_ref().map_err(Clone::clone).map(|(n, _)| {
            CheckOutcome::verdict(
                CheckName::Duplicates,
                *n == 0,
                "No duplicates".to_string(),
                format!("Found {n} duplicates"),
            )
        }),
    ));

    // --- Missing values ---
    let nulls = missing_values(set, &policy.value_columns);
    checks.push(CheckOutcome::verdict(
        CheckName::MissingValues,
        nulls.is_empty(),
        "No missing values".to_string(),
        "Missing values detected".to_string(),
    ));

    // --- Data gaps ---
    let gaps = require(set, DATE_COLUMN).map(|()| incomplete_days(set, hours));
    checks.push(CheckOutcome::from_result(
        CheckName::DataGaps,
        gaps.as_ref().map_err(Clone::clone).map(|g| {
            CheckOutcome::verdict(
                CheckName::DataGaps,
                g.is_empty(),
                "No data gaps".to_string(),
                format!("Found {} incomplete days", g.len()),
            )
        }),
    ));

    // --- Coverage ---
    let coverage = require(set, DATE_COLUMN)
        .and_then(|()| coverage_percentage(set, today, policy.coverage_days_back, hours));
    checks.push(CheckOutcome::from_result(
        CheckName::Coverage,
        coverage.as_ref().map_err(Clone::clone).map(|pct| {
            let shown = format_pct(*pct);
            CheckOutcome::verdict(
                CheckName::Coverage,
                *pct >= policy.coverage_threshold_pct,
                format!("Good coverage: {shown}%"),
                format!("Low coverage: {shown}%"),
            )
        }),
    ));

    // --- Informational ---
    let value_ranges = analyze(set, &policy.value_columns, policy.suspicious_high_mw);
    let anomalies = Anomalies {
        unparseable_dates: unparseable_dates(set),
        out_of_range_hours: out_of_range_hours(set, hours),
        overfull_days: overfull_days(set, hours),
    };
    let warnings = anomaly_warnings(&anomalies, &value_ranges, hours);

    let mut checks_passed = Vec::new();
    let mut checks_failed = Vec::new();
    let mut checks_degraded = Vec::new();
    for c in &checks {
        match c.status {
            CheckStatus::Passed => checks_passed.push(c.message.clone()),
            CheckStatus::Failed => checks_failed.push(c.message.clone()),
            CheckStatus::Degraded { .. } => checks_degraded.push(c.message.clone()),
        }
    }
    let issues_found = !checks_failed.is_empty() || !checks_degraded.is_empty();

    let (duplicate_records, duplicate_groups) = dups.unwrap_or_default();

    QualityReport {
        as_of: today,
        total_records: set.len(),
        date_range: set.date_span().map(|(start, end)| DateRange { start, end }),
        missing_dates: missing.unwrap_or_default(),
        duplicate_records,
        duplicate_groups,
        missing_values: nulls,
        data_gaps: gaps.unwrap_or_default(),
        value_ranges,
        coverage_percentage: coverage.unwrap_or(0.0),
        coverage_days_back: policy.coverage_days_back,
        anomalies,
        checks,
        checks_passed,
        checks_failed,
        checks_degraded,
        warnings,
        issues_found,
    }
}

fn anomaly_warnings(
    anomalies: &Anomalies,
    ranges: &BTreeMap<String, ValueStats>,
    hours_per_day: u32,
) -> Vec<String> {
    let mut out = Vec::new();
    let bad = &anomalies.unparseable_dates;
    if bad.count > 0 {
        out.push(format!(
            "{} rows with unparseable dates (e.g. {})",
            bad.count,
            bad.samples.join(", ")
        ));
    }
    if anomalies.out_of_range_hours > 0 {
        out.push(format!(
            "{} rows with hour outside 0..{}",
            anomalies.out_of_range_hours,
            hours_per_day.saturating_sub(1)
        ));
    }
    for day in &anomalies.overfull_days {
        out.push(format!(
            "{} has {} records ({} more than expected)",
            day.date, day.hours_found, day.hours_extra
        ));
    }
    for (column, stats) in ranges {
        if stats.negative_count > 0 {
            out.push(format!("{column}: {} negative values", stats.negative_count));
        }
        if stats.suspicious_high_count > 0 {
            out.push(format!(
                "{column}: {} suspiciously high values",
                stats.suspicious_high_count
            ));
        }
    }
    out
}
