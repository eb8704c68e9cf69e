//! Pass/fail/degraded verdicts for the gating checks.
//!
//! A check that cannot run is never reported as passed: it becomes
//! [`CheckStatus::Degraded`] with the reason, so "nothing wrong" and "could not
//! look" stay distinguishable in the report.

use std::fmt;

use serde::Serialize;
use svk_records::{CONSUMPTION_COLUMN, FORECAST_COLUMN};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Thresholds and column choices the checks run with.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityPolicy {
    pub expected_hours_per_day: u32,
    pub coverage_days_back: u32,
    /// Coverage strictly below this fails the coverage check.
    pub coverage_threshold_pct: f64,
    pub suspicious_high_mw: f64,
    /// Numeric columns for range statistics and unparseable-cell counting.
    pub value_columns: Vec<String>,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            expected_hours_per_day: 24,
            coverage_days_back: 30,
            coverage_threshold_pct: 90.0,
            suspicious_high_mw: 50_000.0,
            value_columns: vec![FORECAST_COLUMN.to_string(), CONSUMPTION_COLUMN.to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Why a check could not produce a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// A column the check reads is absent from the header.
    MissingColumn(String),
    /// The requested date window cannot be represented.
    InvalidWindow(String),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::MissingColumn(c) => write!(f, "missing column '{c}'"),
            CheckError::InvalidWindow(msg) => write!(f, "invalid window: {msg}"),
        }
    }
}

impl std::error::Error for CheckError {}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// The gating checks, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    DateContinuity,
    Duplicates,
    MissingValues,
    DataGaps,
    Coverage,
}

impl CheckName {
    pub const ALL: [CheckName; 5] = [
        CheckName::DateContinuity,
        CheckName::Duplicates,
        CheckName::MissingValues,
        CheckName::DataGaps,
        CheckName::Coverage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::DateContinuity => "date_continuity",
            CheckName::Duplicates => "duplicates",
            CheckName::MissingValues => "missing_values",
            CheckName::DataGaps => "data_gaps",
            CheckName::Coverage => "coverage",
        }
    }

    /// Human label used in degraded messages.
    pub fn label(&self) -> &'static str {
        match self {
            CheckName::DateContinuity => "Date continuity",
            CheckName::Duplicates => "Duplicates",
            CheckName::MissingValues => "Missing values",
            CheckName::DataGaps => "Data gaps",
            CheckName::Coverage => "Coverage",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    Degraded { reason: String },
}

/// One check's verdict plus its human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub name: CheckName,
    #[serde(flatten)]
    pub status: CheckStatus,
    pub message: String,
}

impl CheckOutcome {
    pub fn passed(name: CheckName, message: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Passed,
            message: message.into(),
        }
    }

    pub fn failed(name: CheckName, message: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Failed,
            message: message.into(),
        }
    }

    pub fn degraded(name: CheckName, err: &CheckError) -> Self {
        Self {
            name,
            status: CheckStatus::Degraded {
                reason: err.to_string(),
            },
            message: format!("{}: could not run ({err})", name.label()),
        }
    }

    /// `Passed` or `Failed` depending on `ok`.
    pub fn verdict(name: CheckName, ok: bool, pass_msg: String, fail_msg: String) -> Self {
        if ok {
            Self::passed(name, pass_msg)
        } else {
            Self::failed(name, fail_msg)
        }
    }

    /// Fold a check result into an outcome; errors degrade.
    pub fn from_result(name: CheckName, result: Result<CheckOutcome, CheckError>) -> Self {
        result.unwrap_or_else(|e| Self::degraded(name, &e))
    }

    pub fn is_passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, CheckStatus::Degraded { .. })
    }
}
