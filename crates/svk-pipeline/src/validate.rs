//! Load -> analyze -> persist report.
//!
//! A report is always written, including when the data file is missing or
//! unreadable; in that case it carries a single "No data found" failure and
//! the run status is [`RunStatus::CouldNotRun`].

use std::path::{Path, PathBuf};

use anyhow::Result;
use svk_quality::{build_quality_report, QualityReport};
use svk_records::{csv_store, RecordSet};
use svk_store::{write_quality_artifacts, QualityArtifacts, ReportMeta};
use tracing::{error, info, warn};

use crate::{PipelineContext, RunStatus};

#[derive(Debug, Clone)]
pub struct ValidateOutcome {
    pub data_file: PathBuf,
    pub report: QualityReport,
    pub artifacts: QualityArtifacts,
    pub meta: ReportMeta,
    pub status: RunStatus,
}

enum Loaded {
    Records(RecordSet),
    Nothing(String),
}

fn load(data_file: &Path) -> Loaded {
    if !data_file.exists() {
        error!(path = %data_file.display(), "validate/data_file_not_found");
        return Loaded::Nothing(format!("data file not found: {}", data_file.display()));
    }
    match csv_store::read_path(data_file) {
        Ok(set) if set.is_empty() => {
            warn!(path = %data_file.display(), "validate/data_file_empty");
            Loaded::Nothing(format!("data file has no records: {}", data_file.display()))
        }
        Ok(set) => {
            info!(path = %data_file.display(), records = set.len(), "validate/loaded");
            Loaded::Records(set)
        }
        Err(e) => {
            error!(path = %data_file.display(), error = %e, "validate/load_failed");
            Loaded::Nothing(format!("could not read {}: {e}", data_file.display()))
        }
    }
}

/// Validate `data_file` and write the report artifacts into `report_dir`.
///
/// Errors are reserved for failing to write the artifacts themselves.
pub fn run_validate(
    ctx: &PipelineContext,
    data_file: &Path,
    report_dir: &Path,
) -> Result<ValidateOutcome> {
    let quality = &ctx.settings.quality;
    let (report, status) = match load(data_file) {
        Loaded::Records(set) => {
            let report = build_quality_report(&set, ctx.today, &quality.policy());
            let status = if report.issues_found {
                RunStatus::IssuesFound
            } else {
                RunStatus::Clean
            };
            (report, status)
        }
        Loaded::Nothing(reason) => {
            let mut report = QualityReport::no_data(ctx.today, quality.coverage_days_back);
            report.warnings.push(reason);
            (report, RunStatus::CouldNotRun)
        }
    };

    for msg in &report.checks_failed {
        warn!(check = %msg, "validate/check_failed");
    }
    for msg in &report.checks_degraded {
        warn!(check = %msg, "validate/check_degraded");
    }

    let meta = ReportMeta::new(ctx.config_hash.clone());
    let artifacts = write_quality_artifacts(report_dir, &report, &meta)?;
    info!(
        status = status.as_str(),
        passed = report.checks_passed.len(),
        failed = report.checks_failed.len(),
        degraded = report.checks_degraded.len(),
        "validate/done"
    );

    Ok(ValidateOutcome {
        data_file: data_file.to_path_buf(),
        report,
        artifacts,
        meta,
        status,
    })
}
