//! Persisted quality reports: JSON summary, HTML view, missing-dates listing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use svk_quality::QualityReport;
use tracing::info;
use uuid::Uuid;

use crate::render::render_html;

pub const SUMMARY_JSON: &str = "data_quality_summary.json";
pub const REPORT_HTML: &str = "data_quality_report.html";
pub const MISSING_DATES_CSV: &str = "missing_dates.csv";

/// Run identity stamped onto persisted reports.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub config_hash: String,
}

impl ReportMeta {
    pub fn new(config_hash: impl Into<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            run_id: Uuid::new_v4(),
            config_hash: config_hash.into(),
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    run_id: Uuid,
    config_hash: &'a str,
    #[serde(flatten)]
    report: &'a QualityReport,
}

#[derive(Debug, Clone)]
pub struct QualityArtifacts {
    pub summary_json: PathBuf,
    pub report_html: PathBuf,
    /// Present only when dates are missing.
    pub missing_dates_csv: Option<PathBuf>,
}

/// Write the JSON summary, the HTML view, and (when any dates are missing)
/// the missing-dates listing into `dir`. A stale listing from an earlier run
/// is removed when nothing is missing.
pub fn write_quality_artifacts(
    dir: &Path,
    report: &QualityReport,
    meta: &ReportMeta,
) -> Result<QualityArtifacts> {
    fs::create_dir_all(dir).with_context(|| format!("create report dir: {}", dir.display()))?;

    let doc = ReportDocument {
        generated_at: meta.generated_at,
        run_id: meta.run_id,
        config_hash: &meta.config_hash,
        report,
    };
    let summary_json = dir.join(SUMMARY_JSON);
    let json = serde_json::to_string_pretty(&doc).context("serialize quality report failed")?;
    fs::write(&summary_json, format!("{json}\n"))
        .with_context(|| format!("write report failed: {}", summary_json.display()))?;

    let report_html = dir.join(REPORT_HTML);
    let html = render_html(report, meta).context("render html report failed")?;
    fs::write(&report_html, html)
        .with_context(|| format!("write report failed: {}", report_html.display()))?;

    let listing = dir.join(MISSING_DATES_CSV);
    let missing_dates_csv = if report.missing_dates.is_empty() {
        if listing.exists() {
            fs::remove_file(&listing)
                .with_context(|| format!("remove stale listing: {}", listing.display()))?;
        }
        None
    } else {
        write_missing_dates(&listing, report)?;
        Some(listing)
    };

    info!(
        dir = %dir.display(),
        run_id = %meta.run_id,
        issues_found = report.issues_found,
        "report/written"
    );
    Ok(QualityArtifacts {
        summary_json,
        report_html,
        missing_dates_csv,
    })
}

fn write_missing_dates(path: &Path, report: &QualityReport) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("open missing dates csv: {}", path.display()))?;
    wtr.write_record(["missing_date"])?;
    for d in &report.missing_dates {
        wtr.write_record([d.format("%Y-%m-%d").to_string()])?;
    }
    wtr.flush()
        .with_context(|| format!("flush missing dates csv: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use svk_quality::{build_quality_report, QualityPolicy};
    use svk_testkit::{date, trailing_window, without_date};

    #[test]
    fn clean_report_writes_two_files_and_clears_stale_listing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MISSING_DATES_CSV), "missing_date\n2020-01-01\n").unwrap();

        let today = date(2024, 3, 31);
        let report = build_quality_report(&trailing_window(today, 30), today, &QualityPolicy::default());
        let out = write_quality_artifacts(dir.path(), &report, &ReportMeta::new("h")).unwrap();

        assert!(out.summary_json.exists());
        assert!(out.report_html.exists());
        assert!(out.missing_dates_csv.is_none());
        assert!(!dir.path().join(MISSING_DATES_CSV).exists());

        let v: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out.summary_json).unwrap()).unwrap();
        assert_eq!(v["config_hash"], "h");
        assert_eq!(v["issues_found"], false);
        assert!(v["generated_at"].is_string());
        assert!(v["run_id"].is_string());
    }

    #[test]
    fn missing_dates_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let today = date(2024, 3, 31);
        let set = without_date(
            &without_date(&trailing_window(today, 30), date(2024, 3, 10)),
            date(2024, 3, 12),
        );
        let report = build_quality_report(&set, today, &QualityPolicy::default());
        let out = write_quality_artifacts(dir.path(), &report, &ReportMeta::new("h")).unwrap();

        let listing = fs::read_to_string(out.missing_dates_csv.unwrap()).unwrap();
        assert_eq!(listing, "missing_date\n2024-03-10\n2024-03-12\n");
    }
}
