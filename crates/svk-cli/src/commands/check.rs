//! `svk check`

use std::path::PathBuf;

use anyhow::Result;
use svk_pipeline::{run_validate, PipelineContext, RunStatus};
use svk_quality::format_pct;

pub fn run(
    ctx: &PipelineContext,
    data_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<RunStatus> {
    let paths = &ctx.settings.paths;
    let data_file = data_file.unwrap_or_else(|| paths.master_path());
    let output_dir = output_dir.unwrap_or_else(|| paths.report_path().to_path_buf());

    let out = run_validate(ctx, &data_file, &output_dir)?;
    let report = &out.report;

    println!("status={}", out.status.as_str());
    println!("run_id={}", out.meta.run_id);
    println!("data_file={}", out.data_file.display());
    println!("total_records={}", report.total_records);
    if let Some(range) = &report.date_range {
        println!("date_range={range}");
    }
    println!("coverage_pct={}", format_pct(report.coverage_percentage));
    println!("checks_passed={}", report.checks_passed.len());
    println!("checks_failed={}", report.checks_failed.len());
    println!("checks_degraded={}", report.checks_degraded.len());
    for msg in report.checks_failed.iter().chain(&report.checks_degraded) {
        println!("issue={msg}");
    }
    for msg in &report.warnings {
        println!("warning={msg}");
    }
    println!("summary_json={}", out.artifacts.summary_json.display());
    println!("report_html={}", out.artifacts.report_html.display());
    if let Some(listing) = &out.artifacts.missing_dates_csv {
        println!("missing_dates_csv={}", listing.display());
    }

    Ok(out.status)
}
