//! `svk ingest <daily|weekly|custom>`

use std::path::Path;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use svk_config::IngestConfig;
use svk_pipeline::{run_ingest, IngestPlan, PipelineContext, RunStatus};
use svk_records::CsvBatchProducer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanKind {
    /// The last few days ending today
    Daily,
    /// Recent dates with no data, one day at a time
    Weekly,
    /// An explicit window (--days, optional --start-date)
    Custom,
}

/// Resolve CLI flags into a plan. `--start-date` only applies to `custom`;
/// `--days` overrides the configured length for `daily` and `custom`.
pub fn plan_for(
    kind: PlanKind,
    cfg: &IngestConfig,
    days: Option<u32>,
    start: Option<NaiveDate>,
) -> Result<IngestPlan> {
    if start.is_some() && kind != PlanKind::Custom {
        bail!("--start-date is only valid with the custom plan");
    }
    if days == Some(0) {
        bail!("--days must be at least 1");
    }
    let plan = match kind {
        PlanKind::Daily => IngestPlan::Daily {
            days: days.unwrap_or(cfg.daily_days),
        },
        PlanKind::Weekly => {
            if days.is_some() {
                bail!("--days is not valid with the weekly plan (see ingest.weekly_days_back)");
            }
            IngestPlan::weekly(cfg)
        }
        PlanKind::Custom => IngestPlan::custom(cfg, days, start),
    };
    Ok(plan)
}

pub fn run(ctx: &PipelineContext, plan: IngestPlan, batch: &Path) -> Result<RunStatus> {
    let producer = CsvBatchProducer::new(batch);
    let out = run_ingest(ctx, plan, &producer)?;

    println!("status={}", out.status.as_str());
    println!("ingest_id={}", out.ingest_id);
    println!("plan={}", out.plan);
    println!("requests={}", out.requests.len());
    println!("requests_failed={}", out.failed.len());
    for f in &out.failed {
        println!("failed={} error={}", f.request, f.error);
    }
    println!("records_obtained={}", out.records_obtained);
    println!("total_records={}", out.total_records);
    for raw in &out.raw_archives {
        println!("raw_archive={}", raw.display());
    }
    match &out.saved {
        Some(saved) => {
            println!("saved={}", saved.path.display());
            if let Some(b) = &saved.backup {
                println!("backup={}", b.display());
            }
            println!("backups_pruned={}", saved.pruned.len());
        }
        None => println!("saved=false"),
    }
    if let Some(state) = &out.state_path {
        println!("state={}", state.display());
    }

    Ok(out.status)
}
