//! `svk summary`

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use svk_pipeline::{append_step_summary, summarize, PipelineContext, RunStatus};
use svk_store::{StoreGateway, StoreLayout};
use tracing::info;

/// CI step-summary file, appended to when set.
const STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

pub fn run(ctx: &PipelineContext) -> Result<RunStatus> {
    let gateway = StoreGateway::new(StoreLayout::from_settings(&ctx.settings));
    let store = gateway.load()?;
    let markdown = summarize(&store, ctx.today, Local::now()).to_markdown();
    print!("{markdown}");

    if let Some(path) = std::env::var_os(STEP_SUMMARY_ENV).map(PathBuf::from) {
        append_step_summary(&path, &markdown)?;
        info!(path = %path.display(), "summary/step_summary_appended");
    }
    Ok(RunStatus::Clean)
}
