//! Command handler modules for the `svk` binary.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod check;
pub mod ingest;
pub mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use svk_config::{load_layered_yaml, report_unused_keys, LoadedConfig, UnusedKeyPolicy};
use svk_pipeline::{PipelineContext, RunStatus};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load layered config, warn about keys nothing reads, and build the run
/// context anchored on `as_of` (default: today, local time).
pub fn load_context(config_paths: &[PathBuf], as_of: Option<NaiveDate>) -> Result<PipelineContext> {
    let loaded = load_config(config_paths)?;
    let settings = loaded.settings()?;
    let today = as_of.unwrap_or_else(|| Local::now().date_naive());
    info!(
        config_hash = %loaded.config_hash,
        layers = config_paths.len(),
        %today,
        "config/loaded"
    );
    Ok(PipelineContext::new(settings, loaded.config_hash, today))
}

fn load_config(config_paths: &[PathBuf]) -> Result<LoadedConfig> {
    let loaded = load_layered_yaml(config_paths).context("load layered config")?;
    let unused = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    for pointer in &unused.unused_leaf_pointers {
        warn!(%pointer, "config/unused_key");
    }
    Ok(loaded)
}

/// `svk config-hash`: hash line, then the canonical JSON it was computed from.
pub fn config_hash(paths: &[PathBuf]) -> Result<RunStatus> {
    let loaded = load_config(paths)?;
    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(RunStatus::Clean)
}
