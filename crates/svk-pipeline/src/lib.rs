//! svk-pipeline
//!
//! Orchestration of a run: load the store, obtain a batch, merge, save, and
//! validate. This is the only layer that decides what a failure means for
//! the run as a whole; the crates below it return data and errors.

pub mod ingest;
pub mod summary;
pub mod validate;

use chrono::NaiveDate;
use svk_config::Settings;
use svk_store::RunMetadata;

pub use ingest::{run_ingest, IngestOutcome, IngestPlan};
pub use summary::{append_step_summary, summarize, StoreSummary};
pub use validate::{run_validate, ValidateOutcome};

/// How a run ended, as seen by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Everything ran and nothing is wrong.
    Clean,
    /// Everything ran and at least one check failed or could not run.
    IssuesFound,
    /// There was nothing to work with at all.
    CouldNotRun,
}

impl RunStatus {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::Clean => 0,
            RunStatus::IssuesFound => 1,
            RunStatus::CouldNotRun => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Clean => "clean",
            RunStatus::IssuesFound => "issues_found",
            RunStatus::CouldNotRun => "could_not_run",
        }
    }
}

/// Explicit inputs every pipeline step runs with.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub settings: Settings,
    pub config_hash: String,
    /// Anchor for trailing windows (ingest plans, coverage, summary).
    pub today: NaiveDate,
    pub run: RunMetadata,
}

impl PipelineContext {
    pub fn new(settings: Settings, config_hash: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            settings,
            config_hash: config_hash.into(),
            today,
            run: RunMetadata::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RunStatus;

    #[test]
    fn exit_codes_distinguish_outcomes() {
        assert_eq!(RunStatus::Clean.exit_code(), 0);
        assert_eq!(RunStatus::IssuesFound.exit_code(), 1);
        assert_eq!(RunStatus::CouldNotRun.exit_code(), 2);
    }
}
