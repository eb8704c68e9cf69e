//! Load -> produce -> merge -> save.
//!
//! Invariants:
//! - the store is only written when new rows were actually obtained
//! - the saved store has unique `(date, hour)` keys in ascending order
//! - a producer failure is logged and treated as "no new data"
//! - an unreadable store aborts the run before anything is written
//! - an empty store with nothing obtained means the run could not do anything

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate, Utc};
use svk_config::IngestConfig;
use svk_records::{merge, ProduceRequest, Producer, RecordSet};
use svk_store::{write_state, SaveOutcome, ScraperState, StoreGateway, StoreLayout};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{PipelineContext, RunStatus};

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPlan {
    /// The last `days` days ending today, in one request.
    Daily { days: u32 },
    /// Dates with no record in `[today - days_back, today]`, at most
    /// `max_dates` of them, one request per date.
    Weekly { days_back: u32, max_dates: usize },
    /// `days` days from `start`, or ending today when `start` is absent.
    Custom { days: u32, start: Option<NaiveDate> },
}

impl IngestPlan {
    pub fn daily(cfg: &IngestConfig) -> Self {
        IngestPlan::Daily {
            days: cfg.daily_days,
        }
    }

    pub fn weekly(cfg: &IngestConfig) -> Self {
        IngestPlan::Weekly {
            days_back: cfg.weekly_days_back,
            max_dates: cfg.weekly_max_dates,
        }
    }

    pub fn custom(cfg: &IngestConfig, days: Option<u32>, start: Option<NaiveDate>) -> Self {
        IngestPlan::Custom {
            days: days.unwrap_or(cfg.custom_days),
            start,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IngestPlan::Daily { .. } => "daily",
            IngestPlan::Weekly { .. } => "weekly",
            IngestPlan::Custom { .. } => "custom",
        }
    }

    /// Requests to issue, in order, given the current store contents.
    pub fn requests(&self, today: NaiveDate, existing: &RecordSet) -> Vec<ProduceRequest> {
        match *self {
            IngestPlan::Daily { days } => vec![ProduceRequest::trailing(today, days)],
            IngestPlan::Custom {
                days,
                start: Some(start),
            } => vec![ProduceRequest::new(start, days)],
            IngestPlan::Custom { days, start: None } => {
                vec![ProduceRequest::trailing(today, days)]
            }
            IngestPlan::Weekly {
                days_back,
                max_dates,
            } => recent_missing_dates(existing, today, days_back)
                .into_iter()
                .take(max_dates)
                .map(ProduceRequest::single_day)
                .collect(),
        }
    }
}

impl fmt::Display for IngestPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestPlan::Daily { days } => write!(f, "daily (last {days} days)"),
            IngestPlan::Weekly {
                days_back,
                max_dates,
            } => write!(f, "weekly (gaps in last {days_back} days, max {max_dates})"),
            IngestPlan::Custom {
                days,
                start: Some(s),
            } => write!(f, "custom ({days} days from {s})"),
            IngestPlan::Custom { days, start: None } => write!(f, "custom (last {days} days)"),
        }
    }
}

/// Dates in `[today - days_back, today]` with no record at all. An empty
/// store has no reference point and yields nothing.
pub fn recent_missing_dates(set: &RecordSet, today: NaiveDate, days_back: u32) -> Vec<NaiveDate> {
    if set.is_empty() {
        return Vec::new();
    }
    let present = set.dates();
    let start = today
        .checked_sub_days(Days::new(u64::from(days_back)))
        .unwrap_or(NaiveDate::MIN);
    start
        .iter_days()
        .take_while(|d| *d <= today)
        .filter(|d| !present.contains(d))
        .collect()
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FailedRequest {
    pub request: ProduceRequest,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub ingest_id: Uuid,
    pub plan: IngestPlan,
    pub requests: Vec<ProduceRequest>,
    pub failed: Vec<FailedRequest>,
    /// Rows returned by the producer across all requests, before merge.
    pub records_obtained: usize,
    pub raw_archives: Vec<PathBuf>,
    /// Present when the store was written.
    pub saved: Option<SaveOutcome>,
    pub state_path: Option<PathBuf>,
    /// Records in the store after the run.
    pub total_records: usize,
    pub status: RunStatus,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

pub fn run_ingest(
    ctx: &PipelineContext,
    plan: IngestPlan,
    producer: &dyn Producer,
) -> Result<IngestOutcome> {
    let ingest_id = Uuid::new_v4();
    let layout = StoreLayout::from_settings(&ctx.settings);
    let gateway = StoreGateway::new(layout);

    let existing = gateway.load()?;
    let requests = plan.requests(ctx.today, &existing);
    info!(
        %ingest_id,
        plan = %plan,
        producer = producer.name(),
        existing = existing.len(),
        requests = requests.len(),
        "ingest/start"
    );

    let now = Local::now();
    let mut failed = Vec::new();
    let mut raw_archives = Vec::new();
    let mut records_obtained = 0;
    let mut merged = existing.clone();

    for req in &requests {
        let batch = match producer.produce(req) {
            Ok(b) => b,
            Err(e) => {
                error!(request = %req, error = %e, "ingest/producer_failed");
                failed.push(FailedRequest {
                    request: *req,
                    error: e.to_string(),
                });
                continue;
            }
        };
        if batch.is_empty() {
            warn!(request = %req, "ingest/no_data");
            continue;
        }

        records_obtained += batch.len();
        if ctx.settings.store.archive_raw_batches {
            raw_archives.push(gateway.archive_raw(&batch, &now)?);
        }
        let before = merged.len();
        let incoming = batch.len();
        merged = merge(merged, batch);
        info!(
            request = %req,
            existing = before,
            incoming,
            merged = merged.len(),
            "ingest/merged"
        );
    }

    if records_obtained == 0 {
        let status = if existing.is_empty() {
            error!(%ingest_id, "ingest/no_store_and_no_data");
            RunStatus::CouldNotRun
        } else {
            warn!(%ingest_id, "ingest/no_new_data_store_untouched");
            RunStatus::Clean
        };
        return Ok(IngestOutcome {
            ingest_id,
            plan,
            requests,
            failed,
            records_obtained,
            raw_archives,
            saved: None,
            state_path: None,
            total_records: existing.len(),
            status,
        });
    }

    // A first batch merged into an empty store comes back as scraped.
    let before = merged.len();
    let merged = merged.canonicalize();
    if merged.len() != before {
        info!(
            %ingest_id,
            collapsed = before - merged.len(),
            "ingest/duplicates_collapsed"
        );
    }

    let saved = gateway.save_at(&merged, &now)?;
    let state = ScraperState::describe(&merged, Utc::now(), &ctx.run, ingest_id, &ctx.config_hash);
    let state_path = gateway.layout().state.clone();
    write_state(&state_path, &state).context("write scraper state")?;

    info!(
        %ingest_id,
        obtained = records_obtained,
        total = merged.len(),
        failed = failed.len(),
        "ingest/done"
    );

    Ok(IngestOutcome {
        ingest_id,
        plan,
        requests,
        failed,
        records_obtained,
        raw_archives,
        saved: Some(saved),
        state_path: Some(state_path),
        total_records: merged.len(),
        status: RunStatus::Clean,
    })
}
