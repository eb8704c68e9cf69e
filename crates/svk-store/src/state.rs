//! Monitoring state written after every successful save.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use svk_records::RecordSet;
use uuid::Uuid;

/// Value used for run metadata when not running under CI.
pub const LOCAL_RUN: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Identifies the CI run (or a local run) that touched the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    pub run_number: String,
    pub run_id: String,
}

impl RunMetadata {
    pub fn local() -> Self {
        Self {
            run_number: LOCAL_RUN.to_string(),
            run_id: LOCAL_RUN.to_string(),
        }
    }

    /// `GITHUB_RUN_NUMBER` / `GITHUB_RUN_ID`, each defaulting to `"local"`.
    pub fn from_env() -> Self {
        let var = |k: &str| {
            std::env::var(k)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| LOCAL_RUN.to_string())
        };
        Self {
            run_number: var("GITHUB_RUN_NUMBER"),
            run_id: var("GITHUB_RUN_ID"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperState {
    pub last_update: DateTime<Utc>,
    pub total_records: usize,
    pub date_range: StateDateRange,
    pub github_run_number: String,
    pub github_run_id: String,
    pub ingest_id: Uuid,
    pub config_hash: String,
}

impl ScraperState {
    pub fn describe(
        set: &RecordSet,
        now: DateTime<Utc>,
        run: &RunMetadata,
        ingest_id: Uuid,
        config_hash: &str,
    ) -> Self {
        let span = set.date_span();
        Self {
            last_update: now,
            total_records: set.len(),
            date_range: StateDateRange {
                start: span.map(|(s, _)| s),
                end: span.map(|(_, e)| e),
            },
            github_run_number: run.run_number.clone(),
            github_run_id: run.run_id.clone(),
            ingest_id,
            config_hash: config_hash.to_string(),
        }
    }
}

pub fn write_state(path: &Path, state: &ScraperState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create state dir: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(state).context("serialize state failed")?;
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("write state failed: {}", path.display()))?;
    Ok(())
}

/// The last written state, or `None` when no state file exists.
pub fn read_state(path: &Path) -> Result<Option<ScraperState>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("read state: {}", path.display()))?;
    let state = serde_json::from_str(&raw).context("parse state json")?;
    Ok(Some(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use svk_testkit::{date, hourly_days};

    #[test]
    fn state_round_trips_with_expected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("scraper_state.json");
        let set = hourly_days(date(2024, 1, 1), 2);
        let state = ScraperState::describe(
            &set,
            Utc::now(),
            &RunMetadata::local(),
            Uuid::new_v4(),
            "abc123",
        );
        write_state(&path, &state).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["total_records"], 48);
        assert_eq!(raw["date_range"]["start"], "2024-01-01");
        assert_eq!(raw["date_range"]["end"], "2024-01-02");
        assert_eq!(raw["github_run_number"], "local");
        assert_eq!(raw["config_hash"], "abc123");

        assert_eq!(read_state(&path).unwrap(), Some(state));
    }

    #[test]
    fn empty_set_has_null_range() {
        let state = ScraperState::describe(
            &RecordSet::empty(),
            Utc::now(),
            &RunMetadata::local(),
            Uuid::nil(),
            "",
        );
        let v = serde_json::to_value(&state).unwrap();
        assert!(v["date_range"]["start"].is_null());
        assert_eq!(v["total_records"], 0);
    }

    #[test]
    fn missing_state_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_state(&dir.path().join("none.json")).unwrap().is_none());
    }
}
