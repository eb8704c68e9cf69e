//! Load and save of the canonical store.
//!
//! Contract:
//! - a missing store loads as an empty set; an unreadable one is an error
//! - `save` snapshots the previous store into the backup directory, replaces
//!   the store atomically (temp file + rename), then prunes old backups
//! - nothing here merges; callers hand in the set to persist

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use svk_config::Settings;
use svk_records::{csv_store, RecordSet};
use tracing::info;

use crate::backup::{create_backup, prune_backups};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub data_dir: PathBuf,
    pub master: PathBuf,
    pub state: PathBuf,
    pub backup_dir: PathBuf,
    pub backup_retention: usize,
}

impl StoreLayout {
    pub fn from_settings(settings: &Settings) -> Self {
        let paths = &settings.paths;
        Self {
            data_dir: paths.data_dir.clone(),
            master: paths.master_path(),
            state: paths.state_path(),
            backup_dir: paths.backup_path(),
            backup_retention: settings.store.backup_retention,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub total_records: usize,
    /// Snapshot of the previous store, if there was one.
    pub backup: Option<PathBuf>,
    pub pruned: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct StoreGateway {
    layout: StoreLayout,
}

impl StoreGateway {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn exists(&self) -> bool {
        self.layout.master.is_file()
    }

    /// Current store contents. Missing store => empty set.
    pub fn load(&self) -> Result<RecordSet> {
        let path = &self.layout.master;
        if !path.exists() {
            info!(path = %path.display(), "store/missing_treated_as_empty");
            return Ok(RecordSet::empty());
        }
        let set = csv_store::read_path(path)
            .with_context(|| format!("load canonical store: {}", path.display()))?;
        info!(path = %path.display(), records = set.len(), "store/loaded");
        Ok(set)
    }

    pub fn save(&self, set: &RecordSet) -> Result<SaveOutcome> {
        self.save_at(set, &Local::now())
    }

    /// `save` with an explicit clock for backup naming.
    pub fn save_at(&self, set: &RecordSet, now: &DateTime<Local>) -> Result<SaveOutcome> {
        let layout = &self.layout;
        fs::create_dir_all(&layout.data_dir)
            .with_context(|| format!("create data dir: {}", layout.data_dir.display()))?;

        let backup = if self.exists() {
            Some(create_backup(&layout.backup_dir, &layout.master, now)?)
        } else {
            None
        };

        write_atomic(&layout.master, set)?;
        info!(path = %layout.master.display(), records = set.len(), "store/saved");

        let pruned = prune_backups(&layout.backup_dir, layout.backup_retention)?;

        Ok(SaveOutcome {
            path: layout.master.clone(),
            total_records: set.len(),
            backup,
            pruned,
        })
    }

    /// Write a produced batch as `raw_<timestamp>.csv` in the data dir.
    pub fn archive_raw(&self, batch: &RecordSet, now: &DateTime<Local>) -> Result<PathBuf> {
        let dir = &self.layout.data_dir;
        fs::create_dir_all(dir).with_context(|| format!("create data dir: {}", dir.display()))?;

        let stamp = now.format("%Y%m%d_%H%M%S");
        let mut path = dir.join(format!("raw_{stamp}.csv"));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("raw_{stamp}_{n}.csv"));
            n += 1;
        }
        csv_store::write_path(&path, batch)
            .with_context(|| format!("archive raw batch: {}", path.display()))?;
        info!(path = %path.display(), records = batch.len(), "store/raw_archived");
        Ok(path)
    }
}

fn write_atomic(path: &Path, set: &RecordSet) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store.csv".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    csv_store::write_path(&tmp, set).with_context(|| format!("write temp store: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("replace store {} with {}", path.display(), tmp.display()))?;
    Ok(())
}
