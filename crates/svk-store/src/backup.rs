//! Rotating snapshots of the canonical store.
//!
//! A backup is a byte copy of the store as it was before a save, named
//! `backup_<YYYYmmdd_HHMMSS>_<seq>.csv`. Names sort in creation order: the
//! timestamp orders across seconds and the three-digit sequence orders saves
//! within the same second. Legacy `backup_<YYYYmmdd_HHMMSS>.csv` files sort
//! before any sequenced file of the same second.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeZone};
use tracing::info;

pub const BACKUP_PREFIX: &str = "backup_";
pub const BACKUP_EXT: &str = ".csv";

const MAX_SEQ_PER_SECOND: u32 = 1000;

fn is_backup_name(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_EXT)
}

/// Backups in `dir`, oldest first. A missing directory has none.
pub fn list_backups(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list backups: {}", dir.display()))? {
        let entry = entry.with_context(|| format!("list backups: {}", dir.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_backup_name(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names.into_iter().map(|n| dir.join(n)).collect())
}

/// Copy `source` into `dir` as a new backup stamped with `now`.
pub fn create_backup<Tz: TimeZone>(dir: &Path, source: &Path, now: &DateTime<Tz>) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    fs::create_dir_all(dir).with_context(|| format!("create backup dir: {}", dir.display()))?;

    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    let Some(target) = (0..MAX_SEQ_PER_SECOND)
        .map(|seq| dir.join(format!("{BACKUP_PREFIX}{stamp}_{seq:03}{BACKUP_EXT}")))
        .find(|p| !p.exists())
    else {
        bail!("more than {MAX_SEQ_PER_SECOND} backups stamped {stamp} in {}", dir.display());
    };

    fs::copy(source, &target).with_context(|| {
        format!("copy {} -> {}", source.display(), target.display())
    })?;
    info!(backup = %target.display(), "store/backup_created");
    Ok(target)
}

/// Delete all but the `keep` newest backups. Returns the removed paths,
/// oldest first. Running it again with the same `keep` removes nothing.
pub fn prune_backups(dir: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let backups = list_backups(dir)?;
    let excess = backups.len().saturating_sub(keep);
    let mut removed = Vec::with_capacity(excess);
    for old in backups.into_iter().take(excess) {
        fs::remove_file(&old).with_context(|| format!("remove backup: {}", old.display()))?;
        removed.push(old);
    }
    if !removed.is_empty() {
        info!(removed = removed.len(), kept = keep, "store/backups_pruned");
    }
    Ok(removed)
}
