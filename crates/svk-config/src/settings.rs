//! Typed settings with defaults for every key.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use svk_quality::QualityPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathsConfig,
    pub store: StoreConfig,
    pub quality: QualityConfig,
    pub ingest: IngestConfig,
}

/// File layout. `master_file`, `state_file` and `backup_dir` are relative to
/// `data_dir`; `report_dir` stands alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub master_file: String,
    pub state_file: String,
    pub backup_dir: String,
    pub report_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            master_file: "svk_master_data.csv".to_string(),
            state_file: "scraper_state.json".to_string(),
            backup_dir: "backups".to_string(),
            report_dir: PathBuf::from("reports"),
        }
    }
}

impl PathsConfig {
    pub fn master_path(&self) -> PathBuf {
        self.data_dir.join(&self.master_file)
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(&self.state_file)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.data_dir.join(&self.backup_dir)
    }

    pub fn report_path(&self) -> &Path {
        &self.report_dir
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backups kept after each save.
    pub backup_retention: usize,
    /// Write every produced batch as `raw_<timestamp>.csv` before merging.
    pub archive_raw_batches: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backup_retention: 5,
            archive_raw_batches: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub expected_hours_per_day: u32,
    pub coverage_days_back: u32,
    pub coverage_threshold_pct: f64,
    pub suspicious_high_mw: f64,
    pub value_columns: Vec<String>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        let p = QualityPolicy::default();
        Self {
            expected_hours_per_day: p.expected_hours_per_day,
            coverage_days_back: p.coverage_days_back,
            coverage_threshold_pct: p.coverage_threshold_pct,
            suspicious_high_mw: p.suspicious_high_mw,
            value_columns: p.value_columns,
        }
    }
}

impl QualityConfig {
    pub fn policy(&self) -> QualityPolicy {
        QualityPolicy {
            expected_hours_per_day: self.expected_hours_per_day,
            coverage_days_back: self.coverage_days_back,
            coverage_threshold_pct: self.coverage_threshold_pct,
            suspicious_high_mw: self.suspicious_high_mw,
            value_columns: self.value_columns.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Days requested by the daily plan, ending today.
    pub daily_days: u32,
    /// Trailing window the weekly plan scans for missing dates.
    pub weekly_days_back: u32,
    /// Most missing dates the weekly plan requests per run.
    pub weekly_max_dates: usize,
    /// Days requested by the custom plan when `--days` is not given.
    pub custom_days: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            daily_days: 3,
            weekly_days_back: 30,
            weekly_max_dates: 5,
            custom_days: 7,
        }
    }
}

impl Settings {
    /// Reject values no run could sensibly use.
    pub fn validate(&self) -> Result<()> {
        if self.paths.master_file.trim().is_empty() {
            bail!("paths.master_file must not be empty");
        }
        if self.paths.state_file.trim().is_empty() {
            bail!("paths.state_file must not be empty");
        }
        if self.store.backup_retention == 0 {
            bail!("store.backup_retention must be at least 1");
        }
        let q = &self.quality;
        if q.expected_hours_per_day == 0 {
            bail!("quality.expected_hours_per_day must be at least 1");
        }
        if !(0.0..=100.0).contains(&q.coverage_threshold_pct) {
            bail!(
                "quality.coverage_threshold_pct must be within 0..=100 (got {})",
                q.coverage_threshold_pct
            );
        }
        if !q.suspicious_high_mw.is_finite() {
            bail!("quality.suspicious_high_mw must be finite");
        }
        if self.ingest.daily_days == 0 {
            bail!("ingest.daily_days must be at least 1");
        }
        if self.ingest.custom_days == 0 {
            bail!("ingest.custom_days must be at least 1");
        }
        if self.ingest.weekly_max_dates == 0 {
            bail!("ingest.weekly_max_dates must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_layered_yaml_from_strings;

    #[test]
    fn no_layers_gives_defaults() {
        let s = load_layered_yaml_from_strings(&[]).unwrap().settings().unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.paths.master_path(), PathBuf::from("data/svk_master_data.csv"));
        assert_eq!(s.paths.state_path(), PathBuf::from("data/scraper_state.json"));
        assert_eq!(s.paths.backup_path(), PathBuf::from("data/backups"));
        assert_eq!(s.store.backup_retention, 5);
        assert_eq!(s.ingest.daily_days, 3);
        assert_eq!(s.quality.policy(), QualityPolicy::default());
    }

    #[test]
    fn partial_override_keeps_sibling_defaults() {
        let yaml = "paths:\n  data_dir: /srv/svk\nquality:\n  coverage_threshold_pct: 95\n";
        let s = load_layered_yaml_from_strings(&[yaml]).unwrap().settings().unwrap();
        assert_eq!(s.paths.master_path(), PathBuf::from("/srv/svk/svk_master_data.csv"));
        assert_eq!(s.quality.coverage_threshold_pct, 95.0);
        assert_eq!(s.quality.coverage_days_back, 30);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_retention = "store:\n  backup_retention: 0\n";
        let err = load_layered_yaml_from_strings(&[zero_retention])
            .unwrap()
            .settings()
            .unwrap_err();
        assert!(err.to_string().contains("backup_retention"));

        let threshold = "quality:\n  coverage_threshold_pct: 120\n";
        assert!(load_layered_yaml_from_strings(&[threshold])
            .unwrap()
            .settings()
            .is_err());
    }

    #[test]
    fn wrong_type_is_a_schema_error() {
        let yaml = "ingest:\n  daily_days: three\n";
        let err = load_layered_yaml_from_strings(&[yaml])
            .unwrap()
            .settings()
            .unwrap_err();
        assert!(err.to_string().contains("settings schema"));
    }
}
