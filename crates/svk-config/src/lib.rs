//! svk-config
//!
//! Layered YAML configuration.
//!
//! - YAML documents merge in order (later layers override earlier ones)
//! - the merged tree is converted to JSON, canonicalised, and hashed with
//!   SHA-256 so every artifact can record which configuration produced it
//! - the tree then deserialises into typed [`Settings`]; every key has a
//!   default, so no files at all is a valid configuration
//! - leaves that no setting reads are reported by [`report_unused_keys`]

pub mod settings;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub use settings::{IngestConfig, PathsConfig, QualityConfig, Settings, StoreConfig};

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed view of the merged tree, validated.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = serde_json::from_value(self.config_json.clone())
            .context("config does not match the settings schema")?;
        settings.validate()?;
        Ok(settings)
    }
}

pub fn load_layered_yaml<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let p = p.as_ref();
        let raw = fs::read_to_string(p)
            .with_context(|| format!("failed to read yaml path: {}", p.display()))?;
        docs.push(raw);
    }
    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        // An empty document parses as null; treat it as an empty layer.
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        if !v_json.is_object() {
            bail!("config layer must be a mapping at the top level");
        }
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

/// Compact JSON with keys in sorted order (serde_json's default map).
fn canonicalize_json(v: &Value) -> Result<String> {
    serde_json::to_string(v).context("canonical json serialize failed")
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Unused-key guard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Minimal set of unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// JSON-pointer prefixes read by [`Settings`].
pub const CONSUMED_POINTERS: &[&str] = &[
    "/paths/data_dir",
    "/paths/master_file",
    "/paths/state_file",
    "/paths/backup_dir",
    "/paths/report_dir",
    "/store/backup_retention",
    "/store/archive_raw_batches",
    "/quality/expected_hours_per_day",
    "/quality/coverage_days_back",
    "/quality/coverage_threshold_pct",
    "/quality/suspicious_high_mw",
    "/quality/value_columns",
    "/ingest/daily_days",
    "/ingest/weekly_days_back",
    "/ingest/weekly_max_dates",
    "/ingest/custom_days",
];

/// Leaves of `config_json` not under any [`CONSUMED_POINTERS`] prefix.
/// With `UnusedKeyPolicy::Fail`, any such leaf is an error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let unused: BTreeSet<String> = leaves
        .into_iter()
        .filter(|lp| !CONSUMED_POINTERS.iter().any(|cp| is_prefix_pointer(cp, lp)))
        .collect();

    let report = UnusedKeyReport {
        unused_leaf_pointers: unused.into_iter().collect(),
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. First few: {}",
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }
    Ok(report)
}

/// `"/a/b"` is a prefix of `"/a/b"` and `"/a/b/c"` but not `"/a/bc"`.
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, vv) in map {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (i, vv) in arr.iter().enumerate() {
                collect_leaf_pointers(vv, &format!("{prefix}/{i}"), out);
            }
        }
        _ => {
            if !prefix.is_empty() {
                out.push(prefix.to_string());
            }
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    format!("{:?}", items.iter().take(n).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_override_earlier() {
        let base = "quality:\n  coverage_days_back: 30\n  suspicious_high_mw: 50000\n";
        let overlay = "quality:\n  coverage_days_back: 14\n";
        let loaded = load_layered_yaml_from_strings(&[base, overlay]).unwrap();
        assert_eq!(loaded.config_json["quality"]["coverage_days_back"], 14);
        assert_eq!(loaded.config_json["quality"]["suspicious_high_mw"], 50000);
    }

    #[test]
    fn empty_layers_are_ignored() {
        let loaded = load_layered_yaml_from_strings(&["", "# only a comment\n"]).unwrap();
        assert_eq!(loaded.canonical_json, "{}");
    }

    #[test]
    fn scalar_top_level_is_rejected() {
        assert!(load_layered_yaml_from_strings(&["42"]).is_err());
    }

    #[test]
    fn prefix_boundaries() {
        assert!(is_prefix_pointer("/quality/value_columns", "/quality/value_columns/0"));
        assert!(is_prefix_pointer("/paths/data_dir", "/paths/data_dir"));
        assert!(!is_prefix_pointer("/paths/data_dir", "/paths/data_dirs"));
    }

    #[test]
    fn sha256_of_empty_object() {
        assert_eq!(
            sha256_hex(b"{}"),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }
}
