//! Descriptive statistics and plausibility counts per value column.

use std::collections::BTreeMap;

use serde::Serialize;
use svk_records::RecordSet;

/// Statistics over the cells of one column that coerce to a finite number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueStats {
    /// Number of values the statistics were computed over.
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1); `None` with fewer than two values.
    pub std: Option<f64>,
    /// Values strictly below zero. Implausible for MW magnitudes.
    pub negative_count: usize,
    /// Values strictly above the suspicious-high bound. Informational.
    pub suspicious_high_count: usize,
}

impl ValueStats {
    fn from_values(values: &[f64], suspicious_high: f64) -> Option<Self> {
        let (&first, rest) = values.split_first()?;
        let (mut min, mut max, mut sum) = (first, first, first);
        for &v in rest {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        let n = values.len();
        let mean = sum / n as f64;
        let std = (n >= 2).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        });
        Some(Self {
            count: n,
            min,
            max,
            mean,
            std,
            negative_count: values.iter().filter(|v| **v < 0.0).count(),
            suspicious_high_count: values.iter().filter(|v| **v > suspicious_high).count(),
        })
    }
}

/// Statistics for each of `columns` present in `set`.
///
/// Cells that are null or do not coerce to a number are dropped here; the
/// missing-values check is where they become visible. Columns with no valid
/// value (or absent from the header) are omitted.
pub fn analyze(
    set: &RecordSet,
    columns: &[String],
    suspicious_high: f64,
) -> BTreeMap<String, ValueStats> {
    let mut out = BTreeMap::new();
    for column in columns {
        if !set.has_column(column) {
            continue;
        }
        let values: Vec<f64> = set.iter().filter_map(|r| r.numeric(column)).collect();
        if let Some(stats) = ValueStats::from_values(&values, suspicious_high) {
            out.insert(column.clone(), stats);
        }
    }
    out
}
