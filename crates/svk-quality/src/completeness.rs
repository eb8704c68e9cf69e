//! Missing cells and duplicate identity keys.

use std::collections::BTreeMap;

use serde::Serialize;
use svk_records::{parse_hour, parse_number, RecordKey, RecordSet, DATE_COLUMN, HOUR_COLUMN};

/// An identity key that appears more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Display form of the key, e.g. `(2024-01-01, 5)`.
    pub key: String,
    /// Rows sharing the key (always >= 2).
    pub count: usize,
}

/// Per-column count of null or unusable cells, over every column in the header.
///
/// - every column counts null (absent or blank) cells
/// - `Timme` and the `value_columns` also count cells that fail coercion
/// - a non-empty `Date` that does not parse is not counted here; it has its
///   own anomaly class
///
/// Only columns with a non-zero count appear in the result.
pub fn missing_values(set: &RecordSet, value_columns: &[String]) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for column in set.columns() {
        let is_hour = column == HOUR_COLUMN;
        let is_value = column != DATE_COLUMN && value_columns.iter().any(|c| c == column);

        let missing = set
            .iter()
            .filter(|r| match r.cell(column) {
                None => true,
                Some(cell) if is_hour => parse_hour(cell).is_none(),
                Some(cell) if is_value => parse_number(cell).is_none(),
                Some(_) => false,
            })
            .count();
        if missing > 0 {
            out.insert(column.clone(), missing);
        }
    }
    out
}

fn key_counts(set: &RecordSet) -> BTreeMap<RecordKey, usize> {
    let mut counts: BTreeMap<RecordKey, usize> = BTreeMap::new();
    for r in set {
        *counts.entry(r.key()).or_insert(0) += 1;
    }
    counts
}

/// Rows that share their identity key with at least one other row.
///
/// Every member of a duplicate group counts, so two rows with the same
/// `(date, hour)` give `2`, not `1`.
pub fn duplicate_count(set: &RecordSet) -> usize {
    key_counts(set).into_values().filter(|c| *c >= 2).sum()
}

/// Duplicate groups, sorted by key.
pub fn duplicate_groups(set: &RecordSet) -> Vec<DuplicateGroup> {
    key_counts(set)
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(key, count)| DuplicateGroup {
            key: key.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use svk_records::{Record, CONSUMPTION_COLUMN, FORECAST_COLUMN};

    fn value_cols() -> Vec<String> {
        vec![FORECAST_COLUMN.to_string(), CONSUMPTION_COLUMN.to_string()]
    }

    fn row(date: &str, hour: &str, forecast: &str, consumption: &str) -> Record {
        Record::new(date, hour)
            .with_field(FORECAST_COLUMN, forecast)
            .with_field(CONSUMPTION_COLUMN, consumption)
    }

    #[test]
    fn two_rows_sharing_a_key_count_as_two() {
        let set = RecordSet::from_records(vec![
            row("2024-01-01", "0", "1", "1"),
            row("2024-01-01", "1", "1", "1"),
            row("2024-01-01", "1", "2", "2"),
        ]);
        assert_eq!(duplicate_count(&set), 2);
        assert_eq!(
            duplicate_groups(&set),
            vec![DuplicateGroup {
                key: "(2024-01-01, 1)".to_string(),
                count: 2,
            }]
        );
    }

    #[test]
    fn triple_counts_all_members() {
        let set = RecordSet::from_records(vec![
            row("2024-01-01", "3", "1", "1"),
            row("2024-01-01", "03", "1", "1"),
            row("2024-01-01 00:00", "3", "1", "1"),
        ]);
        assert_eq!(duplicate_count(&set), 3);
    }

    #[test]
    fn unique_keys_have_no_duplicates() {
        let set = RecordSet::from_records(vec![
            row("2024-01-01", "0", "1", "1"),
            row("2024-01-02", "0", "1", "1"),
        ]);
        assert_eq!(duplicate_count(&set), 0);
        assert!(duplicate_groups(&set).is_empty());
    }

    #[test]
    fn clean_rows_have_no_missing_values() {
        let set = RecordSet::from_records(vec![row("2024-01-01", "0", "1", "2")]);
        assert!(missing_values(&set, &value_cols()).is_empty());
    }

    #[test]
    fn null_and_unparseable_cells_are_counted() {
        let set = RecordSet::from_records(vec![
            row("2024-01-01", "0", "", "2"),
            row("2024-01-01", "x", "n/a", "3"),
            row("", "2", "1", "NaN"),
            row("junk", "3", "1", "4"),
            Record::new("2024-01-01", "4").with_field("Område", "SE3"),
        ]);
        let m = missing_values(&set, &value_cols());
        assert_eq!(m.get(FORECAST_COLUMN), Some(&3));
        assert_eq!(m.get(CONSUMPTION_COLUMN), Some(&2));
        assert_eq!(m.get(HOUR_COLUMN), Some(&1));
        assert_eq!(m.get(DATE_COLUMN), Some(&1));
        assert_eq!(m.get("Område"), Some(&4));
    }

    #[test]
    fn opaque_columns_only_count_nulls() {
        let set = RecordSet::from_records(vec![
            Record::new("2024-01-01", "0").with_field("Område", "not a number"),
        ]);
        assert!(missing_values(&set, &value_cols()).is_empty());
    }
}
