//! The in-memory table of records plus its header.
//!
//! A `RecordSet` read from disk or produced by a scrape may hold duplicate
//! keys in any order. Only [`crate::merge`] output is guaranteed canonical
//! (unique keys, ascending `(date, hour)`); [`RecordSet::is_canonical`]
//! checks that.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::record::{Record, RecordKey};
use crate::{DATE_COLUMN, HOUR_COLUMN};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordSet {
    /// Build from an explicit header and rows. The header is kept as given;
    /// field columns used by rows but missing from the header are appended.
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut set = Self {
            columns,
            records: Vec::with_capacity(records.len()),
        };
        for r in records {
            set.push(r);
        }
        set
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from rows alone. The header is `Date, Timme` followed by field
    /// columns in first-seen order.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(
            vec![DATE_COLUMN.to_string(), HOUR_COLUMN.to_string()],
            records,
        )
    }

    pub fn push(&mut self, record: Record) {
        for col in record.fields.keys() {
            if !self.columns.iter().any(|c| c == col) {
                self.columns.push(col.clone());
            }
        }
        self.records.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// A set with no rows is empty, whatever its header.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Record>) {
        (self.columns, self.records)
    }

    /// Distinct parseable dates, ascending.
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.records.iter().filter_map(Record::parsed_date).collect()
    }

    /// `(min, max)` over parseable dates, or `None` when there are none.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.dates();
        Some((*dates.first()?, *dates.last()?))
    }

    /// Rows whose date parses and falls in `[start, end]`, header preserved.
    pub fn filter_dates(&self, start: NaiveDate, end: NaiveDate) -> RecordSet {
        let records = self
            .records
            .iter()
            .filter(|r| matches!(r.parsed_date(), Some(d) if d >= start && d <= end))
            .cloned()
            .collect();
        RecordSet {
            columns: self.columns.clone(),
            records,
        }
    }

    /// `true` when keys are strictly increasing (sorted and unique).
    pub fn is_canonical(&self) -> bool {
        self.records.windows(2).all(|w| w[0].key() < w[1].key())
    }

    /// Deduplicate by `(date, hour)`, keeping the last occurrence of each
    /// key, and sort ascending. The header is kept. A canonical set comes
    /// back unchanged.
    pub fn canonicalize(self) -> RecordSet {
        // BTreeMap: insert replaces on equal key, iteration is key-ascending.
        let mut latest: BTreeMap<RecordKey, Record> = BTreeMap::new();
        for record in self.records {
            latest.insert(record.key(), record);
        }
        RecordSet {
            columns: self.columns,
            records: latest.into_values().collect(),
        }
    }

    /// `true` when no identity key appears twice.
    pub fn has_unique_keys(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.records.len());
        self.records.iter().all(|r| seen.insert(r.key()))
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
