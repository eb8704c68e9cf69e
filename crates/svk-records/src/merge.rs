//! Last-write-wins merge of an existing record set with a new batch.

use crate::record_set::RecordSet;

/// Merge `incoming` into `existing`.
///
/// - An empty side is the identity: the other side is returned unchanged.
/// - Otherwise rows are deduplicated by `(date, hour)`; on collision the row
///   that comes later in `existing ++ incoming` wins, so a re-scrape replaces
///   what was stored.
/// - The result is sorted ascending by key and has unique keys.
/// - The header is the union of both headers, `existing` order first.
pub fn merge(existing: RecordSet, incoming: RecordSet) -> RecordSet {
    if existing.is_empty() {
        return incoming;
    }
    if incoming.is_empty() {
        return existing;
    }

    let (mut columns, old_rows) = existing.into_parts();
    let (new_columns, new_rows) = incoming.into_parts();
    for col in new_columns {
        if !columns.contains(&col) {
            columns.push(col);
        }
    }

    RecordSet::new(columns, old_rows.into_iter().chain(new_rows).collect()).canonicalize()
}
