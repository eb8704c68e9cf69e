//! Canonical CSV codec for record sets.
//!
//! ## File contract
//!
//! | Aspect      | Rule                                                        |
//! |-------------|-------------------------------------------------------------|
//! | Header      | First row; `Date` and `Timme` expected, other columns opaque |
//! | Encoding    | UTF-8; a leading byte-order mark is tolerated on read       |
//! | On write    | BOM + header + rows, in the set's current row order         |
//! | Ragged rows | Missing trailing cells read as null                         |
//!
//! A missing `Date`/`Timme` header is **not** a decode error: the quality
//! checks that need those columns report themselves as unable to run.

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use crate::record::Record;
use crate::record_set::RecordSet;
use crate::{DATE_COLUMN, HOUR_COLUMN};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced while reading or writing a record CSV.
#[derive(Debug)]
pub enum CsvStoreError {
    /// Filesystem failure.
    Io(String),
    /// The CSV layer rejected the input or output.
    Csv { row: Option<u64>, message: String },
    /// The input is not valid UTF-8.
    Encoding(String),
}

impl fmt::Display for CsvStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvStoreError::Io(msg) => write!(f, "csv io error: {msg}"),
            CsvStoreError::Csv {
                row: Some(row),
                message,
            } => write!(f, "csv error at row {row}: {message}"),
            CsvStoreError::Csv { row: None, message } => write!(f, "csv error: {message}"),
            CsvStoreError::Encoding(msg) => write!(f, "csv encoding error: {msg}"),
        }
    }
}

impl std::error::Error for CsvStoreError {}

impl From<csv::Error> for CsvStoreError {
    fn from(e: csv::Error) -> Self {
        let row = e.position().map(|p| p.line());
        CsvStoreError::Csv {
            row,
            message: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// Read a record CSV from `path`.
pub fn read_path(path: &Path) -> Result<RecordSet, CsvStoreError> {
    let bytes = std::fs::read(path)
        .map_err(|e| CsvStoreError::Io(format!("read '{}': {e}", path.display())))?;
    read_bytes(&bytes)
}

/// Read a record CSV from any reader.
pub fn read_from<R: Read>(mut reader: R) -> Result<RecordSet, CsvStoreError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| CsvStoreError::Io(e.to_string()))?;
    read_bytes(&bytes)
}

/// Parse from an in-memory string (tests, fixtures).
pub fn parse_str(src: &str) -> Result<RecordSet, CsvStoreError> {
    read_bytes(src.as_bytes())
}

fn read_bytes(bytes: &[u8]) -> Result<RecordSet, CsvStoreError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if std::str::from_utf8(bytes).is_err() {
        return Err(CsvStoreError::Encoding("input is not valid UTF-8".to_string()));
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(RecordSet::empty());
    }

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let mut record = Record::new("", "");
        for (i, col) in columns.iter().enumerate() {
            let cell = row.get(i).unwrap_or("");
            match col.as_str() {
                DATE_COLUMN | HOUR_COLUMN => record.set(col.as_str(), cell),
                _ if cell.is_empty() => {}
                _ => record.set(col.as_str(), cell),
            }
        }
        records.push(record);
    }

    Ok(RecordSet::new(columns, records))
}

// ---------------------------------------------------------------------------
// Write
// ---------------------------------------------------------------------------

/// Write `set` to `path` (BOM, header, rows). Overwrites.
pub fn write_path(path: &Path, set: &RecordSet) -> Result<(), CsvStoreError> {
    let file = std::fs::File::create(path)
        .map_err(|e| CsvStoreError::Io(format!("create '{}': {e}", path.display())))?;
    write_to(std::io::BufWriter::new(file), set)
}

/// Write `set` to any writer.
pub fn write_to<W: Write>(mut writer: W, set: &RecordSet) -> Result<(), CsvStoreError> {
    writer
        .write_all(UTF8_BOM)
        .map_err(|e| CsvStoreError::Io(e.to_string()))?;

    let columns: Vec<String> = if set.columns().is_empty() {
        vec![DATE_COLUMN.to_string(), HOUR_COLUMN.to_string()]
    } else {
        set.columns().to_vec()
    };

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&columns)?;
    for record in set {
        wtr.write_record(columns.iter().map(|col| cell_text(record, col)))?;
    }
    wtr.flush().map_err(|e| CsvStoreError::Io(e.to_string()))?;
    Ok(())
}

/// Render `set` to a string without the BOM.
pub fn to_csv_string(set: &RecordSet) -> Result<String, CsvStoreError> {
    let mut buf = Vec::new();
    write_to(&mut buf, set)?;
    let body = buf.strip_prefix(UTF8_BOM).unwrap_or(&buf);
    String::from_utf8(body.to_vec()).map_err(|e| CsvStoreError::Encoding(e.to_string()))
}

fn cell_text<'a>(record: &'a Record, column: &str) -> &'a str {
    match column {
        DATE_COLUMN => &record.date,
        HOUR_COLUMN => &record.hour,
        _ => record.fields.get(column).map(String::as_str).unwrap_or(""),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
