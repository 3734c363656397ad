//! Raw tables and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, json, etc.).
    pub format: String,
    /// Encoding the text was decoded with.
    pub encoding: String,
    /// Worksheet the table was read from, for workbooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Number of data records (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a loaded file.
    pub fn new(path: PathBuf, contents: &[u8], format: impl Into<String>, table: &RawTable) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash: content_hash(contents),
            size_bytes: contents.len() as u64,
            format: format.into(),
            encoding: "utf-8".to_string(),
            sheet: None,
            row_count: table.record_count(),
            column_count: table.column_count(),
            loaded_at: Utc::now(),
        }
    }

    /// Set the encoding.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Set the worksheet name.
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Where the table came from: `file`, or `file:sheet` for workbooks.
    pub fn origin(&self) -> String {
        match &self.sheet {
            Some(sheet) => format!("{}:{}", self.file, sheet),
            None => self.file.clone(),
        }
    }
}

/// A raw table together with the metadata of its source.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: RawTable,
    pub source: SourceMetadata,
}

impl LoadedTable {
    /// Pair a table with its source.
    pub fn new(table: RawTable, source: SourceMetadata) -> Self {
        Self { table, source }
    }

    /// Split into the table and its source.
    pub fn into_parts(self) -> (RawTable, SourceMetadata) {
        (self.table, self.source)
    }
}

/// SHA-256 of some bytes, as `sha256:<hex>`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// A raw table of optional text cells, as handed over by a loader.
///
/// Records are stored positionally, aligned with the column list. Short
/// records are padded with missing cells and long ones truncated. Column
/// names are not checked here; the pipeline rejects invalid headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    records: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Create a table from positional records.
    pub fn new(columns: Vec<String>, records: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let records = records
            .into_iter()
            .map(|mut record| {
                record.resize(width, None);
                record
            })
            .collect();
        Self { columns, records }
    }

    /// Create a table from records keyed by column name. Keys absent from a
    /// record are missing cells; keys not in `columns` are ignored.
    pub fn from_maps(columns: Vec<String>, records: Vec<IndexMap<String, Option<String>>>) -> Self {
        let records = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|c| record.swap_remove(c).flatten())
                    .collect()
            })
            .collect();
        Self { columns, records }
    }

    /// Build a table from string literals, mostly for tests and examples.
    pub fn from_rows<S: AsRef<str>>(columns: &[&str], rows: &[Vec<Option<S>>]) -> Self {
        Self::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| cell.as_ref().map(|s| s.as_ref().to_string()))
                        .collect()
                })
                .collect(),
        )
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All records, each aligned with the column list.
    pub fn records(&self) -> &[Vec<Option<String>>] {
        &self.records
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> Vec<Option<&str>> {
        self.records
            .iter()
            .map(|record| record.get(index).and_then(|v| v.as_deref()))
            .collect()
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.column_values(index))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.records.get(row)?.get(col)?.as_deref()
    }

    /// A record as an ordered column → value map.
    pub fn record(&self, row: usize) -> Option<IndexMap<&str, Option<&str>>> {
        let record = self.records.get(row)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(record.iter().map(|v| v.as_deref()))
                .collect(),
        )
    }
}
