//! The cleaned, typed table produced by a run.

use indexmap::IndexMap;
use serde::Serialize;

use super::types::InferredType;
use super::value::Value;

/// Column that records which file (and sheet) a batch record came from.
pub const PROVENANCE_COLUMN: &str = "source_file";

/// A cleaned table: raw columns with canonical values.
///
/// Same column names and order as the raw table it came from; may hold fewer
/// records because of deduplication. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedTable {
    columns: Vec<String>,
    types: Vec<InferredType>,
    records: Vec<Vec<Option<Value>>>,
}

impl CleanedTable {
    pub(crate) fn new(
        columns: Vec<String>,
        types: Vec<InferredType>,
        records: Vec<Vec<Option<Value>>>,
    ) -> Self {
        debug_assert_eq!(columns.len(), types.len());
        Self {
            columns,
            types,
            records,
        }
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Inferred type of each column, aligned with [`CleanedTable::columns`].
    pub fn column_types(&self) -> &[InferredType] {
        &self.types
    }

    /// All records, each aligned with the column list.
    pub fn records(&self) -> &[Vec<Option<Value>>] {
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

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.records.get(row)?.get(col)?.as_ref()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&Value>> {
        self.records
            .iter()
            .map(move |record| record.get(index).and_then(Option::as_ref))
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<Option<&Value>>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Tag every record with where it came from, in a trailing
    /// [`PROVENANCE_COLUMN`] of type text. An existing column of that name is
    /// overwritten in place. The origin is stored verbatim.
    pub fn with_provenance(mut self, origin: &str) -> Self {
        let value = Some(Value::Text(origin.to_string()));
        match self.column_index(PROVENANCE_COLUMN) {
            Some(index) => {
                self.types[index] = InferredType::Text;
                for record in &mut self.records {
                    record[index] = value.clone();
                }
            }
            None => {
                self.columns.push(PROVENANCE_COLUMN.to_string());
                self.types.push(InferredType::Text);
                for record in &mut self.records {
                    record.push(value.clone());
                }
            }
        }
        self
    }

    /// A record as an ordered column → value map.
    pub fn record_map(&self, row: usize) -> Option<IndexMap<&str, Option<&Value>>> {
        let record = self.records.get(row)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(record.iter().map(Option::as_ref))
                .collect(),
        )
    }
}
