//! JSON loader for arrays of flat objects.

use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{Result, SifterError};
use super::source::{RawTable, SourceMetadata};

/// Loads a JSON array of objects, or a single object, into a raw table.
///
/// Columns appear in first-seen order across all records. `null` becomes a
/// missing cell, strings are kept verbatim, other scalars are rendered as
/// text and nested values as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl JsonLoader {
    /// Create a new JSON loader.
    pub fn new() -> Self {
        Self
    }

    /// Load a file and return the raw table and metadata.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<(RawTable, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| SifterError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let document: JsonValue = serde_json::from_slice(&contents)?;
        let table = self.load_value(document)?;

        debug!(
            path = %path.display(),
            records = table.record_count(),
            columns = table.column_count(),
            "loaded json file"
        );

        let metadata = SourceMetadata::new(path.to_path_buf(), &contents, "json", &table);
        Ok((table, metadata))
    }

    /// Load JSON text that is already in memory.
    pub fn load_text(&self, text: &str) -> Result<RawTable> {
        let document: JsonValue = serde_json::from_str(text)?;
        self.load_value(document)
    }

    /// Build a raw table from a parsed JSON document.
    pub fn load_value(&self, document: JsonValue) -> Result<RawTable> {
        let objects = match document {
            JsonValue::Array(items) => items,
            object @ JsonValue::Object(_) => vec![object],
            other => {
                return Err(SifterError::UnsupportedFormat(format!(
                    "expected a JSON array of objects, found {}",
                    kind_name(&other)
                )));
            }
        };

        let mut columns: IndexSet<String> = IndexSet::new();
        let mut records = Vec::with_capacity(objects.len());

        for (idx, item) in objects.into_iter().enumerate() {
            let map = match item {
                JsonValue::Object(map) => map,
                other => {
                    return Err(SifterError::UnsupportedFormat(format!(
                        "record {} is {}, expected an object",
                        idx,
                        kind_name(&other)
                    )));
                }
            };

            let record: IndexMap<String, Option<String>> = map
                .into_iter()
                .map(|(key, value)| {
                    columns.insert(key.clone());
                    (key, cell_text(value))
                })
                .collect();
            records.push(record);
        }

        if columns.is_empty() {
            return Err(SifterError::EmptyData("No columns found".to_string()));
        }

        Ok(RawTable::from_maps(columns.into_iter().collect(), records))
    }
}

fn cell_text(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

fn kind_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_in_first_seen_order() {
        let table = JsonLoader::new()
            .load_text(r#"[{"b": 1, "a": "x"}, {"c": true, "a": null}]"#)
            .unwrap();
        assert_eq!(table.columns(), ["b", "a", "c"]);
        assert_eq!(table.get(0, 0), Some("1"));
        assert_eq!(table.get(0, 2), None);
        assert_eq!(table.get(1, 1), None);
        assert_eq!(table.get(1, 2), Some("true"));
    }

    #[test]
    fn test_single_object() {
        let table = JsonLoader::new().load_text(r#"{"a": "João"}"#).unwrap();
        assert_eq!(table.record_count(), 1);
        assert_eq!(table.get(0, 0), Some("João"));
    }

    #[test]
    fn test_nested_values_rendered_as_json() {
        let table = JsonLoader::new()
            .load_text(r#"[{"tags": ["a", "b"]}]"#)
            .unwrap();
        assert_eq!(table.get(0, 0), Some(r#"["a","b"]"#));
    }

    #[test]
    fn test_rejects_scalars() {
        let err = JsonLoader::new().load_text("42").unwrap_err();
        assert!(matches!(err, SifterError::UnsupportedFormat(_)));

        let err = JsonLoader::new().load_text("[1, 2]").unwrap_err();
        assert!(matches!(err, SifterError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_empty_array_is_empty_data() {
        let err = JsonLoader::new().load_text("[]").unwrap_err();
        assert!(matches!(err, SifterError::EmptyData(_)));
    }
}
