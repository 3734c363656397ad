//! Removal of repeated records.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SifterError};
use crate::schema::Value;

/// Which columns define a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Two records are duplicates when every column matches.
    #[default]
    AllColumns,
    /// Two records are duplicates when the named columns match.
    KeyColumns(Vec<String>),
}

/// Records that survived deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupResult {
    /// Kept records, in their original order.
    pub records: Vec<Vec<Option<Value>>>,
    /// Number of records dropped.
    pub removed: usize,
}

/// Keeps the first record of every key tuple.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    key_indices: Vec<usize>,
}

impl Deduplicator {
    /// Resolve a policy against the table's columns.
    pub fn new(columns: &[String], policy: &DedupPolicy) -> Result<Self> {
        let key_indices = match policy {
            DedupPolicy::AllColumns => (0..columns.len()).collect(),
            DedupPolicy::KeyColumns(keys) => {
                if keys.is_empty() {
                    return Err(SifterError::Config(
                        "key column list is empty".to_string(),
                    ));
                }
                let mut indices = Vec::with_capacity(keys.len());
                for key in keys {
                    let idx = columns.iter().position(|c| c == key).ok_or_else(|| {
                        SifterError::Config(format!("unknown key column '{}'", key))
                    })?;
                    if indices.contains(&idx) {
                        return Err(SifterError::Config(format!(
                            "key column '{}' is listed twice",
                            key
                        )));
                    }
                    indices.push(idx);
                }
                indices
            }
        };

        Ok(Self { key_indices })
    }

    /// Column positions that form the key.
    pub fn key_indices(&self) -> &[usize] {
        &self.key_indices
    }

    /// Drop every record whose key equals an earlier record's key.
    ///
    /// Missing matches missing.
    pub fn dedup(&self, records: Vec<Vec<Option<Value>>>) -> DedupResult {
        let keep: Vec<bool> = {
            let mut seen: HashSet<Vec<Option<&Value>>> = HashSet::with_capacity(records.len());
            records
                .iter()
                .map(|record| {
                    let key = self
                        .key_indices
                        .iter()
                        .map(|&idx| record.get(idx).and_then(Option::as_ref))
                        .collect();
                    seen.insert(key)
                })
                .collect()
        };

        let removed = keep.iter().filter(|k| !**k).count();
        let records = records
            .into_iter()
            .zip(keep)
            .filter_map(|(record, keep)| keep.then_some(record))
            .collect();

        DedupResult { records, removed }
    }
}
