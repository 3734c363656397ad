//! Quality report types.

use serde::Serialize;

use crate::schema::{ColumnProfile, InferredType, NumericStatistics, Value};

/// Quality figures for one cleaned column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnQuality {
    /// Inference outcome the column was normalized with.
    pub profile: ColumnProfile,
    /// Share of cleaned records holding a value (0.0-1.0).
    pub completeness: f64,
    /// Missing cells in the cleaned column.
    pub missing_count: usize,
    /// Distinct canonical values.
    pub distinct_count: usize,
    /// Inference confidence lowered by normalization failures.
    pub confidence: f64,
    /// Cells that did not fit the inferred type.
    pub normalization_failures: usize,
    /// Values outside the IQR fences (numeric columns only).
    pub outlier_count: usize,
    /// Smallest value, for numeric and date columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    /// Largest value, for numeric and date columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    /// Summary statistics, for numeric columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStatistics>,
}

impl ColumnQuality {
    /// Column name.
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Adopted column type.
    pub fn inferred_type(&self) -> &InferredType {
        &self.profile.inferred_type
    }
}

/// Quality report for a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    columns: Vec<ColumnQuality>,
    record_count: usize,
    source_record_count: usize,
    duplicates_removed: usize,
    overall_completeness: f64,
}

impl QualityReport {
    pub(crate) fn new(
        columns: Vec<ColumnQuality>,
        record_count: usize,
        source_record_count: usize,
        duplicates_removed: usize,
    ) -> Self {
        let overall_completeness = if columns.is_empty() {
            1.0
        } else {
            columns.iter().map(|c| c.completeness).sum::<f64>() / columns.len() as f64
        };

        Self {
            columns,
            record_count,
            source_record_count,
            duplicates_removed,
            overall_completeness,
        }
    }

    /// Per-column figures, in table order.
    pub fn columns(&self) -> &[ColumnQuality] {
        &self.columns
    }

    /// Figures for one column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnQuality> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Records in the cleaned table.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Records in the raw table.
    pub fn source_record_count(&self) -> usize {
        self.source_record_count
    }

    /// Records dropped as duplicates.
    pub fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }

    /// Mean column completeness (1.0 when there are no columns).
    pub fn overall_completeness(&self) -> f64 {
        self.overall_completeness
    }

    /// Total normalization failures across all columns.
    pub fn normalization_failures(&self) -> usize {
        self.columns.iter().map(|c| c.normalization_failures).sum()
    }
}
