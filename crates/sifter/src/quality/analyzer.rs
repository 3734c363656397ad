//! Quality analysis of a cleaned table.

use std::collections::HashSet;

use crate::schema::{CleanedTable, ColumnProfile, NumericStatistics, TypeKind, Value};

use super::report::{ColumnQuality, QualityReport};

/// Computes completeness, confidence and distribution figures.
///
/// Pure and deterministic: statistics use exact percentiles over all values.
#[derive(Debug, Clone)]
pub struct QualityAnalyzer {
    /// IQR multiplier for outlier detection (1.5 for mild outliers).
    iqr_multiplier: f64,
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
        }
    }
}

impl QualityAnalyzer {
    /// Create an analyzer with the default IQR multiplier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the report for a cleaned table.
    ///
    /// `failures` holds the normalization failure count of each column, in
    /// column order.
    pub fn analyze(
        &self,
        table: &CleanedTable,
        profiles: &[ColumnProfile],
        failures: &[usize],
        source_record_count: usize,
        duplicates_removed: usize,
    ) -> QualityReport {
        let columns = profiles
            .iter()
            .enumerate()
            .map(|(idx, profile)| {
                let failed = failures.get(idx).copied().unwrap_or(0);
                self.analyze_column(table, idx, profile, failed)
            })
            .collect();

        QualityReport::new(
            columns,
            table.record_count(),
            source_record_count,
            duplicates_removed,
        )
    }

    fn analyze_column(
        &self,
        table: &CleanedTable,
        index: usize,
        profile: &ColumnProfile,
        failures: usize,
    ) -> ColumnQuality {
        let values: Vec<&Value> = table.column_values(index).flatten().collect();
        let total = table.record_count();
        let missing_count = total - values.len();
        let completeness = if total == 0 {
            1.0
        } else {
            1.0 - missing_count as f64 / total as f64
        };

        let distinct_count = values.iter().copied().collect::<HashSet<&Value>>().len();

        let kind = profile.kind();
        let (min, max) = if kind.is_ordinal() {
            extremes(&values)
        } else {
            (None, None)
        };

        let numeric = if kind.is_numeric() {
            let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
            NumericStatistics::from_values(&numbers)
        } else {
            None
        };

        let outlier_count = numeric.as_ref().map_or(0, |stats| {
            values
                .iter()
                .filter_map(|v| v.as_f64())
                .filter(|&v| stats.is_outlier_iqr(v, self.iqr_multiplier))
                .count()
        });

        ColumnQuality {
            profile: profile.clone(),
            completeness,
            missing_count,
            distinct_count,
            confidence: degraded_confidence(profile, failures),
            normalization_failures: failures,
            outlier_count,
            min,
            max,
            numeric,
        }
    }
}

/// Lower the inference confidence by the share of present cells that failed
/// to normalize, clamped to `[0, 1]`.
pub fn degraded_confidence(profile: &ColumnProfile, failures: usize) -> f64 {
    let present = profile.present_count();
    if present == 0 {
        return profile.confidence.clamp(0.0, 1.0);
    }
    let kept = 1.0 - failures as f64 / present as f64;
    (profile.confidence * kept).clamp(0.0, 1.0)
}

fn extremes(values: &[&Value]) -> (Option<Value>, Option<Value>) {
    let mut min: Option<&Value> = None;
    let mut max: Option<&Value> = None;
    for &value in values {
        if min.is_none_or(|m| value.compare(m) == Some(std::cmp::Ordering::Less)) {
            min = Some(value);
        }
        if max.is_none_or(|m| value.compare(m) == Some(std::cmp::Ordering::Greater)) {
            max = Some(value);
        }
    }
    (min.cloned(), max.cloned())
}
