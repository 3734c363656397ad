//! Column profiles and statistics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{InferredType, TypeKind};

/// Outcome of type inference for one column.
///
/// Profiles are created once by the inferrer and never mutated; a new run
/// produces new profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name.
    pub name: String,
    /// Zero-based position in the table.
    pub position: usize,
    /// Type adopted for the whole column.
    pub inferred_type: InferredType,
    /// Share of sampled values that agreed with the adopted type (0.0-1.0).
    pub confidence: f64,
    /// Number of cells in the column, missing included.
    pub total_count: usize,
    /// Number of missing or blank cells.
    pub missing_count: usize,
    /// Number of non-missing values that went through the value parser.
    pub sampled_count: usize,
    /// Distinct trimmed values in the sample.
    pub distinct_count: usize,
    /// Sampled values whose parse was ambiguous.
    pub ambiguous_count: usize,
    /// Winning kind per sampled value, in candidate order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tallies: IndexMap<TypeKind, usize>,
}

impl ColumnProfile {
    /// Profile for a column with no usable values.
    pub fn empty(name: impl Into<String>, position: usize, total_count: usize) -> Self {
        Self {
            name: name.into(),
            position,
            inferred_type: InferredType::Text,
            confidence: 0.0,
            total_count,
            missing_count: total_count,
            sampled_count: 0,
            distinct_count: 0,
            ambiguous_count: 0,
            tallies: IndexMap::new(),
        }
    }

    /// Kind of the adopted type.
    pub fn kind(&self) -> TypeKind {
        self.inferred_type.kind()
    }

    /// Number of cells holding a value in the raw column.
    pub fn present_count(&self) -> usize {
        self.total_count - self.missing_count
    }

    /// Tally recorded for a kind.
    pub fn tally(&self, kind: TypeKind) -> usize {
        self.tallies.get(&kind).copied().unwrap_or(0)
    }
}

/// Statistics for numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
}

impl NumericStatistics {
    /// Compute exact statistics over a set of values.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            std: variance.sqrt(),
            median: percentile(&sorted, 50.0),
            q1: percentile(&sorted, 25.0),
            q3: percentile(&sorted, 75.0),
        })
    }

    /// Calculate the interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Check if a value is an outlier using the IQR method.
    pub fn is_outlier_iqr(&self, value: f64, multiplier: f64) -> bool {
        let iqr = self.iqr();
        let lower = self.q1 - multiplier * iqr;
        let upper = self.q3 + multiplier * iqr;
        value < lower || value > upper
    }
}

/// Nearest-rank percentile of an already sorted, non-empty slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_statistics() {
        let stats = NumericStatistics::from_values(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert!((stats.std - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_outlier_iqr() {
        let stats = NumericStatistics::from_values(&[10.0, 11.0, 12.0, 13.0, 14.0]).unwrap();
        assert!(!stats.is_outlier_iqr(12.0, 1.5));
        assert!(stats.is_outlier_iqr(100.0, 1.5));
        assert!(stats.is_outlier_iqr(-50.0, 1.5));
    }

    #[test]
    fn test_empty_values() {
        assert!(NumericStatistics::from_values(&[]).is_none());
    }

    #[test]
    fn test_empty_profile() {
        let profile = ColumnProfile::empty("notes", 2, 4);
        assert_eq!(profile.kind(), TypeKind::Text);
        assert_eq!(profile.confidence, 0.0);
        assert_eq!(profile.present_count(), 0);
        assert_eq!(profile.tally(TypeKind::Integer), 0);
    }
}
