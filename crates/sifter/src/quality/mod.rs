//! Data quality analysis of cleaned tables.

mod analyzer;
mod report;

pub use analyzer::{QualityAnalyzer, degraded_confidence};
pub use report::{ColumnQuality, QualityReport};
