//! Sifter: type inference, normalization and quality analysis for messy tables.
//!
//! Sifter takes a raw table of optional text cells with an unknown or
//! inconsistent schema and turns it into a cleaned, typed, de-duplicated
//! table plus a data quality report.
//!
//! # Core Principles
//!
//! - **Column-level decisions**: each column gets exactly one type, chosen by
//!   plurality over a sample of its values
//! - **Messy data is not an error**: values that do not fit become missing and
//!   lower the column's confidence instead of failing the run
//! - **Deterministic**: the same table and options always give the same output
//!
//! # Example
//!
//! ```no_run
//! use sifter::input::{LoaderConfig, load_path};
//! use sifter::{ProcessOptions, process};
//!
//! let loaded = load_path("customers.csv", &LoaderConfig::default()).unwrap();
//! let options = ProcessOptions::default().with_key_columns(["email"]);
//! let output = process(&loaded[0].table, &options).unwrap();
//!
//! println!("Records: {}", output.cleaned.record_count());
//! println!("Completeness: {:.2}", output.report.overall_completeness());
//! ```

pub mod error;
pub mod inference;
pub mod input;
pub mod pipeline;
pub mod quality;
pub mod schema;
pub mod transform;

mod text;

pub use error::{Result, SifterError};
pub use inference::{ColumnInferrer, InferenceConfig, ParsedValue, ValueParser};
pub use input::{LoadedTable, RawTable, SourceMetadata};
pub use pipeline::{CancellationToken, Pipeline, ProcessOptions, ProcessOutput, process};
pub use quality::{ColumnQuality, QualityAnalyzer, QualityReport};
pub use schema::{
    CleanedTable, ColumnProfile, InferredType, NumberFormat, PROVENANCE_COLUMN, TypeKind, Value,
};
pub use transform::{CasePolicy, DedupPolicy, Deduplicator, Normalizer};
