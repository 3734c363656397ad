//! Normalization and deduplication of parsed columns.

mod dedup;
mod normalize;

pub use dedup::{DedupPolicy, DedupResult, Deduplicator};
pub use normalize::{CasePolicy, NormalizeOutcome, NormalizedColumn, Normalizer};
