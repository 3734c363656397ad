//! Type inference for single values and whole columns.

mod column;
pub(crate) mod value;

pub use column::{ColumnInferrer, InferenceConfig};
pub use value::{
    AMBIGUOUS_CONFIDENCE, DATE_PATTERNS, DatePattern, ParseRule, ParsedValue, ValueParser,
    YEAR_LIKE_CONFIDENCE, date_pattern,
};
