//! Schema types for inferred column types, profiles and cleaned tables.

mod column;
mod table;
mod types;
mod value;

pub use column::{ColumnProfile, NumericStatistics};
pub use table::{CleanedTable, PROVENANCE_COLUMN};
pub use types::{DateOrder, InferredType, NumberFormat, TypeKind};
pub use value::{DATE_FORMAT, DATETIME_FORMAT, Value};
