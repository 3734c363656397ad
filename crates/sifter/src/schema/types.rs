//! Core type definitions for inferred column types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Decimal convention used to read a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// `1,234.56`
    #[default]
    DecimalPoint,
    /// `1.234,56`
    DecimalComma,
}

impl NumberFormat {
    /// Conventions in the order they are attempted.
    pub const ALL: [NumberFormat; 2] = [NumberFormat::DecimalPoint, NumberFormat::DecimalComma];

    /// Character grouping thousands under this convention.
    pub fn thousands_separator(self) -> char {
        match self {
            NumberFormat::DecimalPoint => ',',
            NumberFormat::DecimalComma => '.',
        }
    }

    /// Character separating the fractional part under this convention.
    pub fn decimal_separator(self) -> char {
        match self {
            NumberFormat::DecimalPoint => '.',
            NumberFormat::DecimalComma => ',',
        }
    }

    /// The opposite convention.
    pub fn other(self) -> NumberFormat {
        match self {
            NumberFormat::DecimalPoint => NumberFormat::DecimalComma,
            NumberFormat::DecimalComma => NumberFormat::DecimalPoint,
        }
    }
}

/// Field order of a date pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// Year first (ISO 8601 and `YYYY/MM/DD`).
    Iso,
    /// Day, month, year.
    DayFirst,
    /// Month, day, year.
    MonthFirst,
    /// Month spelled out.
    Textual,
}

/// Kind of an inferred type, without its parse details.
///
/// The declaration order is the candidate order used by the inferrer and
/// doubles as the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Integer,
    Float,
    Boolean,
    Date,
    Categorical,
    Text,
}

impl TypeKind {
    /// Candidate order tried against every sampled value.
    pub const CANDIDATES: [TypeKind; 5] = [
        TypeKind::Integer,
        TypeKind::Float,
        TypeKind::Boolean,
        TypeKind::Date,
        TypeKind::Categorical,
    ];

    /// Returns true if this kind is numeric.
    pub fn is_numeric(self) -> bool {
        matches!(self, TypeKind::Integer | TypeKind::Float)
    }

    /// Returns true if values of this kind have a meaningful order.
    pub fn is_ordinal(self) -> bool {
        matches!(self, TypeKind::Integer | TypeKind::Float | TypeKind::Date)
    }

    /// Lowercase name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Integer => "integer",
            TypeKind::Float => "float",
            TypeKind::Boolean => "boolean",
            TypeKind::Date => "date",
            TypeKind::Categorical => "categorical",
            TypeKind::Text => "text",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inferred data type for a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InferredType {
    /// Whole numbers, read under the given convention.
    Integer { format: NumberFormat },
    /// Decimal numbers, read under the given convention.
    Float { format: NumberFormat },
    /// Calendar dates, read with a chrono format pattern.
    Date { pattern: String, has_time: bool },
    /// Two-valued flags.
    Boolean,
    /// Low-cardinality text.
    Categorical,
    /// Free text.
    Text,
}

impl InferredType {
    /// The kind of this type.
    pub fn kind(&self) -> TypeKind {
        match self {
            InferredType::Integer { .. } => TypeKind::Integer,
            InferredType::Float { .. } => TypeKind::Float,
            InferredType::Date { .. } => TypeKind::Date,
            InferredType::Boolean => TypeKind::Boolean,
            InferredType::Categorical => TypeKind::Categorical,
            InferredType::Text => TypeKind::Text,
        }
    }
}

impl Default for InferredType {
    fn default() -> Self {
        InferredType::Text
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferredType::Date { pattern, .. } => write!(f, "date ({pattern})"),
            other => f.write_str(other.kind().name()),
        }
    }
}
