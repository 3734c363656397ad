//! Value normalization into canonical forms.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inference::{DATE_PATTERNS, DatePattern, date_pattern};
use crate::inference::value::{Number, read_boolean, read_date, read_number, read_plain_number};
use crate::schema::{ColumnProfile, DateOrder, InferredType, NumberFormat, Value};
use crate::text::{collapse_whitespace, strip_diacritics};

/// Case handling for text and categorical columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasePolicy {
    /// Lowercase every value.
    #[default]
    Lower,
    /// Keep the original case.
    Preserve,
}

/// Result of normalizing one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeOutcome {
    /// A canonical value.
    Value(Value),
    /// The cell is missing, or empty once cleaned.
    Missing,
    /// The cell does not fit the column type.
    Failed,
}

impl NormalizeOutcome {
    /// The canonical value, with failures collapsed to missing.
    pub fn into_value(self) -> Option<Value> {
        match self {
            NormalizeOutcome::Value(v) => Some(v),
            NormalizeOutcome::Missing | NormalizeOutcome::Failed => None,
        }
    }
}

/// A normalized column and the number of cells that failed to normalize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedColumn {
    pub values: Vec<Option<Value>>,
    pub failures: usize,
}

/// Converts raw cells into canonical values for a column's inferred type.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    case_policy: CasePolicy,
}

impl Normalizer {
    /// Create a normalizer with the given case policy.
    pub fn new(case_policy: CasePolicy) -> Self {
        Self { case_policy }
    }

    /// Get the case policy.
    pub fn case_policy(&self) -> CasePolicy {
        self.case_policy
    }

    /// Normalize every cell of a column. Failures become missing and are
    /// counted; they never abort the column.
    pub fn normalize_column(
        &self,
        profile: &ColumnProfile,
        values: &[Option<&str>],
    ) -> NormalizedColumn {
        let mut failures = 0;
        let values = values
            .iter()
            .map(|raw| {
                let outcome = match raw {
                    Some(raw) => self.normalize_value(&profile.inferred_type, raw),
                    None => NormalizeOutcome::Missing,
                };
                if outcome == NormalizeOutcome::Failed {
                    failures += 1;
                }
                outcome.into_value()
            })
            .collect();

        if failures > 0 {
            debug!(
                column = %profile.name,
                failures,
                "cells did not fit the column type"
            );
        }

        NormalizedColumn { values, failures }
    }

    /// Normalize one raw cell against a type.
    pub fn normalize_value(&self, inferred: &InferredType, raw: &str) -> NormalizeOutcome {
        let text = raw.trim();
        if text.is_empty() {
            return NormalizeOutcome::Missing;
        }

        let value = match inferred {
            InferredType::Integer { format } => normalize_integer(text, *format),
            InferredType::Float { format } => normalize_float(text, *format),
            InferredType::Boolean => read_boolean(text).map(Value::Boolean),
            InferredType::Date { pattern, .. } => normalize_date(text, pattern),
            InferredType::Categorical | InferredType::Text => {
                return self.normalize_text(text);
            }
        };

        value.map_or(NormalizeOutcome::Failed, NormalizeOutcome::Value)
    }

    fn normalize_text(&self, text: &str) -> NormalizeOutcome {
        let cased = match self.case_policy {
            CasePolicy::Lower => text.to_lowercase(),
            CasePolicy::Preserve => text.to_string(),
        };
        let cleaned = collapse_whitespace(&strip_diacritics(&cased));
        if cleaned.is_empty() {
            NormalizeOutcome::Missing
        } else {
            NormalizeOutcome::Value(Value::Text(cleaned))
        }
    }
}

/// Read a cell of an integer column: the column convention, then the
/// canonical plain form, then the other convention.
fn read_integer_cell(text: &str, format: NumberFormat) -> Option<Number> {
    read_number(text, format)
        .or_else(|| read_plain_number(text))
        .or_else(|| read_number(text, format.other()))
}

/// Read a cell of a float column. The canonical plain form goes first so a
/// rendered float such as `1.234` is never read back as grouped thousands;
/// cells written in the other convention are accepted last.
fn read_float_cell(text: &str, format: NumberFormat) -> Option<Number> {
    read_plain_number(text)
        .or_else(|| read_number(text, format))
        .or_else(|| read_number(text, format.other()))
}

fn normalize_integer(text: &str, format: NumberFormat) -> Option<Value> {
    match read_integer_cell(text, format)? {
        Number::Integer(v) => Some(Value::Integer(v)),
        // Integral floats such as "3.0" still fit an integer column.
        Number::Float(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
            Some(Value::Integer(v as i64))
        }
        Number::Float(_) => None,
    }
}

fn normalize_float(text: &str, format: NumberFormat) -> Option<Value> {
    match read_float_cell(text, format)? {
        Number::Integer(v) => Value::float(v as f64),
        Number::Float(v) => Value::float(v),
    }
}

/// Try the column pattern, then its family, then the ISO forms.
fn normalize_date(text: &str, pattern: &str) -> Option<Value> {
    let primary = date_pattern(pattern);
    if let Some(value) = primary.and_then(|p| read_date(text, p)) {
        return Some(value);
    }

    let family = primary.map(|p| p.order);
    let fallback = |order: DateOrder| {
        DATE_PATTERNS
            .iter()
            .filter(move |p| p.order == order && Some(*p) != primary)
            .find_map(|p: &DatePattern| read_date(text, p))
    };

    family
        .filter(|order| *order != DateOrder::Iso)
        .and_then(&fallback)
        .or_else(|| fallback(DateOrder::Iso))
}
