//! Single-value parsing against candidate semantic types.
//!
//! The parser never decides Categorical or Text; those are column-level
//! decisions made from the distribution of values (see
//! [`ColumnInferrer`](super::ColumnInferrer)).

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{DateOrder, NumberFormat, TypeKind, Value};
use crate::text::fold_token;

/// Confidence for a value that reads differently under another rule.
pub const AMBIGUOUS_CONFIDENCE: f64 = 0.5;

/// Confidence for a bare four-digit integer that could also be a year.
pub const YEAR_LIKE_CONFIDENCE: f64 = 0.9;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

static POINT_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?$")
        .unwrap()
});

static COMMA_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]{1,3}(?:\.[0-9]{3})+|[0-9]+)(?:,[0-9]+)?$").unwrap()
});

static YEAR_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[12][0-9]{3}$").unwrap());

// Every supported date pattern carries a four-digit year.
static HAS_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}").unwrap());

// =============================================================================
// DATE PATTERNS
// =============================================================================

/// A chrono format pattern the parser tries for dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePattern {
    /// chrono `strftime`-style pattern.
    pub pattern: &'static str,
    /// Field order, used to group patterns into families.
    pub order: DateOrder,
    /// Whether the pattern carries a time of day.
    pub has_time: bool,
}

const fn date(pattern: &'static str, order: DateOrder) -> DatePattern {
    DatePattern {
        pattern,
        order,
        has_time: false,
    }
}

const fn datetime(pattern: &'static str, order: DateOrder) -> DatePattern {
    DatePattern {
        pattern,
        order,
        has_time: true,
    }
}

/// Ordered date patterns: ISO 8601 first, then day/month/year, then
/// month/day/year, then textual month names.
pub static DATE_PATTERNS: &[DatePattern] = &[
    datetime("%Y-%m-%dT%H:%M:%S", DateOrder::Iso),
    datetime("%Y-%m-%dT%H:%M", DateOrder::Iso),
    datetime("%Y-%m-%d %H:%M:%S", DateOrder::Iso),
    datetime("%Y-%m-%d %H:%M", DateOrder::Iso),
    date("%Y-%m-%d", DateOrder::Iso),
    date("%Y/%m/%d", DateOrder::Iso),
    datetime("%d/%m/%Y %H:%M:%S", DateOrder::DayFirst),
    datetime("%d/%m/%Y %H:%M", DateOrder::DayFirst),
    date("%d/%m/%Y", DateOrder::DayFirst),
    date("%d-%m-%Y", DateOrder::DayFirst),
    date("%d.%m.%Y", DateOrder::DayFirst),
    datetime("%m/%d/%Y %H:%M:%S", DateOrder::MonthFirst),
    datetime("%m/%d/%Y %H:%M", DateOrder::MonthFirst),
    date("%m/%d/%Y", DateOrder::MonthFirst),
    date("%m-%d-%Y", DateOrder::MonthFirst),
    date("%d %B %Y", DateOrder::Textual),
    date("%B %d, %Y", DateOrder::Textual),
    date("%B %d %Y", DateOrder::Textual),
];

/// Look up a known date pattern by its format string.
pub fn date_pattern(pattern: &str) -> Option<&'static DatePattern> {
    DATE_PATTERNS.iter().find(|p| p.pattern == pattern)
}

// =============================================================================
// PARSE RESULTS
// =============================================================================

/// The rule that produced a parsed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseRule {
    Number(NumberFormat),
    Boolean,
    Date(&'static DatePattern),
}

/// A value that matched one of the candidate types.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedValue {
    /// Candidate kind that matched.
    pub kind: TypeKind,
    /// Parsed canonical value.
    pub value: Value,
    /// Rule that matched.
    pub rule: ParseRule,
    /// 1.0 for an unambiguous match, lower otherwise.
    pub confidence: f64,
}

impl ParsedValue {
    /// Returns true when another reading of the text was possible.
    pub fn is_ambiguous(&self) -> bool {
        self.confidence < 1.0
    }
}

/// Numeric reading of a text under one convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Integer(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    fn same_as(self, other: Number) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

// =============================================================================
// PARSER
// =============================================================================

/// Parses single raw values against an ordered list of candidate types.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueParser;

impl ValueParser {
    /// Create a new value parser.
    pub fn new() -> Self {
        Self
    }

    /// Return the first candidate that parses `raw`, or `None` when nothing
    /// matches (the caller treats the value as text).
    pub fn parse(&self, raw: &str, candidates: &[TypeKind]) -> Option<ParsedValue> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        // Readings are computed lazily and at most once per value.
        let mut number: Option<Option<(Number, NumberFormat, f64)>> = None;

        for &candidate in candidates {
            let parsed = match candidate {
                TypeKind::Integer => {
                    match *number.get_or_insert_with(|| parse_number(text)) {
                        Some((Number::Integer(v), format, confidence)) => Some(ParsedValue {
                            kind: TypeKind::Integer,
                            value: Value::Integer(v),
                            rule: ParseRule::Number(format),
                            confidence,
                        }),
                        _ => None,
                    }
                }
                TypeKind::Float => match *number.get_or_insert_with(|| parse_number(text)) {
                    Some((n, format, confidence)) => {
                        Value::float(n.as_f64()).map(|value| ParsedValue {
                            kind: TypeKind::Float,
                            value,
                            rule: ParseRule::Number(format),
                            confidence,
                        })
                    }
                    None => None,
                },
                TypeKind::Boolean => read_boolean(text).map(|b| ParsedValue {
                    kind: TypeKind::Boolean,
                    value: Value::Boolean(b),
                    rule: ParseRule::Boolean,
                    confidence: 1.0,
                }),
                TypeKind::Date => parse_date(text),
                // Decided per column, never per value.
                TypeKind::Categorical | TypeKind::Text => None,
            };

            if parsed.is_some() {
                return parsed;
            }
        }

        None
    }
}

/// Read a number under the decimal-point convention first, then the
/// decimal-comma one, scoring ambiguity between the two.
fn parse_number(text: &str) -> Option<(Number, NumberFormat, f64)> {
    let point = read_number(text, NumberFormat::DecimalPoint);
    let comma = read_number(text, NumberFormat::DecimalComma);

    let (number, format, alternative) = match (point, comma) {
        (Some(p), c) => (p, NumberFormat::DecimalPoint, c),
        (None, Some(c)) => (c, NumberFormat::DecimalComma, None),
        (None, None) => return None,
    };

    let confidence = match alternative {
        Some(other) if !number.same_as(other) => AMBIGUOUS_CONFIDENCE,
        _ if matches!(number, Number::Integer(_)) && YEAR_LIKE.is_match(text) => {
            YEAR_LIKE_CONFIDENCE
        }
        _ => 1.0,
    };

    Some((number, format, confidence))
}

/// Read a number under exactly one decimal convention.
pub(crate) fn read_number(text: &str, format: NumberFormat) -> Option<Number> {
    let text = text.trim();
    let pattern = match format {
        NumberFormat::DecimalPoint => &*POINT_NUMBER,
        NumberFormat::DecimalComma => &*COMMA_NUMBER,
    };
    if !pattern.is_match(text) {
        return None;
    }

    let plain: String = text
        .chars()
        .filter(|&c| c != format.thousands_separator())
        .map(|c| if c == format.decimal_separator() { '.' } else { c })
        .collect();

    read_plain_number(&plain)
}

/// Read a number in plain Rust syntax (`-1234.5`, `1e-3`), the form
/// canonical values are rendered in.
pub(crate) fn read_plain_number(text: &str) -> Option<Number> {
    let text = text.trim();
    let integral = !text.contains(|c: char| matches!(c, '.' | 'e' | 'E'));
    if integral {
        // Out-of-range integers fall through to a float reading.
        if let Ok(v) = text.parse::<i64>() {
            return Some(Number::Integer(v));
        }
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Number::Float)
}

/// Look a token up in the boolean lexicon (case- and accent-insensitive).
pub(crate) fn read_boolean(text: &str) -> Option<bool> {
    match fold_token(text).as_str() {
        "true" | "t" | "yes" | "y" | "sim" | "verdadeiro" | "on" => Some(true),
        "false" | "f" | "no" | "n" | "nao" | "falso" | "off" => Some(false),
        _ => None,
    }
}

/// Read a date with exactly one pattern.
pub(crate) fn read_date(text: &str, pattern: &DatePattern) -> Option<Value> {
    let text = text.trim();
    if pattern.has_time {
        NaiveDateTime::parse_from_str(text, pattern.pattern)
            .ok()
            .map(Value::DateTime)
    } else {
        NaiveDate::parse_from_str(text, pattern.pattern)
            .ok()
            .map(Value::Date)
    }
}

/// Try every date pattern in order; lower the confidence if a later pattern
/// reads the same text as a different date.
fn parse_date(text: &str) -> Option<ParsedValue> {
    if !HAS_YEAR.is_match(text) {
        return None;
    }

    let mut matches = DATE_PATTERNS
        .iter()
        .filter_map(|pattern| read_date(text, pattern).map(|value| (pattern, value)));

    let (pattern, value) = matches.next()?;
    let ambiguous = matches.any(|(_, other)| {
        other.compare(&value) != Some(std::cmp::Ordering::Equal)
    });

    Some(ParsedValue {
        kind: TypeKind::Date,
        value,
        rule: ParseRule::Date(pattern),
        confidence: if ambiguous { AMBIGUOUS_CONFIDENCE } else { 1.0 },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Option<ParsedValue> {
        ValueParser::new().parse(raw, &TypeKind::CANDIDATES)
    }

    fn ymd(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_integer() {
        let parsed = parse(" 42 ").unwrap();
        assert_eq!(parsed.kind, TypeKind::Integer);
        assert_eq!(parsed.value, Value::Integer(42));
        assert_eq!(parsed.confidence, 1.0);

        assert_eq!(parse("-7").unwrap().value, Value::Integer(-7));
        assert_eq!(parse("+7").unwrap().value, Value::Integer(7));
    }

    #[test]
    fn test_year_like_integer_is_less_certain() {
        let parsed = parse("2024").unwrap();
        assert_eq!(parsed.kind, TypeKind::Integer);
        assert_eq!(parsed.confidence, YEAR_LIKE_CONFIDENCE);
        assert!(parsed.is_ambiguous());

        assert_eq!(parse("4024").unwrap().confidence, 1.0);
    }

    #[test]
    fn test_thousands_separators() {
        let parsed = parse("1,234,567").unwrap();
        assert_eq!(parsed.value, Value::Integer(1_234_567));
        assert_eq!(parsed.rule, ParseRule::Number(NumberFormat::DecimalPoint));
        assert_eq!(parsed.confidence, 1.0);

        let parsed = parse("1.234.567").unwrap();
        assert_eq!(parsed.value, Value::Integer(1_234_567));
        assert_eq!(parsed.rule, ParseRule::Number(NumberFormat::DecimalComma));
    }

    #[test]
    fn test_decimal_conventions() {
        let parsed = parse("1,234.56").unwrap();
        assert_eq!(parsed.kind, TypeKind::Float);
        assert_eq!(parsed.value, Value::Float(1234.56));
        assert_eq!(parsed.confidence, 1.0);

        let parsed = parse("1.234,56").unwrap();
        assert_eq!(parsed.kind, TypeKind::Float);
        assert_eq!(parsed.value, Value::Float(1234.56));
        assert_eq!(parsed.rule, ParseRule::Number(NumberFormat::DecimalComma));

        let parsed = parse("3,5").unwrap();
        assert_eq!(parsed.value, Value::Float(3.5));
        assert_eq!(parsed.confidence, 1.0);
    }

    #[test]
    fn test_ambiguous_separator() {
        // Thousands under one convention, decimals under the other.
        let parsed = parse("1,500").unwrap();
        assert_eq!(parsed.kind, TypeKind::Integer);
        assert_eq!(parsed.value, Value::Integer(1500));
        assert_eq!(parsed.confidence, AMBIGUOUS_CONFIDENCE);

        let parsed = parse("1.500").unwrap();
        assert_eq!(parsed.kind, TypeKind::Float);
        assert_eq!(parsed.value, Value::Float(1.5));
        assert_eq!(parsed.confidence, AMBIGUOUS_CONFIDENCE);
    }

    #[test]
    fn test_mixed_separators_rejected() {
        assert!(read_number("1,23,4", NumberFormat::DecimalPoint).is_none());
        assert!(read_number("1.2.3", NumberFormat::DecimalComma).is_none());
        assert!(parse("12abc").is_none());
    }

    #[test]
    fn test_exponent_and_overflow() {
        assert_eq!(parse("1e3").unwrap().value, Value::Float(1000.0));
        let parsed = parse("99999999999999999999").unwrap();
        assert_eq!(parsed.kind, TypeKind::Float);
    }

    #[test]
    fn test_boolean_lexicon() {
        for truthy in ["true", "YES", "Sim", "verdadeiro", "on"] {
            assert_eq!(parse(truthy).unwrap().value, Value::Boolean(true), "{truthy}");
        }
        for falsy in ["False", "no", "NÃO", "nao", "falso", "off"] {
            assert_eq!(parse(falsy).unwrap().value, Value::Boolean(false), "{falsy}");
        }
    }

    #[test]
    fn test_integer_precedes_boolean() {
        assert_eq!(parse("1").unwrap().kind, TypeKind::Integer);
        assert_eq!(parse("0").unwrap().kind, TypeKind::Integer);
    }

    #[test]
    fn test_iso_dates() {
        let parsed = parse("2024-01-05").unwrap();
        assert_eq!(parsed.kind, TypeKind::Date);
        assert_eq!(parsed.value, ymd(2024, 1, 5));
        assert_eq!(parsed.confidence, 1.0);

        let parsed = parse("2024-01-05T10:30:00").unwrap();
        assert!(matches!(parsed.value, Value::DateTime(_)));
        assert_eq!(parsed.rule, ParseRule::Date(&DATE_PATTERNS[0]));
    }

    #[test]
    fn test_day_first_and_month_first() {
        // Only a valid day/month reading.
        let parsed = parse("25/12/2023").unwrap();
        assert_eq!(parsed.value, ymd(2023, 12, 25));
        assert_eq!(parsed.confidence, 1.0);

        // Only a valid month/day reading.
        let parsed = parse("12/25/2023").unwrap();
        assert_eq!(parsed.value, ymd(2023, 12, 25));
        assert_eq!(parsed.confidence, 1.0);
    }

    #[test]
    fn test_ambiguous_day_month() {
        let parsed = parse("05/01/2024").unwrap();
        assert_eq!(parsed.value, ymd(2024, 1, 5));
        assert_eq!(parsed.confidence, AMBIGUOUS_CONFIDENCE);

        // Both readings agree.
        let parsed = parse("05/05/2024").unwrap();
        assert_eq!(parsed.confidence, 1.0);
    }

    #[test]
    fn test_textual_month() {
        assert_eq!(parse("January 5, 2024").unwrap().value, ymd(2024, 1, 5));
        assert_eq!(parse("5 March 2023").unwrap().value, ymd(2023, 3, 5));
    }

    #[test]
    fn test_no_match() {
        assert!(parse("not a date").is_none());
        assert!(parse("   ").is_none());
        assert!(parse("31/02/2024").is_none());
    }

    #[test]
    fn test_categorical_candidate_never_matches() {
        let parser = ValueParser::new();
        assert!(parser.parse("red", &[TypeKind::Categorical]).is_none());
    }

    #[test]
    fn test_candidate_order_respected() {
        let parser = ValueParser::new();
        let parsed = parser
            .parse("5", &[TypeKind::Float, TypeKind::Integer])
            .unwrap();
        assert_eq!(parsed.kind, TypeKind::Float);
        assert_eq!(parsed.value, Value::Float(5.0));
    }

    #[test]
    fn test_date_pattern_lookup() {
        let pattern = date_pattern("%d/%m/%Y").unwrap();
        assert_eq!(pattern.order, DateOrder::DayFirst);
        assert!(date_pattern("%Q").is_none());
    }
}
