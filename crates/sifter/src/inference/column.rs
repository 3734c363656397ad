//! Column-level type inference from sampled values.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::schema::{ColumnProfile, InferredType, NumberFormat, TypeKind};
use crate::text::is_blank;

use super::value::{DATE_PATTERNS, ParseRule, ValueParser};

/// Configuration for column type inference.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Maximum number of non-missing values parsed per column.
    pub sample_size: usize,
    /// Share of sampled values the winning type must reach.
    pub plurality_threshold: f64,
    /// Columns whose distinct/sampled ratio is below this are categorical.
    pub categorical_ratio: f64,
    /// Seed for the reservoir sample, so inference is repeatable.
    pub seed: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            plurality_threshold: 0.8,
            categorical_ratio: 0.5,
            seed: 0x5eed,
        }
    }
}

/// Per-column counters gathered while parsing the sample.
#[derive(Debug, Default)]
struct Tally {
    integer: usize,
    float: usize,
    boolean: usize,
    date: usize,
    text: usize,
    ambiguous: usize,
    /// Winning numeric values per decimal convention.
    formats: [usize; 2],
    /// Winning date values per entry of `DATE_PATTERNS`.
    patterns: Vec<usize>,
}

impl Tally {
    fn new() -> Self {
        Self {
            patterns: vec![0; DATE_PATTERNS.len()],
            ..Self::default()
        }
    }

    fn as_map(&self) -> IndexMap<TypeKind, usize> {
        [
            (TypeKind::Integer, self.integer),
            (TypeKind::Float, self.float),
            (TypeKind::Boolean, self.boolean),
            (TypeKind::Date, self.date),
            (TypeKind::Text, self.text),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }

    fn number_format(&self) -> NumberFormat {
        if self.formats[1] > self.formats[0] {
            NumberFormat::DecimalComma
        } else {
            NumberFormat::DecimalPoint
        }
    }

    fn date_pattern_index(&self) -> usize {
        let mut best = 0;
        for (idx, &count) in self.patterns.iter().enumerate() {
            if count > self.patterns[best] {
                best = idx;
            }
        }
        best
    }
}

/// Decides one type per column from a sample of its values.
#[derive(Debug, Clone)]
pub struct ColumnInferrer {
    config: InferenceConfig,
    parser: ValueParser,
}

impl ColumnInferrer {
    /// Create an inferrer with default settings.
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    /// Create an inferrer with custom configuration.
    pub fn with_config(config: InferenceConfig) -> Self {
        Self {
            config,
            parser: ValueParser::new(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infer the type of one column.
    ///
    /// Missing and blank values never take part in the tally but are counted
    /// in the profile's `missing_count`.
    pub fn infer(&self, name: &str, position: usize, values: &[Option<&str>]) -> ColumnProfile {
        let present: Vec<&str> = values
            .iter()
            .flatten()
            .copied()
            .filter(|v| !is_blank(v))
            .collect();

        if present.is_empty() {
            debug!(column = name, "column has no values, defaulting to text");
            return ColumnProfile::empty(name, position, values.len());
        }

        let sample = self.sample(&present);
        let distinct: HashSet<&str> = sample.iter().map(|v| v.trim()).collect();

        let mut tally = Tally::new();
        for value in &sample {
            match self.parser.parse(value, &TypeKind::CANDIDATES) {
                Some(parsed) => {
                    if parsed.is_ambiguous() {
                        tally.ambiguous += 1;
                    }
                    match parsed.kind {
                        TypeKind::Integer => tally.integer += 1,
                        TypeKind::Float => tally.float += 1,
                        TypeKind::Boolean => tally.boolean += 1,
                        TypeKind::Date => tally.date += 1,
                        TypeKind::Categorical | TypeKind::Text => tally.text += 1,
                    }
                    match parsed.rule {
                        ParseRule::Number(NumberFormat::DecimalPoint) => tally.formats[0] += 1,
                        ParseRule::Number(NumberFormat::DecimalComma) => tally.formats[1] += 1,
                        ParseRule::Date(pattern) => {
                            if let Some(idx) = DATE_PATTERNS.iter().position(|p| p == pattern) {
                                tally.patterns[idx] += 1;
                            }
                        }
                        ParseRule::Boolean => {}
                    }
                }
                None => tally.text += 1,
            }
        }

        let sampled = sample.len();
        let (inferred_type, confidence) = self.decide(&tally, sampled, distinct.len());

        debug!(
            column = name,
            inferred = %inferred_type,
            confidence,
            sampled,
            missing = values.len() - present.len(),
            "inferred column type"
        );

        ColumnProfile {
            name: name.to_string(),
            position,
            inferred_type,
            confidence,
            total_count: values.len(),
            missing_count: values.len() - present.len(),
            sampled_count: sampled,
            distinct_count: distinct.len(),
            ambiguous_count: tally.ambiguous,
            tallies: tally.as_map(),
        }
    }

    /// Pick the column type from the tallies.
    fn decide(&self, tally: &Tally, sampled: usize, distinct: usize) -> (InferredType, f64) {
        let total = sampled as f64;

        // Every integer is a valid float, so a column mixing both widens.
        let (integer, float) = if tally.integer > 0 && tally.float > 0 {
            (0, tally.integer + tally.float)
        } else {
            (tally.integer, tally.float)
        };

        // Candidate order breaks ties: the first maximum wins.
        let mut winner = (TypeKind::Text, 0);
        for (kind, count) in [
            (TypeKind::Integer, integer),
            (TypeKind::Float, float),
            (TypeKind::Boolean, tally.boolean),
            (TypeKind::Date, tally.date),
        ] {
            if count > winner.1 {
                winner = (kind, count);
            }
        }

        let (kind, count) = winner;
        let share = count as f64 / total;
        if count > 0 && share >= self.config.plurality_threshold {
            let inferred = match kind {
                TypeKind::Integer => InferredType::Integer {
                    format: tally.number_format(),
                },
                TypeKind::Float => InferredType::Float {
                    format: tally.number_format(),
                },
                TypeKind::Boolean => InferredType::Boolean,
                _ => {
                    let pattern = &DATE_PATTERNS[tally.date_pattern_index()];
                    InferredType::Date {
                        pattern: pattern.pattern.to_string(),
                        has_time: pattern.has_time,
                    }
                }
            };
            return (inferred, share);
        }

        let text_share = tally.text as f64 / total;
        if (distinct as f64 / total) < self.config.categorical_ratio {
            (InferredType::Categorical, text_share)
        } else {
            (InferredType::Text, text_share)
        }
    }

    /// Reservoir-sample the values down to `sample_size`, deterministically.
    fn sample<'a>(&self, values: &[&'a str]) -> Vec<&'a str> {
        let capacity = self.config.sample_size;
        if values.len() <= capacity {
            return values.to_vec();
        }

        let mut rng = fastrand::Rng::with_seed(self.config.seed);
        let mut reservoir: Vec<&str> = values[..capacity].to_vec();
        for (seen, value) in values.iter().enumerate().skip(capacity) {
            let j = rng.usize(0..=seen);
            if j < capacity {
                reservoir[j] = value;
            }
        }
        reservoir
    }
}

impl Default for ColumnInferrer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(values: &[Option<&str>]) -> ColumnProfile {
        ColumnInferrer::new().infer("col", 0, values)
    }

    fn infer_all(values: &[&str]) -> ColumnProfile {
        let values: Vec<Option<&str>> = values.iter().copied().map(Some).collect();
        infer(&values)
    }

    #[test]
    fn test_infer_integer_type() {
        let profile = infer_all(&["1", "2", "3", "100"]);
        assert_eq!(
            profile.inferred_type,
            InferredType::Integer {
                format: NumberFormat::DecimalPoint
            }
        );
        assert_eq!(profile.confidence, 1.0);
    }

    #[test]
    fn test_infer_float_type() {
        let profile = infer_all(&["1.5", "2.7", "3.14", "0.5"]);
        assert_eq!(profile.kind(), TypeKind::Float);
        assert_eq!(profile.confidence, 1.0);
    }

    #[test]
    fn test_mixed_integers_and_floats_widen() {
        let profile = infer_all(&["1", "2", "3", "4.5"]);
        assert_eq!(profile.kind(), TypeKind::Float);
        assert_eq!(profile.confidence, 1.0);
        assert_eq!(profile.tally(TypeKind::Integer), 3);
        assert_eq!(profile.tally(TypeKind::Float), 1);
    }

    #[test]
    fn test_decimal_comma_column() {
        let profile = infer_all(&["1,5", "2,25", "10,0"]);
        assert_eq!(
            profile.inferred_type,
            InferredType::Float {
                format: NumberFormat::DecimalComma
            }
        );
    }

    #[test]
    fn test_infer_boolean_type() {
        let profile = infer_all(&["yes", "no", "Sim", "não"]);
        assert_eq!(profile.inferred_type, InferredType::Boolean);
        assert_eq!(profile.confidence, 1.0);
    }

    #[test]
    fn test_infer_date_type_records_pattern() {
        let profile = infer_all(&["25/12/2023", "13/01/2024", "31/03/2024"]);
        assert_eq!(
            profile.inferred_type,
            InferredType::Date {
                pattern: "%d/%m/%Y".to_string(),
                has_time: false
            }
        );
        assert_eq!(profile.confidence, 1.0);
    }

    #[test]
    fn test_below_threshold_falls_back() {
        // 2/3 dates is below the default 0.8 threshold.
        let profile = infer_all(&["2024-01-05", "2024-01-06", "not a date"]);
        assert_eq!(profile.kind(), TypeKind::Text);
        assert!((profile.confidence - 1.0 / 3.0).abs() < 1e-12);

        let inferrer = ColumnInferrer::with_config(InferenceConfig {
            plurality_threshold: 0.6,
            ..InferenceConfig::default()
        });
        let profile = inferrer.infer(
            "when",
            0,
            &[Some("2024-01-05"), Some("2024-01-06"), Some("not a date")],
        );
        assert_eq!(profile.kind(), TypeKind::Date);
        assert!((profile.confidence - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_detect_categorical() {
        let profile = infer_all(&["A", "B", "A", "C", "B", "A", "A", "B"]);
        assert_eq!(profile.inferred_type, InferredType::Categorical);
        assert_eq!(profile.distinct_count, 3);
        assert_eq!(profile.confidence, 1.0);
    }

    #[test]
    fn test_high_cardinality_is_text() {
        let profile = infer_all(&["alpha", "beta", "gamma", "delta"]);
        assert_eq!(profile.inferred_type, InferredType::Text);
        assert_eq!(profile.confidence, 1.0);
    }

    #[test]
    fn test_missing_values_counted_not_tallied() {
        let profile = infer(&[Some("1"), None, Some("  "), Some("3")]);
        assert_eq!(profile.kind(), TypeKind::Integer);
        assert_eq!(profile.missing_count, 2);
        assert_eq!(profile.sampled_count, 2);
        assert_eq!(profile.confidence, 1.0);
    }

    #[test]
    fn test_all_missing_column() {
        let profile = infer(&[None, None, Some("")]);
        assert_eq!(profile.inferred_type, InferredType::Text);
        assert_eq!(profile.confidence, 0.0);
        assert_eq!(profile.missing_count, 3);
    }

    #[test]
    fn test_tie_prefers_candidate_order() {
        let inferrer = ColumnInferrer::with_config(InferenceConfig {
            plurality_threshold: 0.5,
            ..InferenceConfig::default()
        });
        let profile = inferrer.infer("mix", 0, &[Some("yes"), Some("2024-01-05")]);
        assert_eq!(profile.inferred_type, InferredType::Boolean);
        assert_eq!(profile.confidence, 0.5);
    }

    #[test]
    fn test_ambiguous_values_counted() {
        let profile = infer_all(&["1,500", "2,750", "3,125"]);
        assert_eq!(profile.kind(), TypeKind::Integer);
        assert_eq!(profile.ambiguous_count, 3);
    }

    #[test]
    fn test_sampling_is_deterministic_and_bounded() {
        let owned: Vec<String> = (0..500).map(|i| i.to_string()).collect();
        let values: Vec<Option<&str>> = owned.iter().map(|s| Some(s.as_str())).collect();
        let inferrer = ColumnInferrer::with_config(InferenceConfig {
            sample_size: 50,
            ..InferenceConfig::default()
        });

        let first = inferrer.infer("n", 0, &values);
        let second = inferrer.infer("n", 0, &values);
        assert_eq!(first.sampled_count, 50);
        assert_eq!(first, second);
        assert_eq!(first.missing_count, 0);
    }
}
