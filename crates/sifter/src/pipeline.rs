//! The ETL pipeline: inference, normalization, deduplication and analysis.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SifterError};
use crate::inference::{ColumnInferrer, InferenceConfig};
use crate::input::{LoadedTable, RawTable};
use crate::quality::{QualityAnalyzer, QualityReport};
use crate::schema::{CleanedTable, ColumnProfile, Value};
use crate::transform::{CasePolicy, DedupPolicy, Deduplicator, NormalizedColumn, Normalizer};

/// Options for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Maximum number of values sampled per column during inference.
    pub sample_size: usize,
    /// Share of sampled values the winning type must reach, in (0, 1].
    pub plurality_threshold: f64,
    /// Distinct/sampled ratio under which text is categorical, in (0, 1].
    pub categorical_ratio: f64,
    /// Case handling for text and categorical columns.
    pub case_policy: CasePolicy,
    /// Columns that define a duplicate (None = all columns).
    pub key_columns: Option<Vec<String>>,
    /// Seed for the inference sample.
    pub seed: u64,
    /// Worker threads for the column phase (None = global rayon pool).
    pub threads: Option<usize>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        let inference = InferenceConfig::default();
        Self {
            sample_size: inference.sample_size,
            plurality_threshold: inference.plurality_threshold,
            categorical_ratio: inference.categorical_ratio,
            case_policy: CasePolicy::default(),
            key_columns: None,
            seed: inference.seed,
            threads: None,
        }
    }
}

impl ProcessOptions {
    /// Set the sample size.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the plurality threshold.
    pub fn with_plurality_threshold(mut self, threshold: f64) -> Self {
        self.plurality_threshold = threshold;
        self
    }

    /// Set the categorical ratio.
    pub fn with_categorical_ratio(mut self, ratio: f64) -> Self {
        self.categorical_ratio = ratio;
        self
    }

    /// Set the case policy.
    pub fn with_case_policy(mut self, case_policy: CasePolicy) -> Self {
        self.case_policy = case_policy;
        self
    }

    /// Deduplicate on the given columns only.
    pub fn with_key_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Run the column phase on a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// The deduplication policy these options describe.
    pub fn dedup_policy(&self) -> DedupPolicy {
        match &self.key_columns {
            Some(keys) => DedupPolicy::KeyColumns(keys.clone()),
            None => DedupPolicy::AllColumns,
        }
    }

    /// The inference settings these options describe.
    pub fn inference_config(&self) -> InferenceConfig {
        InferenceConfig {
            sample_size: self.sample_size,
            plurality_threshold: self.plurality_threshold,
            categorical_ratio: self.categorical_ratio,
            seed: self.seed,
        }
    }

    /// Check the options and the table header before any data is touched.
    ///
    /// Returns the deduplicator resolved against the header.
    pub fn validate(&self, raw: &RawTable) -> Result<Deduplicator> {
        if raw.column_count() == 0 {
            return Err(SifterError::Config("table has no columns".to_string()));
        }

        let mut seen = HashSet::with_capacity(raw.column_count());
        for (idx, name) in raw.columns().iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SifterError::Config(format!("column {} has an empty name", idx)));
            }
            if !seen.insert(name.as_str()) {
                return Err(SifterError::Config(format!("duplicate column name '{}'", name)));
            }
        }

        if self.sample_size == 0 {
            return Err(SifterError::Config("sample size must be at least 1".to_string()));
        }
        check_ratio("plurality threshold", self.plurality_threshold)?;
        check_ratio("categorical ratio", self.categorical_ratio)?;

        if self.threads == Some(0) {
            return Err(SifterError::Config("thread count must be at least 1".to_string()));
        }

        Deduplicator::new(raw.columns(), &self.dedup_policy())
    }
}

fn check_ratio(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SifterError::Config(format!(
            "{} must be in (0, 1], got {}",
            name, value
        )))
    }
}

/// Shared flag for cooperative cancellation of a run.
///
/// Checked before each column starts; a column already in progress finishes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// The cleaned, typed, deduplicated table.
    pub cleaned: CleanedTable,
    /// Quality figures for the cleaned table.
    pub report: QualityReport,
}

/// Per-column result of the parallel phase.
struct ColumnOutcome {
    profile: ColumnProfile,
    normalized: NormalizedColumn,
}

/// Runs raw tables through the whole cleaning process.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: ProcessOptions,
    cancellation: Option<CancellationToken>,
}

impl Pipeline {
    /// Create a pipeline with the given options.
    pub fn new(options: ProcessOptions) -> Self {
        Self {
            options,
            cancellation: None,
        }
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Get the options.
    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Clean a raw table and report on its quality.
    ///
    /// Only invalid options or headers, and cancellation, produce an error.
    #[instrument(skip_all, fields(columns = raw.column_count(), records = raw.record_count()))]
    pub fn process(&self, raw: &RawTable) -> Result<ProcessOutput> {
        let deduplicator = self.options.validate(raw)?;

        let outcomes = match self.options.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| SifterError::Config(format!("cannot build thread pool: {}", e)))?;
                pool.install(|| self.process_columns(raw))
            }
            None => self.process_columns(raw),
        }?;

        let mut profiles = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::with_capacity(outcomes.len());
        let mut columns = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            failures.push(outcome.normalized.failures);
            columns.push(outcome.normalized.values.into_iter());
            profiles.push(outcome.profile);
        }

        let records: Vec<Vec<Option<Value>>> = (0..raw.record_count())
            .map(|_| columns.iter_mut().map(|c| c.next().flatten()).collect())
            .collect();

        let deduped = deduplicator.dedup(records);
        let cleaned = CleanedTable::new(
            raw.columns().to_vec(),
            profiles.iter().map(|p| p.inferred_type.clone()).collect(),
            deduped.records,
        );

        let report = QualityAnalyzer::new().analyze(
            &cleaned,
            &profiles,
            &failures,
            raw.record_count(),
            deduped.removed,
        );

        info!(
            records = report.record_count(),
            duplicates_removed = report.duplicates_removed(),
            normalization_failures = report.normalization_failures(),
            completeness = report.overall_completeness(),
            "pipeline run complete"
        );

        Ok(ProcessOutput { cleaned, report })
    }

    /// Clean every table of a batch in order and tag each cleaned table with
    /// its origin in a [`PROVENANCE_COLUMN`](crate::schema::PROVENANCE_COLUMN).
    ///
    /// Each table is inferred, deduplicated and reported on by itself. Stops
    /// at the first table that fails.
    pub fn process_batch(&self, tables: &[LoadedTable]) -> Result<Vec<ProcessOutput>> {
        tables
            .iter()
            .map(|loaded| {
                let origin = loaded.source.origin();
                debug!(origin = %origin, "processing batch table");
                let output = self.process(&loaded.table)?;
                Ok(ProcessOutput {
                    cleaned: output.cleaned.with_provenance(&origin),
                    report: output.report,
                })
            })
            .collect()
    }

    /// Infer and normalize every column in parallel.
    fn process_columns(&self, raw: &RawTable) -> Result<Vec<ColumnOutcome>> {
        let inferrer = ColumnInferrer::with_config(self.options.inference_config());
        let normalizer = Normalizer::new(self.options.case_policy);

        let outcomes: Vec<Option<ColumnOutcome>> = raw
            .columns()
            .par_iter()
            .enumerate()
            .map(|(position, name)| {
                if self.is_cancelled() {
                    return None;
                }
                let values = raw.column_values(position);
                let profile = inferrer.infer(name, position, &values);
                let normalized = normalizer.normalize_column(&profile, &values);
                Some(ColumnOutcome {
                    profile,
                    normalized,
                })
            })
            .collect();

        let skipped = outcomes.iter().filter(|o| o.is_none()).count();
        if skipped > 0 {
            warn!(skipped, "run cancelled before all columns were processed");
            return Err(SifterError::Cancelled);
        }

        Ok(outcomes.into_iter().flatten().collect())
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Clean a raw table with the given options.
pub fn process(raw: &RawTable, options: &ProcessOptions) -> Result<ProcessOutput> {
    Pipeline::new(options.clone()).process(raw)
}
