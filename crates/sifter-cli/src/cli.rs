//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use sifter::input::LoaderConfig;
use sifter::{CasePolicy, ProcessOptions};

/// Sifter: type inference, normalization and quality reports for messy tables
#[derive(Parser)]
#[command(name = "sifter")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean data files and write one cleaned table per file or sheet
    Clean {
        /// Paths to the data files (CSV/TSV/JSON/XLSX)
        #[arg(value_name = "FILE", required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Output path for a single cleaned table, or the directory to write
        /// several into (default: <file>[_<sheet>]_clean.<format> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from the output extension, else csv)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Write the quality report as JSON to this path (one entry per
        /// table when several are cleaned)
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Infer column types and print the quality report
    Profile {
        /// Paths to the data files (CSV/TSV/JSON/XLSX)
        #[arg(value_name = "FILE", required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

/// Options shared by every command that runs the pipeline.
#[derive(Args, Clone, Debug)]
pub struct PipelineArgs {
    /// Deduplicate on these columns only (comma-separated; default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub keys: Vec<String>,

    /// Case handling for text columns
    #[arg(long, default_value = "lower")]
    pub case: CaseChoice,

    /// Values sampled per column for type inference
    #[arg(long, default_value = "1000")]
    pub sample_size: usize,

    /// Share of sampled values the winning type must reach
    #[arg(long, default_value = "0.8")]
    pub plurality: f64,

    /// Distinct/sampled ratio under which text is categorical
    #[arg(long, default_value = "0.5")]
    pub categorical_ratio: f64,

    /// Worker threads for the column phase (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Seed for the inference sample
    #[arg(long)]
    pub seed: Option<u64>,

    /// Field delimiter for delimited files (default: auto-detect)
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Extra cell values to read as missing (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub null: Vec<String>,
}

impl PipelineArgs {
    /// Pipeline options for these arguments.
    pub fn process_options(&self) -> ProcessOptions {
        let mut options = ProcessOptions::default()
            .with_sample_size(self.sample_size)
            .with_plurality_threshold(self.plurality)
            .with_categorical_ratio(self.categorical_ratio)
            .with_case_policy(self.case.policy());

        if !self.keys.is_empty() {
            options = options.with_key_columns(self.keys.iter().map(|k| k.trim().to_string()));
        }
        if let Some(threads) = self.threads {
            options = options.with_threads(threads);
        }
        if let Some(seed) = self.seed {
            options = options.with_seed(seed);
        }
        options
    }

    /// Loader configuration for these arguments.
    pub fn loader_config(&self) -> Result<LoaderConfig, String> {
        let mut config = LoaderConfig::default();
        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err(format!("Delimiter must be a single ASCII character, got '{}'", delimiter));
            }
            config = config.with_delimiter(delimiter as u8);
        }
        config.null_tokens.extend(self.null.iter().cloned());
        Ok(config)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    /// Guess the format from a file extension.
    pub fn from_extension(path: &std::path::Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }

    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            "xlsx" | "xls" | "sqlite" | "db" | "sql" => {
                Err(format!("{} output is not supported. Use csv, tsv, or json.", s))
            }
            _ => Err(format!("Unknown format: {}. Use csv, tsv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Case handling choice for text columns
#[derive(Clone, Copy, Debug, Default)]
pub enum CaseChoice {
    /// Lowercase every value
    #[default]
    Lower,
    /// Keep values as written
    Preserve,
}

impl CaseChoice {
    pub fn policy(self) -> CasePolicy {
        match self {
            CaseChoice::Lower => CasePolicy::Lower,
            CaseChoice::Preserve => CasePolicy::Preserve,
        }
    }
}

impl std::str::FromStr for CaseChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lower" | "lowercase" => Ok(CaseChoice::Lower),
            "preserve" | "keep" => Ok(CaseChoice::Preserve),
            _ => Err(format!("Unknown case policy: {}. Use lower or preserve.", s)),
        }
    }
}

impl std::fmt::Display for CaseChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseChoice::Lower => write!(f, "lower"),
            CaseChoice::Preserve => write!(f, "preserve"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_args_map_to_options() {
        let cli = Cli::parse_from([
            "sifter",
            "clean",
            "data.csv",
            "--keys",
            "email, name",
            "--case",
            "preserve",
            "--plurality",
            "0.6",
            "--threads",
            "2",
        ]);
        let Commands::Clean { pipeline, .. } = cli.command else {
            panic!("expected clean command");
        };
        let options = pipeline.process_options();
        assert_eq!(
            options.key_columns,
            Some(vec!["email".to_string(), "name".to_string()])
        );
        assert_eq!(options.case_policy, CasePolicy::Preserve);
        assert_eq!(options.plurality_threshold, 0.6);
        assert_eq!(options.threads, Some(2));
    }

    #[test]
    fn test_several_files_accepted() {
        let cli = Cli::parse_from(["sifter", "clean", "a.csv", "b.xlsx", "-o", "out"]);
        let Commands::Clean { files, output, .. } = cli.command else {
            panic!("expected clean command");
        };
        assert_eq!(files, [PathBuf::from("a.csv"), PathBuf::from("b.xlsx")]);
        assert_eq!(output, Some(PathBuf::from("out")));

        assert!(Cli::try_parse_from(["sifter", "profile"]).is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("TSV".parse::<OutputFormat>(), Ok(OutputFormat::Tsv));
        assert!("xlsx".parse::<OutputFormat>().is_err());
        assert_eq!(
            OutputFormat::from_extension(std::path::Path::new("out.json")),
            Some(OutputFormat::Json)
        );
    }

    #[test]
    fn test_delimiter_and_null_tokens() {
        let cli = Cli::parse_from(["sifter", "profile", "data.txt", "-d", ";", "--null", "?,unknown"]);
        let Commands::Profile { pipeline, .. } = cli.command else {
            panic!("expected profile command");
        };
        let config = pipeline.loader_config().unwrap();
        assert_eq!(config.delimiter, Some(b';'));
        assert!(config.is_null("UNKNOWN"));
        assert!(config.is_null("NA"));
    }
}
