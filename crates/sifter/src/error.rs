//! Error types for the Sifter library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Sifter operations.
///
/// Only [`SifterError::Config`] and [`SifterError::Cancelled`] can come out of
/// the pipeline itself. Messy data never produces an error; it lowers
/// confidence and completeness instead.
#[derive(Debug, Error)]
pub enum SifterError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from the spreadsheet reader.
    #[error("Spreadsheet error: {0}")]
    Excel(#[from] calamine::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Invalid table shape or option values, raised before any processing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The run was cancelled before every column was processed.
    #[error("Run cancelled before all columns were processed")]
    Cancelled,
}

impl SifterError {
    /// Returns true for configuration errors.
    pub fn is_config(&self) -> bool {
        matches!(self, SifterError::Config(_))
    }
}

/// Result type alias for Sifter operations.
pub type Result<T> = std::result::Result<T, SifterError>;
