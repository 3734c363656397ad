//! Loading and pipeline plumbing shared by the commands.

use std::path::PathBuf;

use colored::Colorize;
use sifter::input::{SourceMetadata, load_batch};
use sifter::{CancellationToken, Pipeline, ProcessOutput};
use tracing::warn;

use crate::cli::PipelineArgs;

/// Load every file (one table per sheet for workbooks) and run the pipeline
/// on each table. Ctrl-C cancels the run.
pub fn load_and_process(
    files: &[PathBuf],
    args: &PipelineArgs,
) -> Result<Vec<(SourceMetadata, ProcessOutput)>, Box<dyn std::error::Error>> {
    if let Some(missing) = files.iter().find(|file| !file.exists()) {
        return Err(format!("File not found: {}", missing.display()).into());
    }

    for file in files {
        eprintln!("{} {}", "Loading".cyan().bold(), file.display());
    }
    let tables = load_batch(files, &args.loader_config()?)?;

    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!("could not install Ctrl-C handler: {}", e);
    }

    for loaded in &tables {
        eprintln!(
            "{} {}: {} records, {} columns",
            "Processing".cyan().bold(),
            loaded.source.origin(),
            loaded.table.record_count(),
            loaded.table.column_count()
        );
    }
    let outputs = Pipeline::new(args.process_options())
        .with_cancellation(token)
        .process_batch(&tables)?;

    Ok(tables
        .into_iter()
        .map(|loaded| loaded.source)
        .zip(outputs)
        .collect())
}
