//! Profile command - infer column types and show the quality report.

use std::path::PathBuf;

use colored::Colorize;
use sifter::input::SourceMetadata;
use sifter::{ColumnQuality, QualityReport, TypeKind};

use super::common::load_and_process;
use crate::cli::PipelineArgs;

pub fn run(
    files: Vec<PathBuf>,
    json_output: bool,
    pipeline: PipelineArgs,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = load_and_process(&files, &pipeline)?;

    if json_output {
        let mut profiles: Vec<_> = results
            .iter()
            .map(|(source, result)| {
                serde_json::json!({
                    "source": source,
                    "report": result.report,
                })
            })
            .collect();
        let status = if profiles.len() == 1 {
            profiles.remove(0)
        } else {
            serde_json::Value::Array(profiles)
        };
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    for (index, (source, result)) in results.iter().enumerate() {
        if index > 0 {
            println!();
        }
        print_profile(source, &result.report, verbose);
    }

    Ok(())
}

fn print_profile(source: &SourceMetadata, report: &QualityReport, verbose: bool) {
    println!(
        "{} {} ({}, {})",
        "Profile of".cyan().bold(),
        source.origin().white(),
        source.format,
        source.encoding
    );
    println!();
    println!(
        "Records: {} of {} ({} duplicates removed)",
        report.record_count().to_string().white().bold(),
        report.source_record_count(),
        report.duplicates_removed()
    );

    let completeness = report.overall_completeness() * 100.0;
    let completeness_text = format!("{:.1}%", completeness);
    let completeness_color = if completeness >= 95.0 {
        completeness_text.green()
    } else if completeness >= 80.0 {
        completeness_text.yellow()
    } else {
        completeness_text.red()
    };
    println!("Overall completeness: {}", completeness_color);
    println!();

    println!("{}", "Columns:".yellow().bold());
    for column in report.columns() {
        print_column(column, verbose);
    }
}

fn print_column(column: &ColumnQuality, verbose: bool) {
    let confidence = column.confidence * 100.0;
    let confidence_text = format!("{:.0}%", confidence);
    let confidence_color = if confidence >= 90.0 {
        confidence_text.green()
    } else if confidence >= 60.0 {
        confidence_text.yellow()
    } else {
        confidence_text.red()
    };

    println!(
        "  {} {} confidence {}, complete {:.1}%, {} distinct",
        column.name().white().bold(),
        format!("[{}]", column.inferred_type()).cyan(),
        confidence_color,
        column.completeness * 100.0,
        column.distinct_count
    );

    if column.normalization_failures > 0 {
        println!(
            "      {} values did not fit the column type",
            column.normalization_failures.to_string().yellow()
        );
    }
    if let (Some(min), Some(max)) = (&column.min, &column.max) {
        println!("      range {} .. {}", min, max);
    }
    if let Some(stats) = &column.numeric {
        if column.profile.kind() == TypeKind::Float || verbose {
            println!(
                "      mean {:.3}, std {:.3}, median {}",
                stats.mean, stats.std, stats.median
            );
        }
        if column.outlier_count > 0 {
            println!(
                "      {} outlier(s) outside the IQR fences",
                column.outlier_count.to_string().yellow()
            );
        }
    }
    if verbose && column.profile.ambiguous_count > 0 {
        println!(
            "      {} of {} sampled values could be read another way",
            column.profile.ambiguous_count, column.profile.sampled_count
        );
    }
}
