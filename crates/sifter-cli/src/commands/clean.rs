//! Clean command - run the pipeline and write the cleaned table.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use colored::Colorize;
use sifter::input::SourceMetadata;
use sifter::{CleanedTable, ProcessOutput};

use super::common::load_and_process;
use crate::cli::{OutputFormat, PipelineArgs};

pub fn run(
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    report: Option<PathBuf>,
    pipeline: PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = load_and_process(&files, &pipeline)?;

    let single = results.len() == 1;
    let format = format
        .or_else(|| {
            output
                .as_deref()
                .filter(|_| single)
                .and_then(OutputFormat::from_extension)
        })
        .unwrap_or_default();

    let targets = output_paths(&results, output.as_deref(), format)?;
    if let Some(target) = targets.iter().find(|t| files.contains(t)) {
        return Err(format!("Output path {} would overwrite an input file", target.display()).into());
    }
    if !single {
        if let Some(dir) = &output {
            fs::create_dir_all(dir)?;
        }
    }

    for ((source, result), path) in results.iter().zip(&targets) {
        match format {
            OutputFormat::Csv => write_delimited(&result.cleaned, path, b',')?,
            OutputFormat::Tsv => write_delimited(&result.cleaned, path, b'\t')?,
            OutputFormat::Json => write_json(&result.cleaned, path)?,
        }
        print_summary(source, result, path);
    }

    if let Some(report_path) = report {
        let json = if let [(_, result)] = results.as_slice() {
            serde_json::to_string_pretty(&result.report)?
        } else {
            let reports = results
                .iter()
                .map(|(source, result)| Ok((source.origin(), serde_json::to_value(&result.report)?)))
                .collect::<Result<serde_json::Map<_, _>, serde_json::Error>>()?;
            serde_json::to_string_pretty(&reports)?
        };
        fs::write(&report_path, json)?;
        println!(
            "{} {}",
            "Report saved to".green(),
            report_path.display().to_string().cyan()
        );
    }

    Ok(())
}

fn print_summary(source: &SourceMetadata, result: &ProcessOutput, path: &Path) {
    let summary = &result.report;
    println!(
        "{} {} of {} records from {} to {}",
        "Wrote".green().bold(),
        summary.record_count().to_string().white().bold(),
        source.row_count,
        source.origin(),
        path.display().to_string().cyan()
    );
    if summary.duplicates_removed() > 0 {
        println!(
            "  Duplicates removed: {}",
            summary.duplicates_removed().to_string().yellow()
        );
    }
    if summary.normalization_failures() > 0 {
        println!(
            "  Values that did not fit their column type: {}",
            summary.normalization_failures().to_string().yellow()
        );
    }
    println!(
        "  Overall completeness: {:.1}%",
        summary.overall_completeness() * 100.0
    );
}

/// Where each cleaned table goes. A single table goes to `output` when
/// given; several tables go into the `output` directory. Without `output`
/// every table lands next to its input.
fn output_paths(
    results: &[(SourceMetadata, ProcessOutput)],
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if let ([_], Some(path)) = (results, output) {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut seen = HashSet::new();
    let mut paths = Vec::with_capacity(results.len());
    for (source, _) in results {
        let name = clean_file_name(source, format);
        let path = match output {
            Some(dir) => dir.join(name),
            None => source.path.with_file_name(name),
        };
        if !seen.insert(path.clone()) {
            return Err(format!("Two tables would be written to {}", path.display()).into());
        }
        paths.push(path);
    }
    Ok(paths)
}

/// `<stem>_clean.<ext>`, or `<stem>_<sheet>_clean.<ext>` for a worksheet.
fn clean_file_name(source: &SourceMetadata, format: OutputFormat) -> String {
    let stem = source.path.file_stem().unwrap_or_default().to_string_lossy();
    match &source.sheet {
        Some(sheet) => {
            let sheet: String = sheet
                .chars()
                .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
                .collect();
            format!("{}_{}_clean.{}", stem, sheet, format.extension())
        }
        None => format!("{}_clean.{}", stem, format.extension()),
    }
}

/// Write the table as delimited text with a header row. Missing cells are
/// written empty.
fn write_delimited(
    table: &CleanedTable,
    path: &Path,
    delimiter: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    writer.write_record(table.columns())?;
    for record in table.records() {
        writer.write_record(
            record
                .iter()
                .map(|cell| cell.as_ref().map(|v| v.to_string()).unwrap_or_default()),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the table as a JSON array of objects in column order. Missing cells
/// are written as `null`.
fn write_json(table: &CleanedTable, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let records: Vec<_> = (0..table.record_count())
        .filter_map(|row| table.record_map(row))
        .collect();

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use sifter::{PROVENANCE_COLUMN, ProcessOptions, RawTable, process};

    use crate::cli::{Cli, Commands};

    fn pipeline_args() -> PipelineArgs {
        let Commands::Profile { pipeline, .. } = Cli::parse_from(["sifter", "profile", "x.csv"]).command
        else {
            panic!("expected profile command");
        };
        pipeline
    }

    fn cleaned() -> CleanedTable {
        let raw = RawTable::from_rows(
            &["name", "joined", "score"],
            &[
                vec![Some("Ana, B."), Some("05/01/2024"), Some("1,5")],
                vec![Some("Bruno"), None, Some("2,25")],
            ],
        );
        process(&raw, &ProcessOptions::default()).unwrap().cleaned
    }

    #[test]
    fn test_write_csv_quotes_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_delimited(&cleaned(), &path, b',').unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,joined,score");
        assert_eq!(lines[1], "\"ana, b.\",2024-01-05,1.5");
        assert_eq!(lines[2], "bruno,,2.25");
    }

    #[test]
    fn test_write_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&cleaned(), &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json[0]["score"], 1.5);
        assert_eq!(json[1]["joined"], serde_json::Value::Null);
        assert_eq!(json[0]["joined"], "2024-01-05");
    }

    #[test]
    fn test_clean_file_names() {
        let raw = RawTable::from_rows(&["a"], &[vec![Some("1")]]);
        let source = SourceMetadata::new(PathBuf::from("data/Vendas.xlsx"), b"", "xlsx", &raw);
        assert_eq!(clean_file_name(&source, OutputFormat::Csv), "Vendas_clean.csv");

        let sheet = source.with_sheet("Q1 / 2024");
        assert_eq!(clean_file_name(&sheet, OutputFormat::Json), "Vendas_Q1___2024_clean.json");
    }

    #[test]
    fn test_clean_several_files_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("clientes.csv");
        let second = dir.path().join("vendas.csv");
        fs::write(&first, "nome,idade\nAna,30\nAna,30\n").unwrap();
        fs::write(&second, "produto;preco\nCafé;1,50\n").unwrap();

        let out = dir.path().join("out");
        let report = dir.path().join("report.json");
        run(
            vec![first.clone(), second.clone()],
            Some(out.clone()),
            None,
            Some(report.clone()),
            pipeline_args(),
        )
        .unwrap();

        let text = fs::read_to_string(out.join("clientes_clean.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], format!("nome,idade,{}", PROVENANCE_COLUMN));
        assert_eq!(lines[1], "ana,30,clientes.csv");
        assert_eq!(lines.len(), 2);

        let text = fs::read_to_string(out.join("vendas_clean.csv")).unwrap();
        assert_eq!(text.lines().nth(1), Some("cafe,1.5,vendas.csv"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(json["clientes.csv"]["duplicates_removed"], 1);
        assert!(json["vendas.csv"].is_object());
    }

    #[test]
    fn test_clean_refuses_to_overwrite_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.csv");
        fs::write(&input, "x\n1\n").unwrap();

        let err = run(vec![input.clone()], Some(input.clone()), None, None, pipeline_args())
            .unwrap_err();
        assert!(err.to_string().contains("overwrite"));
        assert_eq!(fs::read_to_string(&input).unwrap(), "x\n1\n");
    }
}
