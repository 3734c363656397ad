//! Spreadsheet loader: every non-empty sheet becomes its own raw table.

use std::fs;
use std::path::Path;

use calamine::{Data, DataType, Range, Reader, open_workbook_auto};
use chrono::NaiveTime;
use tracing::debug;

use super::parser::LoaderConfig;
use super::source::{LoadedTable, RawTable, SourceMetadata};
use crate::error::{Result, SifterError};
use crate::schema::{DATE_FORMAT, DATETIME_FORMAT};

/// Loads workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
///
/// Cells are handed over as text so the pipeline infers every column the
/// same way it does for delimited files. Numbers are rendered in plain
/// syntax, date cells in ISO form, and error cells (`#DIV/0!`) are missing.
#[derive(Debug, Clone, Default)]
pub struct ExcelLoader {
    config: LoaderConfig,
}

impl ExcelLoader {
    /// Create a new loader with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with custom configuration. The delimiter and quote
    /// settings do not apply to workbooks.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load every non-empty sheet, in workbook order.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Vec<LoadedTable>> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| SifterError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let format = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_else(|| "xlsx".to_string());

        let mut workbook = open_workbook_auto(path)?;
        let mut tables = Vec::new();

        for sheet in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet)?;
            if range.is_empty() {
                debug!(path = %path.display(), sheet = %sheet, "skipping empty sheet");
                continue;
            }

            let table = self.load_range(&range)?;
            debug!(
                path = %path.display(),
                sheet = %sheet,
                records = table.record_count(),
                columns = table.column_count(),
                "loaded sheet"
            );

            let source = SourceMetadata::new(path.to_path_buf(), &contents, format.as_str(), &table)
                .with_encoding("binary")
                .with_sheet(sheet);
            tables.push(LoadedTable::new(table, source));
        }

        if tables.is_empty() {
            return Err(SifterError::EmptyData(format!(
                "no sheet of {} holds any data",
                path.display()
            )));
        }
        Ok(tables)
    }

    /// Convert one sheet into a raw table. Blank header cells get generated
    /// `column_N` names.
    pub fn load_range(&self, range: &Range<Data>) -> Result<RawTable> {
        let mut rows = range.rows();

        let columns: Vec<String> = if self.config.has_header {
            let header = rows
                .next()
                .ok_or_else(|| SifterError::EmptyData("No header row found".to_string()))?;
            header
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    cell_text(cell)
                        .map(|name| name.trim().to_string())
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| format!("column_{}", i + 1))
                })
                .collect()
        } else {
            (0..range.width()).map(|i| format!("column_{}", i + 1)).collect()
        };

        let records = rows
            .take(self.config.max_rows.unwrap_or(usize::MAX))
            .map(|row| {
                row.iter()
                    .map(|cell| cell_text(cell).filter(|text| !self.config.is_null(text)))
                    .collect()
            })
            .collect();

        Ok(RawTable::new(columns, records))
    }
}

/// Text of one cell, or `None` for empty and error cells.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) => Some(text.clone()),
        Data::DateTime(_) => cell.as_datetime().map(|dt| {
            let format = if dt.time() == NaiveTime::MIN {
                DATE_FORMAT
            } else {
                DATETIME_FORMAT
            };
            dt.format(format).to_string()
        }),
        other => Some(other.to_string()),
    }
}
