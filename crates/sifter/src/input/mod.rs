//! Loaders that turn files into raw tables.
//!
//! The pipeline never calls these; callers load a [`RawTable`] and hand it
//! over.

mod excel;
mod json;
mod parser;
mod source;

use std::path::Path;

pub use excel::ExcelLoader;
pub use json::JsonLoader;
pub use parser::{CsvLoader, DEFAULT_NULL_TOKENS, LoaderConfig};
pub use source::{LoadedTable, RawTable, SourceMetadata, content_hash};

use crate::error::{Result, SifterError};

/// Load a file, choosing the loader from its extension.
///
/// `.json` goes to [`JsonLoader`]; workbooks (`.xlsx`, `.xlsm`, `.xlsb`,
/// `.xls`, `.ods`) go to [`ExcelLoader`] and give one table per non-empty
/// sheet; `.csv`, `.tsv`, `.txt`, `.psv` and files without an extension go
/// to [`CsvLoader`] with the given configuration.
pub fn load_path(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<Vec<LoadedTable>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => JsonLoader::new().load_file(path).map(single),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => {
            ExcelLoader::with_config(config.clone()).load_file(path)
        }
        Some("csv" | "tsv" | "txt" | "psv") | None => CsvLoader::with_config(config.clone())
            .load_file(path)
            .map(single),
        Some(other) => Err(SifterError::UnsupportedFormat(format!(
            "'.{}' files are not supported",
            other
        ))),
    }
}

fn single((table, source): (RawTable, SourceMetadata)) -> Vec<LoadedTable> {
    vec![LoadedTable::new(table, source)]
}

/// Load several files in order. Tables keep the order of `paths`, and sheets
/// the order of their workbook. Stops at the first file that fails to load.
pub fn load_batch<P: AsRef<Path>>(paths: &[P], config: &LoaderConfig) -> Result<Vec<LoadedTable>> {
    let mut tables = Vec::new();
    for path in paths {
        tables.extend(load_path(path, config)?);
    }
    Ok(tables)
}
