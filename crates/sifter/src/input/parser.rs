//! CSV/TSV loader with delimiter detection.

use std::borrow::Cow;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use tracing::debug;

use crate::error::{Result, SifterError};
use super::source::{RawTable, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Tokens read as missing cells by default (compared case-insensitively).
pub const DEFAULT_NULL_TOKENS: &[&str] = &["", "na", "n/a", "null", "none", "nil", ".", "-"];

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum records to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Cell texts read as missing, compared trimmed and case-insensitively.
    pub null_tokens: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            null_tokens: DEFAULT_NULL_TOKENS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl LoaderConfig {
    /// Set the delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the maximum number of records read.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Replace the null tokens.
    pub fn with_null_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether a cell text is a null token.
    pub fn is_null(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.null_tokens
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case(trimmed))
    }
}

/// Loads delimited text files into raw tables.
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    config: LoaderConfig,
}

impl CsvLoader {
    /// Create a new loader with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a file and return the raw table and metadata.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<(RawTable, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| SifterError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let (text, encoding) = decode(&contents);
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(text.as_bytes())?,
        };
        let table = self.load_str(&text, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        };

        debug!(
            path = %path.display(),
            format,
            encoding = %encoding,
            records = table.record_count(),
            columns = table.column_count(),
            "loaded delimited file"
        );

        let metadata =
            SourceMetadata::new(path.to_path_buf(), &contents, format, &table).with_encoding(encoding);
        Ok((table, metadata))
    }

    /// Load text that is already in memory, detecting the delimiter.
    pub fn load_text(&self, text: &str) -> Result<RawTable> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(text.as_bytes())?,
        };
        self.load_str(text, delimiter)
    }

    fn load_str(&self, text: &str, delimiter: u8) -> Result<RawTable> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = reader.records();

        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<Option<String>>> = Vec::new();

        if self.config.has_header {
            match records.next() {
                Some(header) => columns = header?.iter().map(|s| s.trim().to_string()).collect(),
                None => return Err(SifterError::EmptyData("No header row found".to_string())),
            }
        }

        for result in records {
            if let Some(max) = self.config.max_rows {
                if rows.len() >= max {
                    break;
                }
            }

            let record = result?;
            if !self.config.has_header && columns.is_empty() {
                // Generate column names
                columns = (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect();
            }

            let row = record
                .iter()
                .map(|cell| (!self.config.is_null(cell)).then(|| cell.to_string()))
                .collect();
            rows.push(row);
        }

        if columns.is_empty() {
            return Err(SifterError::EmptyData("No columns found".to_string()));
        }

        Ok(RawTable::new(columns, rows))
    }
}

/// Decode file bytes and name the encoding used.
///
/// A byte-order mark decides the encoding. Without one, UTF-8 is tried first
/// and Windows-1252 (Latin-1 plus the 0x80-0x9F printable range) is the
/// fallback.
fn decode(bytes: &[u8]) -> (Cow<'_, str>, String) {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return (text, encoding.name().to_ascii_lowercase());
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), "utf-8".to_string()),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            (text, WINDOWS_1252.name().to_ascii_lowercase())
        }
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(SifterError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab gets a slight bonus.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_semicolon_with_decimal_commas() {
        let data = b"name;price\nA;1,50\nB;2,75";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_load_csv() {
        let loader = CsvLoader::new();
        let table = loader
            .load_text("name,age,city\nAlice,30,NYC\nBob,25,LA")
            .unwrap();

        assert_eq!(table.columns(), ["name", "age", "city"]);
        assert_eq!(table.record_count(), 2);
        assert_eq!(table.get(0, 0), Some("Alice"));
        assert_eq!(table.get(1, 1), Some("25"));
    }

    #[test]
    fn test_null_tokens_become_missing() {
        let loader = CsvLoader::new();
        let table = loader.load_text("a,b\nNA,1\n,null\n-,x").unwrap();
        assert_eq!(table.column_values(0), vec![None, None, None]);
        assert_eq!(table.column_values(1), vec![Some("1"), None, Some("x")]);
    }

    #[test]
    fn test_is_null() {
        let config = LoaderConfig::default();
        assert!(config.is_null(""));
        assert!(config.is_null("NA"));
        assert!(config.is_null("na"));
        assert!(config.is_null("N/A"));
        assert!(config.is_null("NULL"));
        assert!(config.is_null(" . "));
        assert!(!config.is_null("value"));
        assert!(!config.is_null("0"));
    }

    #[test]
    fn test_headerless_and_max_rows() {
        let config = LoaderConfig {
            has_header: false,
            ..LoaderConfig::default()
        }
        .with_max_rows(1);
        let table = CsvLoader::with_config(config).load_text("1,2\n3,4").unwrap();
        assert_eq!(table.columns(), ["column_1", "column_2"]);
        assert_eq!(table.record_count(), 1);
    }

    #[test]
    fn test_bom_is_stripped() {
        let table = CsvLoader::new().load_text("\u{feff}id,name\n1,a").unwrap();
        assert_eq!(table.columns()[0], "id");
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        let (text, encoding) = decode(b"Jo\xe3o");
        assert_eq!(text, "João");
        assert_eq!(encoding, "windows-1252");

        // Euro sign and curly quotes live in 0x80-0x9F.
        let (text, _) = decode(b"\x80 5 \x93ok\x94");
        assert_eq!(text, "€ 5 \u{201c}ok\u{201d}");

        let (_, encoding) = decode("João".as_bytes());
        assert_eq!(encoding, "utf-8");
    }

    #[test]
    fn test_decode_follows_byte_order_mark() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "id\nJoão\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let (text, encoding) = decode(&bytes);
        assert_eq!(text, "id\nJoão\n");
        assert_eq!(encoding, "utf-16le");

        let (text, encoding) = decode(b"\xEF\xBB\xBFid");
        assert_eq!(text, "id");
        assert_eq!(encoding, "utf-8");
    }
}
