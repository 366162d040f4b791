//! CSV/TSV parser with delimiter detection.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::source::{DataTable, RowIssue, SourceMetadata};
use crate::error::{Result, StitchError};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

const UTF8_BOM: &str = "\u{feff}";

/// Parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses exported CSV files into a [`DataTable`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| StitchError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| StitchError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let table = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            format,
            table.row_count(),
            table.column_count(),
        );

        tracing::debug!(
            file = %metadata.file,
            rows = metadata.row_count,
            columns = metadata.column_count,
            format = %metadata.format,
            "parsed file"
        );

        Ok((table, metadata))
    }

    /// Parse in-memory CSV text.
    pub fn parse_str(&self, text: &str) -> Result<DataTable> {
        let bytes = text.as_bytes();
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        self.parse_bytes(bytes, delimiter)
    }

    fn reader<'a>(&self, bytes: &'a [u8], delimiter: u8) -> csv::Reader<&'a [u8]> {
        csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes)
    }

    /// Parse bytes directly.
    ///
    /// A malformed record is recorded as a [`RowIssue`] and skipped; it
    /// never aborts the rest of the file.
    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = self.reader(bytes, delimiter);

        let headers: Vec<String> = if self.config.has_header {
            reader
                .headers()?
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let s = if i == 0 { s.trim_start_matches(UTF8_BOM) } else { s };
                    s.trim().to_string()
                })
                .collect()
        } else {
            match reader.records().next() {
                Some(Ok(record)) => (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect(),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(StitchError::EmptyData("No data rows found".to_string())),
            }
        };

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(StitchError::EmptyData("No columns found".to_string()));
        }
        let headers = unique_headers(headers);

        let mut rows = Vec::new();
        let mut record_indices = Vec::new();
        let mut issues = Vec::new();
        let expected_cols = headers.len();

        // Re-create the reader: the no-header path consumed the first record.
        let mut reader = self.reader(bytes, delimiter);

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(row = row_idx, error = %e, "skipping malformed row");
                    issues.push(RowIssue {
                        row: row_idx,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();

            if row.len() != expected_cols {
                issues.push(RowIssue {
                    row: row_idx,
                    message: format!(
                        "expected {} fields, found {}",
                        expected_cols,
                        row.len()
                    ),
                });
            }
            row.resize(expected_cols, String::new());

            rows.push(row);
            record_indices.push(row_idx);
        }

        Ok(DataTable::new(headers, rows, delimiter)
            .with_issues(issues)
            .with_record_indices(record_indices))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Make every header name distinct so each column stays addressable.
///
/// Blank headers become `column_N` (1-based position); a repeated name gets
/// `_2`, `_3`, ... appended in file order.
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());

    for (i, header) in headers.into_iter().enumerate() {
        let base = if header.is_empty() {
            format!("column_{}", i + 1)
        } else {
            header
        };

        let mut name = base.clone();
        let mut n = 2;
        while seen.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        if name != base {
            tracing::warn!(header = %base, renamed = %name, "duplicate header renamed");
        }
        seen.insert(name.clone());
        out.push(name);
    }

    out
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(StitchError::EmptyData("No lines to analyze".to_string()));
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
            counts
                .iter()
                .map(|&c| (c as f64 - mean).powi(2))
                .sum::<f64>()
                / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tabs rarely appear inside values.
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
    fn test_detect_delimiter_ignores_quoted_commas() {
        let data = b"name;amount\n\"Doe, Jane\";10\n\"Roe, Rick\";20";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_parse_csv() {
        let parser = Parser::new();
        let table = parser
            .parse_str("Email,Name,Amount\njane@a.com,Jane,10\nbob@b.com,Bob,25")
            .unwrap();

        assert_eq!(table.headers, vec!["Email", "Name", "Amount"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 0), Some("jane@a.com"));
        assert_eq!(table.get(1, 2), Some("25"));
        assert!(table.issues.is_empty());
    }

    #[test]
    fn test_parse_strips_bom() {
        let parser = Parser::new();
        let table = parser.parse_str("\u{feff}Email,Name\na@b.com,A\n").unwrap();
        assert_eq!(table.headers[0], "Email");
    }

    #[test]
    fn test_ragged_rows_are_padded_and_reported() {
        let parser = Parser::new();
        let table = parser.parse_str("a,b,c\n1,2\n4,5,6,7\n").unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.rows[1], vec!["4", "5", "6"]);
        assert_eq!(table.issues.len(), 2);
        assert_eq!(table.issues[0].row, 0);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let parser = Parser::new();
        let table = parser.parse_str("a,b\n1,2\n,\n3,4\n").unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_skipped_records_keep_file_indices() {
        let parser = Parser::new();
        let table = parser.parse_str("a,b\n1,2\n,\n3\n5,6\n").unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.record_indices, vec![0, 2, 3]);
        // The ragged record is reported under the same index it keeps.
        assert_eq!(table.issues[0].row, table.record_index(1));
    }

    #[test]
    fn test_duplicate_headers_are_renamed() {
        let parser = Parser::new();
        let table = parser
            .parse_str("Email,Name,Email,,Email\na@x.com,A,b@x.com,z,c@x.com\n")
            .unwrap();

        assert_eq!(table.headers, vec!["Email", "Name", "Email_2", "column_4", "Email_3"]);
        let row = table.raw_row(0).unwrap();
        assert_eq!(row.len(), 5);
        assert_eq!(row["Email"], "a@x.com");
        assert_eq!(row["Email_2"], "b@x.com");
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let parser = Parser::new();
        let table = parser.parse_str("a,b,c\n").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let parser = Parser::new();
        assert!(matches!(
            parser.parse_str(""),
            Err(StitchError::EmptyData(_))
        ));
    }
}
