//! Parsed tables and file metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One parsed CSV row keyed by its original header, in file column order.
pub type RawRow = IndexMap<String, String>;

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            read_at: Utc::now(),
        }
    }
}

/// A record the parser could not read cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    /// Zero-based data record index in the file, counting skipped records.
    pub row: usize,
    pub message: String,
}

/// Represents parsed tabular data.
#[derive(Debug, Clone)]
pub struct DataTable {
    /// Column headers, as written in the file.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// The delimiter used.
    pub delimiter: u8,
    /// Parse-level problems, one per affected row.
    pub issues: Vec<RowIssue>,
    /// File record index of each row in `rows`. Differs from the position
    /// once blank or malformed records have been skipped.
    pub record_indices: Vec<usize>,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        let record_indices = (0..rows.len()).collect();
        Self {
            headers,
            rows,
            delimiter,
            issues: Vec::new(),
            record_indices,
        }
    }

    /// Attach parse issues collected while reading.
    pub fn with_issues(mut self, issues: Vec<RowIssue>) -> Self {
        self.issues = issues;
        self
    }

    /// Attach the file record index of every row.
    pub fn with_record_indices(mut self, record_indices: Vec<usize>) -> Self {
        self.record_indices = record_indices;
        self
    }

    /// File record index of row `index`, the index space of [`RowIssue::row`].
    pub fn record_index(&self, index: usize) -> usize {
        self.record_indices.get(index).copied().unwrap_or(index)
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// A row as a header-keyed map.
    pub fn raw_row(&self, index: usize) -> Option<RawRow> {
        let row = self.rows.get(index)?;
        Some(
            self.headers
                .iter()
                .zip(row.iter())
                .map(|(h, v)| (h.clone(), v.clone()))
                .collect(),
        )
    }

    /// Iterate over every row as a header-keyed map.
    pub fn raw_rows(&self) -> impl Iterator<Item = RawRow> + '_ {
        (0..self.rows.len()).filter_map(move |i| self.raw_row(i))
    }

    /// The first `n` rows, used as evidence for sample-pattern matching.
    pub fn sample_rows(&self, n: usize) -> Vec<RawRow> {
        self.raw_rows().take(n).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataTable {
        DataTable::new(
            vec!["Email".into(), "Name".into()],
            vec![
                vec!["a@x.com".into(), "A".into()],
                vec!["b@x.com".into(), "B".into()],
                vec!["c@x.com".into(), "C".into()],
            ],
            b',',
        )
    }

    #[test]
    fn test_raw_row_preserves_header_order() {
        let row = table().raw_row(1).unwrap();
        let keys: Vec<&str> = row.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Email", "Name"]);
        assert_eq!(row["Email"], "b@x.com");
    }

    #[test]
    fn test_sample_rows_caps_at_table_length() {
        assert_eq!(table().sample_rows(2).len(), 2);
        assert_eq!(table().sample_rows(10).len(), 3);
    }

    #[test]
    fn test_record_index_defaults_to_position() {
        let t = table();
        assert_eq!(t.record_index(2), 2);
        let t = t.with_record_indices(vec![0, 2, 5]);
        assert_eq!(t.record_index(2), 5);
    }

    #[test]
    fn test_raw_row_out_of_range() {
        assert!(table().raw_row(3).is_none());
    }
}
