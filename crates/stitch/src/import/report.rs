//! Outcome of an import run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::detection::DetectionResult;
use crate::identity::ImportSummary;
use crate::input::RowIssue;
use crate::mapping::{FieldMapping, MappingSuggestion};
use crate::schema::SourceKind;
use crate::validation::ValidationError;

/// Step of the row pipeline that rejected a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStage {
    Validation,
    Stitching,
    Insert,
}

impl RowStage {
    pub fn label(&self) -> &'static str {
        match self {
            RowStage::Validation => "validation",
            RowStage::Stitching => "stitching",
            RowStage::Insert => "insert",
        }
    }
}

/// A row that could not be imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    /// Zero-based data record index in the file, as in [`RowIssue::row`].
    pub row: usize,
    pub stage: RowStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub message: String,
}

impl RowError {
    pub(crate) fn new(row: usize, stage: RowStage, message: impl Into<String>) -> Self {
        Self {
            row,
            stage,
            field: None,
            value: None,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for RowError {
    fn from(e: ValidationError) -> Self {
        Self {
            row: e.row,
            stage: RowStage::Validation,
            field: Some(e.field),
            value: Some(e.value),
            message: e.message,
        }
    }
}

/// Everything an import did, row counts included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub import_id: Uuid,
    pub file_name: String,
    pub source: SourceKind,
    /// Ranked detection results; empty when the source was given.
    pub detection: Vec<DetectionResult>,
    /// Suggestions before overrides.
    pub suggestions: Vec<MappingSuggestion>,
    /// Mapping the rows were imported with.
    pub mapping: FieldMapping,
    pub rows_total: usize,
    pub rows_imported: usize,
    pub rows_failed: usize,
    /// Rows whose record already existed.
    pub duplicates: usize,
    pub customers_created: usize,
    /// Conflicts flagged while stitching rows.
    pub conflicts_flagged: usize,
    /// Conflicts found by the scan after the last row.
    pub post_import_conflicts: usize,
    pub errors: Vec<RowError>,
    pub parse_issues: Vec<RowIssue>,
}

impl ImportReport {
    /// Total conflicts recorded by this import.
    pub fn total_conflicts(&self) -> usize {
        self.conflicts_flagged + self.post_import_conflicts
    }

    /// Whether every row made it in.
    pub fn is_clean(&self) -> bool {
        self.rows_failed == 0 && self.parse_issues.is_empty()
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            rows_total: self.rows_total,
            rows_imported: self.rows_imported,
            rows_failed: self.rows_failed,
            duplicates: self.duplicates,
            customers_created: self.customers_created,
            conflicts_flagged: self.total_conflicts(),
        }
    }
}
