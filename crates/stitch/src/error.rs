//! Error types for the stitch library.

use std::path::PathBuf;
use thiserror::Error;

use crate::identity::StoreError;

/// Main error type for stitch operations.
///
/// Validation problems and unmapped headers are reported as data, not as
/// errors. This type covers the failures that stop an operation.
#[derive(Debug, Error)]
pub enum StitchError {
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

    /// Empty file or no data to import.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A source identifier that is not one of the built-in sources.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// A field key that does not exist in the given source schema.
    #[error("Unknown field '{field}' for source '{schema}'")]
    UnknownField { schema: String, field: String },

    /// Source detection was not confident enough to pick a schema.
    #[error("Could not determine the source of this file (candidates: {})", candidates.join(", "))]
    UndeterminedSource { candidates: Vec<String> },

    /// Required schema fields have no column mapped to them.
    #[error("Required fields are not mapped: {}", fields.join(", "))]
    MissingRequiredMapping { fields: Vec<String> },

    /// Failure reported by the customer store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for stitch operations.
pub type Result<T> = std::result::Result<T, StitchError>;
