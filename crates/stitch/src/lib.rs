//! Stitch: column-mapping inference and customer identity stitching for
//! CSV exports.
//!
//! Exports from a payment processor, a scheduling tool and a ticketing tool
//! are mapped onto per-source schemas, validated, and resolved to a single
//! customer graph.
//!
//! # Core Principles
//!
//! - **Best effort, never silent**: unsure mappings stay unmapped and
//!   possible duplicate customers are flagged for review, not merged
//! - **Pure inference**: mapping and detection are deterministic functions
//!   of the headers and a few sample rows
//! - **Row isolation**: one bad row never aborts an import
//!
//! # Example
//!
//! ```no_run
//! use stitch::{detect_source, is_confident_detection, Parser};
//!
//! let (table, _) = Parser::new().parse_file("export.csv").unwrap();
//! let results = detect_source(&table.headers, &table.sample_rows(5));
//!
//! if is_confident_detection(&results) {
//!     println!("Looks like a {} export", results[0].source);
//! }
//! ```

pub mod config;
pub mod detection;
pub mod error;
pub mod identity;
pub mod import;
pub mod input;
pub mod mapping;
pub mod schema;
pub mod validation;

pub use config::StitchConfig;
pub use detection::{detect_source, is_confident_detection, DetectionResult, SourceDetector};
pub use error::{Result, StitchError};
pub use identity::{CustomerStore, IdentityStitcher, InMemoryStore, StitchResult, StitchingConflict};
pub use import::{ImportReport, Importer};
pub use input::{DataTable, Parser, RawRow, SourceMetadata};
pub use mapping::{generate_mapping_suggestions, suggestions_to_mapping, FieldMapping, MappingSuggestion, MatchType};
pub use schema::{builtin_schemas, schema_for, SourceKind, SourceSchema};
pub use validation::{apply_mapping, validate_mapped_row, MappedRow, ValidationError};
