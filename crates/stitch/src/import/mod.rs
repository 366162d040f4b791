//! End-to-end import of one CSV export.

mod importer;
mod report;

pub use importer::Importer;
pub use report::{ImportReport, RowError, RowStage};
