//! CLI command implementations.

pub mod conflicts;
pub mod detect;
pub mod import;
pub mod map;
pub mod schemas;

use std::path::Path;

use stitch::{DataTable, Parser, SourceKind, StitchConfig};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Parse a CSV export, failing early with a readable message if it is missing.
fn load_table(file: &Path, config: &StitchConfig) -> Result<DataTable, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    let (table, _) = Parser::with_config(config.parser.clone()).parse_file(file)?;
    Ok(table)
}

fn parse_source(source: Option<String>) -> Result<Option<SourceKind>, Box<dyn std::error::Error>> {
    Ok(source.map(|s| s.parse::<SourceKind>()).transpose()?)
}
