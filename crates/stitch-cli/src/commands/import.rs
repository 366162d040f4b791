//! Import command - load a CSV export into a customer store.

use std::path::PathBuf;

use colored::Colorize;
use stitch::mapping::MappingOverrides;
use stitch::{ImportReport, Importer, InMemoryStore, StitchConfig};

use super::{CommandResult, load_table, parse_source};

/// How many row errors the human output shows.
const MAX_ERRORS_SHOWN: usize = 10;

pub fn run(
    file: PathBuf,
    store_path: PathBuf,
    org: String,
    source: Option<String>,
    overrides: Vec<String>,
    json_output: bool,
    config: StitchConfig,
) -> CommandResult {
    let table = load_table(&file, &config)?;
    let overrides = parse_overrides(&overrides)?;
    let source = parse_source(source)?;

    let store = InMemoryStore::open(&store_path)?;
    let mut importer = Importer::new(&store, org).with_config(config).with_overrides(overrides);
    if let Some(source) = source {
        importer = importer.with_source(source);
    }

    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let report = importer.import_table(&file_name, &table)?;
    store.save(&store_path)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &store_path);
    }

    Ok(())
}

/// Parse `HEADER=FIELD` pairs; an empty field unmaps the header.
fn parse_overrides(pairs: &[String]) -> Result<MappingOverrides, String> {
    pairs
        .iter()
        .map(|pair| {
            let (header, field) = pair
                .split_once('=')
                .ok_or_else(|| format!("Invalid --map '{}': expected HEADER=FIELD", pair))?;
            let field = field.trim();
            let field = (!field.is_empty()).then(|| field.to_string());
            Ok((header.trim().to_string(), field))
        })
        .collect()
}

fn print_report(report: &ImportReport, store_path: &std::path::Path) {
    println!(
        "{} {} {}",
        "Imported".cyan().bold(),
        report.file_name.white(),
        format!("as {}", report.source).cyan()
    );
    println!();
    println!("  Rows:       {}", report.rows_total.to_string().white().bold());
    println!("  Imported:   {}", report.rows_imported.to_string().green());
    println!("  Failed:     {}", report.rows_failed.to_string().red());
    println!("  Duplicates: {}", report.duplicates.to_string().yellow());
    println!("  Customers:  {} new", report.customers_created.to_string().white());
    println!(
        "  Conflicts:  {} ({} while stitching, {} from scan)",
        report.total_conflicts().to_string().yellow().bold(),
        report.conflicts_flagged,
        report.post_import_conflicts
    );

    if !report.parse_issues.is_empty() {
        println!();
        println!("{}", "Parse issues:".yellow().bold());
        for issue in &report.parse_issues {
            println!("  row {}: {}", issue.row, issue.message);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("{}", "Row errors:".red().bold());
        for error in report.errors.iter().take(MAX_ERRORS_SHOWN) {
            let field = error.field.as_deref().unwrap_or("-");
            println!(
                "  row {} [{}] {}: {}",
                error.row,
                error.stage.label(),
                field,
                error.message
            );
        }
        if report.errors.len() > MAX_ERRORS_SHOWN {
            println!("  ... and {} more", report.errors.len() - MAX_ERRORS_SHOWN);
        }
    }

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        store_path.display().to_string().white()
    );
    if report.total_conflicts() > 0 {
        println!(
            "Run {} to review them",
            format!("stitch conflicts --store {}", store_path.display()).cyan().bold()
        );
    }
}
