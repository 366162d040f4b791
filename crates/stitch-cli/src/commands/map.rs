//! Map command - show the suggested header mapping for a file.

use std::path::PathBuf;

use colored::Colorize;
use stitch::mapping::{unmapped_required_fields, MappingEngine};
use stitch::{schema_for, suggestions_to_mapping, MatchType, SourceDetector, StitchConfig};

use super::{CommandResult, load_table, parse_source};

pub fn run(file: PathBuf, source: Option<String>, json_output: bool, config: &StitchConfig) -> CommandResult {
    let table = load_table(&file, config)?;
    let samples = table.sample_rows(config.mapping.sample_rows);

    let source = match parse_source(source)? {
        Some(source) => source,
        None => {
            let detector = SourceDetector::new().with_config(config.mapping.clone(), config.detection.clone());
            let results = detector.detect(&table.headers, &samples);
            let top = results.first().ok_or("no source schemas registered")?;
            if !detector.is_confident(&results) && !json_output {
                println!(
                    "{} showing best guess '{}'",
                    "Source detection is not confident;".yellow(),
                    top.source
                );
                println!();
            }
            top.source
        }
    };

    let schema = schema_for(source);
    let suggestions = MappingEngine::with_config(schema, config.mapping.clone()).suggest(&table.headers, &samples);
    let mapping = suggestions_to_mapping(&suggestions);
    let missing: Vec<&str> = unmapped_required_fields(&mapping, schema)
        .iter()
        .map(|f| f.key.as_str())
        .collect();

    if json_output {
        let output = serde_json::json!({
            "source": source,
            "suggestions": suggestions,
            "mapping": mapping,
            "unmapped_required": missing,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} {}",
        "Mapping".cyan().bold(),
        file.display().to_string().white(),
        format!("as {}", schema.label).cyan()
    );
    println!();

    for suggestion in &suggestions {
        let target = match &suggestion.schema_field {
            Some(field) => field.green().to_string(),
            None => "(unmapped)".dimmed().to_string(),
        };
        let how = match suggestion.match_type {
            MatchType::None => String::new(),
            other => format!("{} {:.0}%", other.label(), suggestion.confidence * 100.0),
        };
        println!("  {:30} -> {:20} {}", suggestion.csv_header, target, how.dimmed());
    }

    println!();
    if missing.is_empty() {
        println!("{}", "All required fields are mapped.".green());
    } else {
        println!(
            "{} {}",
            "Required fields without a column:".red().bold(),
            missing.join(", ")
        );
        println!("Use {} to map them during import.", "--map HEADER=FIELD".cyan());
    }

    Ok(())
}
