//! Detect command - rank the known sources for a file.

use std::path::PathBuf;

use colored::Colorize;
use stitch::{SourceDetector, StitchConfig};

use super::{CommandResult, load_table};

pub fn run(file: PathBuf, json_output: bool, config: &StitchConfig) -> CommandResult {
    let table = load_table(&file, config)?;
    let detector = SourceDetector::new().with_config(config.mapping.clone(), config.detection.clone());
    let results = detector.detect(&table.headers, &table.sample_rows(config.mapping.sample_rows));
    let confident = detector.is_confident(&results);

    if json_output {
        let output = serde_json::json!({
            "file": file.display().to_string(),
            "confident": confident,
            "source": results.first().filter(|_| confident).map(|r| r.source),
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Detecting source of".cyan().bold(),
        file.display().to_string().white()
    );
    println!();
    println!(
        "  {:12} {:>10} {:>8} {:>10}",
        "SOURCE".bold(),
        "SCORE".bold(),
        "MAPPED".bold(),
        "REQUIRED".bold()
    );
    for result in &results {
        let required = format!("{}/{}", result.required_mapped, result.required_total);
        let required = if result.all_required_mapped() {
            required.green()
        } else {
            required.yellow()
        };
        println!(
            "  {:12} {:>9.0}% {:>8} {:>10}",
            result.source.to_string(),
            result.confidence * 100.0,
            result.mapped_count,
            required
        );
    }
    println!();

    match results.first() {
        Some(top) if confident => println!("{} {}", "Detected:".green().bold(), top.source.to_string().white().bold()),
        _ => println!(
            "{} pass {} to choose one",
            "Not confident enough to pick a source;".yellow(),
            "--source".cyan()
        ),
    }

    Ok(())
}
