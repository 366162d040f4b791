//! Conflicts command - list identity conflicts awaiting review.

use std::path::PathBuf;

use colored::Colorize;
use stitch::identity::ConflictStatus;
use stitch::{CustomerStore, InMemoryStore};

use super::CommandResult;

pub fn run(store_path: PathBuf, status: Option<String>, json_output: bool) -> CommandResult {
    if !store_path.exists() {
        return Err(format!(
            "Store not found: {}\nRun 'stitch import <FILE> --store {}' first.",
            store_path.display(),
            store_path.display()
        )
        .into());
    }

    let status = status.map(|s| s.parse::<ConflictStatus>()).transpose()?;
    let store = InMemoryStore::load(&store_path)?;
    let conflicts = store.list_conflicts(None, status)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&conflicts)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("{}", "No conflicts found.".green());
        return Ok(());
    }

    println!(
        "{} {}",
        conflicts.len().to_string().white().bold(),
        "conflicts".cyan().bold()
    );
    println!();

    for conflict in &conflicts {
        let status = match conflict.status {
            ConflictStatus::Pending => conflict.status.label().yellow(),
            ConflictStatus::Merged => conflict.status.label().green(),
            ConflictStatus::Dismissed | ConflictStatus::Split => conflict.status.label().dimmed(),
        };
        println!(
            "  [{}] {}={} ({:.0}%)",
            status,
            conflict.match_field,
            conflict.match_value.white().bold(),
            conflict.confidence * 100.0
        );
        println!("      {} <-> {}", conflict.customer_a, conflict.customer_b);
        println!(
            "      {} {}",
            "flagged".dimmed(),
            conflict.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed()
        );
    }

    Ok(())
}
