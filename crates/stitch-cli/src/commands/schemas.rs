//! Schemas command - list the built-in source schemas.

use colored::Colorize;
use stitch::builtin_schemas;

use super::CommandResult;

pub fn run() -> CommandResult {
    for schema in builtin_schemas() {
        println!(
            "{} {} {}",
            schema.label.cyan().bold(),
            format!("({})", schema.source).white(),
            format!("-> table '{}'", schema.table).dimmed()
        );

        for field in schema.fields_required_first() {
            let marker = if field.required { "*".red().to_string() } else { " ".to_string() };
            let aliases = if field.aliases.is_empty() {
                String::new()
            } else {
                format!("aka {}", field.aliases.join(", "))
            };
            println!(
                "  {}{:16} {:10} {}",
                marker,
                field.key,
                field.field_type.label(),
                aliases.dimmed()
            );
        }
        println!();
    }

    println!("{} required", "*".red());
    Ok(())
}
