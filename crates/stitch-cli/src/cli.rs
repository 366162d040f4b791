//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stitch: map CSV exports onto known sources and resolve customer identities
#[derive(Parser)]
#[command(name = "stitch")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON configuration file overriding default thresholds
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank the known sources for a CSV export
    Detect {
        /// Path to the CSV export
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest which header maps to which schema field
    Map {
        /// Path to the CSV export
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Source to map against (default: detected)
        #[arg(short, long)]
        source: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import a CSV export into a customer store
    Import {
        /// Path to the CSV export
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Store snapshot to read and update (created if missing)
        #[arg(long, value_name = "STORE")]
        store: PathBuf,

        /// Organization the customers belong to
        #[arg(long, default_value = "default")]
        org: String,

        /// Source of the export (default: detected)
        #[arg(short, long)]
        source: Option<String>,

        /// Override a mapping: HEADER=FIELD, or HEADER= to unmap
        #[arg(long = "map", value_name = "HEADER=FIELD")]
        overrides: Vec<String>,

        /// Output the import report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List flagged identity conflicts
    Conflicts {
        /// Store snapshot to read
        #[arg(long, value_name = "STORE")]
        store: PathBuf,

        /// Only conflicts with this status (pending, merged, dismissed, split)
        #[arg(long)]
        status: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in source schemas
    Schemas,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeated_map_and_verbosity() {
        let cli = Cli::try_parse_from([
            "stitch", "-vv", "import", "a.csv", "--store", "s.json", "--map", "Ref=payment_id", "--map",
            "Notes=",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Import { overrides, org, .. } => {
                assert_eq!(overrides, vec!["Ref=payment_id", "Notes="]);
                assert_eq!(org, "default");
            }
            _ => panic!("expected import"),
        }
    }
}
