//! Stitch CLI - CSV column mapping and customer identity stitching.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use stitch::StitchConfig;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Detect { file, json } => commands::detect::run(file, json, &config),

        Commands::Map { file, source, json } => commands::map::run(file, source, json, &config),

        Commands::Import {
            file,
            store,
            org,
            source,
            overrides,
            json,
        } => commands::import::run(file, store, org, source, overrides, json, config),

        Commands::Conflicts {
            store,
            status,
            json,
        } => commands::conflicts::run(store, status, json),

        Commands::Schemas => commands::schemas::run(),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<StitchConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let config = StitchConfig::load(path)?;
            tracing::debug!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        None => Ok(StitchConfig::default()),
    }
}
