//! trimark - Trim a video and overlay a watermark
//!
//! # Usage
//!
//! ```bash
//! trimark export -i clip.mp4 -w logo.png --from 10 --to 60 --transparency 40
//! trimark preview -i clip.mp4 -w logo.png --scale 200
//! trimark plan --duration 120 --from 10 --to 60 --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use trimark_cli::adapters::TomlConfigAdapter;
use trimark_cli::app::DefaultAppContainer;
use trimark_cli::cli::{commands, Cli, Commands};
use trimark_cli::config_initialization::initialize_configuration_hierarchy;
use trimark_cli::utils::logging::init_logging;

/// Main entry point for the trimark CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TomlConfigAdapter::new();
    let settings = initialize_configuration_hierarchy(&config, &cli).await?;
    init_logging(&settings.logging_config());

    if let Some(path) = config.config_file_path() {
        debug!("Configuration loaded from {}", path.display());
    }

    match cli.command {
        Commands::Export(args) => {
            info!("Executing export command");
            let container = DefaultAppContainer::new(&settings);
            commands::export(&container, &settings, args, cli.overwrite).await?;
        }
        Commands::Preview(args) => {
            info!("Executing preview command");
            let container = DefaultAppContainer::new(&settings);
            commands::preview(&container, &settings, args, cli.overwrite).await?;
        }
        Commands::Plan(args) => {
            debug!("Executing plan command");
            commands::plan(&settings, args)?;
        }
    }

    Ok(())
}
