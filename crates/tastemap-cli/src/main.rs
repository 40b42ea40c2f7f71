//! tastemap
//!
//! Admin tool for mapping restaurant categories onto interests.
//!
//! # Usage
//!
//! ```bash
//! tastemap restaurants add --id ID --name NAME --categories "a,b"
//! tastemap restaurants list
//! tastemap categories
//! tastemap preview [--category X]... [--threshold T] [--output FILE]
//! tastemap apply --mappings FILE [--restaurant ID]
//! tastemap taxonomy
//! tastemap stats
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/tastemap/config.toml)
//! 3. Environment variables (TASTEMAP_*)
//! 4. CLI flags

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use tastemap_cli::{
    apply_mappings, handle_restaurants, init_logging, list_categories, load_settings,
    open_storage, preview_mappings, show_stats, show_taxonomy, Cli, Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Taxonomy = cli.command {
        show_taxonomy();
        return Ok(());
    }

    let settings = load_settings(
        cli.config.as_deref(),
        cli.log_level.as_deref(),
        cli.db_path.as_deref(),
    )?;
    init_logging(&settings)?;
    let storage = open_storage(&settings)?;

    match cli.command {
        Commands::Restaurants { command } => {
            handle_restaurants(&storage, command)?;
        }
        Commands::Categories => {
            list_categories(&storage)?;
        }
        Commands::Preview {
            categories,
            threshold,
            output,
        } => {
            preview_mappings(
                &settings,
                &storage,
                categories,
                threshold,
                output.as_deref().map(Path::new),
            )
            .await?;
        }
        Commands::Apply {
            mappings,
            restaurant,
        } => {
            apply_mappings(&storage, Path::new(&mappings), restaurant.as_deref()).await?;
        }
        Commands::Stats => {
            show_stats(&storage)?;
        }
        Commands::Taxonomy => show_taxonomy(),
    }

    Ok(())
}
