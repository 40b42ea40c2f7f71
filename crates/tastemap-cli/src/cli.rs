//! CLI argument parsing for tastemap.
//!
//! CLI flags override all other config sources.

use clap::{Parser, Subcommand};

/// tastemap
///
/// Maps free-text restaurant categories onto a fixed interest taxonomy.
#[derive(Parser, Debug)]
#[command(name = "tastemap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/tastemap/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage restaurant records
    Restaurants {
        #[command(subcommand)]
        command: RestaurantCommands,
    },

    /// List distinct raw categories across restaurants
    Categories,

    /// Generate category → interest mappings without writing anything
    Preview {
        /// Category to map (repeatable; default: every stored category)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Minimum similarity for a match (default from config)
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Write mappings to this JSON file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Apply a mappings file to restaurant interests
    Apply {
        /// JSON file produced by `preview --output`
        #[arg(short, long)]
        mappings: String,

        /// Only update this restaurant (default: all)
        #[arg(short, long)]
        restaurant: Option<String>,
    },

    /// Print the interest taxonomy
    Taxonomy,

    /// Show restaurant store statistics
    Stats,
}

/// Restaurant subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum RestaurantCommands {
    /// Add or replace a restaurant
    Add {
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        /// Comma-separated raw categories
        #[arg(long, default_value = "")]
        categories: String,
    },

    /// List all restaurants
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_restaurants_add() {
        let cli = Cli::parse_from([
            "tastemap",
            "restaurants",
            "add",
            "--id",
            "r1",
            "--name",
            "Luigi's",
            "--categories",
            "Pizza Corner,Dessert Bar",
        ]);
        match cli.command {
            Commands::Restaurants {
                command: RestaurantCommands::Add { id, categories, .. },
            } => {
                assert_eq!(id, "r1");
                assert_eq!(categories, "Pizza Corner,Dessert Bar");
            }
            _ => panic!("Expected Restaurants Add command"),
        }
    }

    #[test]
    fn test_cli_preview_repeated_categories() {
        let cli = Cli::parse_from([
            "tastemap",
            "preview",
            "--category",
            "Sushi Bar",
            "--category",
            "Taqueria",
            "-t",
            "0.7",
        ]);
        match cli.command {
            Commands::Preview {
                categories,
                threshold,
                output,
            } => {
                assert_eq!(categories, vec!["Sushi Bar", "Taqueria"]);
                assert_eq!(threshold, Some(0.7));
                assert!(output.is_none());
            }
            _ => panic!("Expected Preview command"),
        }
    }

    #[test]
    fn test_cli_apply() {
        let cli = Cli::parse_from(["tastemap", "apply", "--mappings", "m.json", "-r", "r1"]);
        match cli.command {
            Commands::Apply {
                mappings,
                restaurant,
            } => {
                assert_eq!(mappings, "m.json");
                assert_eq!(restaurant, Some("r1".to_string()));
            }
            _ => panic!("Expected Apply command"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "tastemap",
            "categories",
            "--db-path",
            "/tmp/db",
            "--log-level",
            "debug",
        ]);
        assert!(matches!(cli.command, Commands::Categories));
        assert_eq!(cli.db_path, Some("/tmp/db".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_stats() {
        let cli = Cli::parse_from(["tastemap", "stats", "--db-path", "/tmp/db"]);
        assert!(matches!(cli.command, Commands::Stats));
        assert_eq!(cli.db_path, Some("/tmp/db".to_string()));
    }

    #[test]
    fn test_cli_taxonomy() {
        let cli = Cli::parse_from(["tastemap", "taxonomy"]);
        assert!(matches!(cli.command, Commands::Taxonomy));
    }
}
