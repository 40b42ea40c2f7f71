//! tastemap admin CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (restaurants, preview, apply, ...)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, RestaurantCommands};
pub use commands::{
    apply_mappings, build_provider, handle_restaurants, init_logging, list_categories,
    load_settings, open_storage, preview_mappings, show_stats, show_taxonomy,
};
