//! Command implementations for tastemap.
//!
//! Handles:
//! - restaurants: add/list restaurant records
//! - categories: list distinct raw categories
//! - preview: generate mappings (stdout or JSON file)
//! - apply: reconcile a mappings file into restaurant interests
//! - taxonomy: print the interest vocabulary
//! - stats: restaurant store statistics

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use tastemap_embeddings::{
    CandleLoader, DisabledLoader, EmbeddingCache, EmbeddingProvider, ModelFiles, ProviderConfig,
    ResourceLoader,
};
use tastemap_mapping::{
    read_mappings, update_all_restaurants_interests, update_restaurant_interests,
    validate_mappings, write_mappings, CategoryMapper, ReconcileOutcome, RestaurantStore,
};
use tastemap_storage::{Storage, StorageStats};
use tastemap_types::{taxonomy, CategoryMapping, EmbeddingBackend, Restaurant, Settings};

use crate::cli::RestaurantCommands;

/// Load configuration and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
    db_path_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(db_path) = db_path_override {
        settings.db_path = db_path.to_string();
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    Ok(settings)
}

/// Initialize logging. `RUST_LOG` wins over the configured level.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Open the restaurant store, creating parent directories if needed.
pub fn open_storage(settings: &Settings) -> Result<Storage> {
    let db_path = settings.expanded_db_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    Storage::open(&db_path).context("Failed to open storage")
}

/// Build the embedding provider for the configured backend.
///
/// An unbounded cache is the process-wide one; a bounded cache is private
/// to this provider.
pub fn build_provider(settings: &Settings) -> Arc<EmbeddingProvider> {
    let loader: Arc<dyn ResourceLoader> = match settings.embeddings.backend {
        EmbeddingBackend::Candle => Arc::new(CandleLoader::new(ModelFiles::from_settings(
            &settings.embeddings,
        ))),
        EmbeddingBackend::Fallback => {
            info!("Embedding backend disabled, using deterministic fallback");
            Arc::new(DisabledLoader)
        }
    };

    let config = ProviderConfig::from_settings(&settings.embeddings);
    let provider = match settings.embeddings.cache_bound() {
        Some(bound) => {
            EmbeddingProvider::new(loader, Arc::new(EmbeddingCache::new(Some(bound))), config)
        }
        None => EmbeddingProvider::with_global_cache(loader, config),
    };
    Arc::new(provider)
}

fn parse_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Handle `restaurants` subcommands.
pub fn handle_restaurants(storage: &Storage, command: RestaurantCommands) -> Result<()> {
    match command {
        RestaurantCommands::Add {
            id,
            name,
            categories,
        } => {
            let mut restaurant = Restaurant::new(id, name, parse_categories(&categories));
            // keep reconciled interests when re-adding a known restaurant
            if let Some(existing) = storage.get_restaurant(&restaurant.id)? {
                restaurant.interests = existing.interests;
            }
            storage
                .put_restaurant(&restaurant)
                .context("Failed to store restaurant")?;
            println!("Stored restaurant {}", restaurant.id);
        }
        RestaurantCommands::List => {
            let restaurants = storage.list_restaurants()?;
            if restaurants.is_empty() {
                println!("No restaurants");
            }
            for r in restaurants {
                println!("{}  {}", r.id, r.name);
                println!("    categories: {}", r.categories.join(", "));
                println!("    interests:  {}", r.interests.join(", "));
            }
        }
    }
    Ok(())
}

/// Print distinct raw categories.
pub fn list_categories(storage: &Storage) -> Result<()> {
    for category in storage.distinct_categories()? {
        println!("{}", category);
    }
    Ok(())
}

/// Generate mappings for the given categories, or every stored category.
///
/// Returns the mappings after printing or exporting them.
pub async fn preview_mappings(
    settings: &Settings,
    storage: &Storage,
    categories: Vec<String>,
    threshold: Option<f32>,
    output: Option<&Path>,
) -> Result<Vec<CategoryMapping>> {
    let threshold = threshold.unwrap_or(settings.mapping.threshold);
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("threshold must be 0.0-1.0, got {}", threshold);
    }

    let categories = if categories.is_empty() {
        RestaurantStore::distinct_categories(storage).await?
    } else {
        categories
    };
    if categories.is_empty() {
        warn!("No categories to map");
    }

    let mapper = CategoryMapper::new(build_provider(settings))
        .with_max_matches(settings.mapping.max_matches);
    let mappings = mapper.generate_category_mappings(&categories, threshold).await;

    match output {
        Some(path) => {
            write_mappings(path, &mappings).context("Failed to write mappings")?;
            println!("Wrote {} mappings to {}", mappings.len(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&mappings)?),
    }

    if let Some(failure) = mapper.provider().last_failure() {
        warn!(error = %failure, "Embedding model unavailable, scores are not semantic");
    }

    Ok(mappings)
}

/// Apply a mappings file to one restaurant or all of them.
pub async fn apply_mappings(
    storage: &Storage,
    mappings_path: &Path,
    restaurant: Option<&str>,
) -> Result<()> {
    let mappings = read_mappings(mappings_path).context("Failed to read mappings")?;
    validate_mappings(&mappings, &taxonomy()).context("Invalid mappings file")?;

    match restaurant {
        Some(id) => match update_restaurant_interests(storage, id, &mappings).await? {
            ReconcileOutcome::Updated { interests } => {
                println!("{}: {}", id, interests.join(", "));
            }
            ReconcileOutcome::NoCategories => {
                println!("{}: no categories, nothing to update", id);
            }
        },
        None => {
            let summary = update_all_restaurants_interests(storage, &mappings).await?;
            println!(
                "Updated {} restaurants ({} without categories)",
                summary.updated, summary.skipped
            );
        }
    }
    Ok(())
}

/// Print store statistics.
pub fn show_stats(storage: &Storage) -> Result<StorageStats> {
    let stats = storage.get_stats().context("Failed to read storage stats")?;
    println!("Restaurants:       {}", stats.restaurant_count);
    println!("  with interests:  {}", stats.with_interests_count);
    println!("  without:         {}", stats.restaurant_count - stats.with_interests_count);
    println!("Disk usage:        {} bytes", stats.disk_usage_bytes);
    Ok(stats)
}

/// Print the interest taxonomy.
pub fn show_taxonomy() {
    for interest in taxonomy() {
        println!("{}", interest);
    }
}
