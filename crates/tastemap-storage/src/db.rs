//! RocksDB wrapper for tastemap storage.
//!
//! Provides:
//! - Database open with column family setup
//! - Restaurant put/get and prefix scans
//! - In-place interest updates
//! - Basic statistics

use rocksdb::{ColumnFamily, Direction, IteratorMode, Options, DB};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

use crate::column_families::{build_cf_descriptors, CF_RESTAURANTS};
use crate::error::StorageError;
use crate::keys::RestaurantKey;
use tastemap_types::Restaurant;

/// Main storage interface for tastemap
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_background_jobs(2);

        let cf_descriptors = build_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    fn restaurants_cf(&self) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(CF_RESTAURANTS)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_RESTAURANTS.to_string()))
    }

    /// Insert or replace a restaurant record
    pub fn put_restaurant(&self, restaurant: &Restaurant) -> Result<(), StorageError> {
        let cf = self.restaurants_cf()?;
        let key = RestaurantKey::new(&restaurant.id)?;
        self.db.put_cf(cf, key.to_bytes(), restaurant.to_bytes()?)?;
        debug!(id = %restaurant.id, "Stored restaurant");
        Ok(())
    }

    /// Get a restaurant by id
    pub fn get_restaurant(&self, id: &str) -> Result<Option<Restaurant>, StorageError> {
        let cf = self.restaurants_cf()?;
        let key = RestaurantKey::new(id)?;
        match self.db.get_cf(cf, key.to_bytes())? {
            Some(bytes) => Ok(Some(Restaurant::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All restaurants, ordered by id
    pub fn list_restaurants(&self) -> Result<Vec<Restaurant>, StorageError> {
        let cf = self.restaurants_cf()?;
        let prefix = RestaurantKey::prefix();

        let mut results = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));

        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push(Restaurant::from_bytes(&value)?);
        }

        Ok(results)
    }

    /// Distinct category labels across all restaurants, sorted.
    ///
    /// Labels are compared exactly; no case folding or trimming.
    pub fn distinct_categories(&self) -> Result<Vec<String>, StorageError> {
        let mut categories = BTreeSet::new();
        for restaurant in self.list_restaurants()? {
            categories.extend(restaurant.categories);
        }
        Ok(categories.into_iter().collect())
    }

    /// Replace a restaurant's interests, leaving every other field alone.
    ///
    /// Returns the updated record.
    pub fn set_interests(
        &self,
        id: &str,
        interests: Vec<String>,
    ) -> Result<Restaurant, StorageError> {
        let mut restaurant = self
            .get_restaurant(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        restaurant.interests = interests;
        self.put_restaurant(&restaurant)?;
        debug!(id, count = restaurant.interests.len(), "Updated interests");

        Ok(restaurant)
    }

    /// Get storage statistics
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        let mut stats = StorageStats::default();

        for restaurant in self.list_restaurants()? {
            stats.restaurant_count += 1;
            if !restaurant.interests.is_empty() {
                stats.with_interests_count += 1;
            }
        }
        stats.disk_usage_bytes = self.get_disk_usage();

        Ok(stats)
    }

    fn get_disk_usage(&self) -> u64 {
        let mut total_size = 0u64;

        if let Ok(entries) = std::fs::read_dir(self.db.path()) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    total_size += metadata.len();
                }
            }
        }

        total_size
    }
}

/// Statistics about the storage.
#[derive(Debug, Default)]
pub struct StorageStats {
    /// Number of restaurants stored
    pub restaurant_count: u64,
    /// Restaurants with a non-empty interest list
    pub with_interests_count: u64,
    /// Total disk usage in bytes
    pub disk_usage_bytes: u64,
}
