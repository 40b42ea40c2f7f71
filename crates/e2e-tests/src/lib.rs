//! End-to-end test infrastructure for tastemap.
//!
//! Provides a shared TestHarness and helpers for scenarios that run
//! categories through the provider, the mapper and the restaurant store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tastemap_embeddings::{EmbeddingCache, EmbeddingProvider, ProviderConfig, ResourceLoader};
use tastemap_mapping::{MappingError, RestaurantStore};
use tastemap_storage::{Storage, StorageError};
use tastemap_types::Restaurant;

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Shared storage instance
    pub storage: Arc<Storage>,
}

impl TestHarness {
    /// Create a new test harness with temp directory and storage.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let storage =
            Arc::new(Storage::open(temp_dir.path()).expect("Failed to open test storage"));

        Self {
            _temp_dir: temp_dir,
            storage,
        }
    }

    /// Store a restaurant with the given raw categories.
    pub fn seed_restaurant(&self, id: &str, categories: &[&str]) {
        let restaurant = Restaurant::new(
            id,
            format!("Restaurant {id}"),
            categories.iter().map(|c| c.to_string()).collect(),
        );
        self.storage
            .put_restaurant(&restaurant)
            .expect("Failed to put restaurant");
    }

    pub fn interests_of(&self, id: &str) -> Vec<String> {
        self.storage
            .get_restaurant(id)
            .expect("Failed to get restaurant")
            .expect("Restaurant missing")
            .interests
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider over `loader` with a private cache.
pub fn provider_with(loader: Arc<dyn ResourceLoader>, dimension: usize) -> Arc<EmbeddingProvider> {
    let config = ProviderConfig {
        dimension,
        ..ProviderConfig::default()
    };
    Arc::new(EmbeddingProvider::new(
        loader,
        Arc::new(EmbeddingCache::unbounded()),
        config,
    ))
}

/// Store that fails the n-th `set_interests` call (1-based) and records
/// every write it attempted.
pub struct FlakyStore {
    inner: Arc<Storage>,
    fail_on: usize,
    writes: AtomicUsize,
    attempted: Mutex<Vec<String>>,
}

impl FlakyStore {
    pub fn new(inner: Arc<Storage>, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            writes: AtomicUsize::new(0),
            attempted: Mutex::new(Vec::new()),
        }
    }

    /// Ids passed to `set_interests`, in call order.
    pub fn attempted(&self) -> Vec<String> {
        self.attempted.lock().expect("attempted lock").clone()
    }
}

#[async_trait]
impl RestaurantStore for FlakyStore {
    async fn distinct_categories(&self) -> Result<Vec<String>, MappingError> {
        Ok(self.inner.distinct_categories()?)
    }

    async fn get_restaurant(&self, id: &str) -> Result<Option<Restaurant>, MappingError> {
        Ok(self.inner.get_restaurant(id)?)
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, MappingError> {
        Ok(self.inner.list_restaurants()?)
    }

    async fn set_interests(&self, id: &str, interests: Vec<String>) -> Result<(), MappingError> {
        self.attempted
            .lock()
            .expect("attempted lock")
            .push(id.to_string());
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_on {
            return Err(MappingError::Persistence(StorageError::Serialization(
                format!("simulated write failure for {id}"),
            )));
        }
        self.inner.set_interests(id, interests)?;
        Ok(())
    }
}
