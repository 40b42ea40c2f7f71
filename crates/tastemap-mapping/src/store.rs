//! Persistence seam used by reconciliation.

use async_trait::async_trait;

use tastemap_storage::{Storage, StorageError};
use tastemap_types::Restaurant;

use crate::error::MappingError;

/// The two string-array fields reconciliation reads and writes.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    /// Distinct raw category labels across all restaurants.
    async fn distinct_categories(&self) -> Result<Vec<String>, MappingError>;

    async fn get_restaurant(&self, id: &str) -> Result<Option<Restaurant>, MappingError>;

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, MappingError>;

    /// Overwrite a restaurant's interests.
    async fn set_interests(&self, id: &str, interests: Vec<String>) -> Result<(), MappingError>;
}

#[async_trait]
impl RestaurantStore for Storage {
    async fn distinct_categories(&self) -> Result<Vec<String>, MappingError> {
        Ok(Storage::distinct_categories(self)?)
    }

    async fn get_restaurant(&self, id: &str) -> Result<Option<Restaurant>, MappingError> {
        Ok(Storage::get_restaurant(self, id)?)
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, MappingError> {
        Ok(Storage::list_restaurants(self)?)
    }

    async fn set_interests(&self, id: &str, interests: Vec<String>) -> Result<(), MappingError> {
        match Storage::set_interests(self, id, interests) {
            Ok(_) => Ok(()),
            Err(StorageError::NotFound(id)) => Err(MappingError::RestaurantNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}
