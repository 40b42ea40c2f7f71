//! Key encoding and decoding for storage layer.
//!
//! Key format: `rst:{id}`. The id is stored verbatim, so iterating the
//! `rst:` prefix yields restaurants in lexicographic id order.

use crate::error::StorageError;

/// Prefix shared by every restaurant key
pub const RESTAURANT_PREFIX: &str = "rst:";

/// Key for restaurant storage
/// Format: rst:{id}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantKey {
    pub id: String,
}

impl RestaurantKey {
    /// Create a key for the given restaurant id.
    ///
    /// Ids must be non-empty.
    pub fn new(id: &str) -> Result<Self, StorageError> {
        if id.is_empty() {
            return Err(StorageError::Key("Restaurant id must not be empty".to_string()));
        }
        Ok(Self { id: id.to_string() })
    }

    /// Encode key to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}{}", RESTAURANT_PREFIX, self.id).into_bytes()
    }

    /// Decode key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;
        let id = s
            .strip_prefix(RESTAURANT_PREFIX)
            .ok_or_else(|| StorageError::Key(format!("Invalid restaurant key format: {}", s)))?;
        Self::new(id)
    }

    /// Prefix for scanning all restaurant keys
    pub fn prefix() -> &'static [u8] {
        RESTAURANT_PREFIX.as_bytes()
    }
}
