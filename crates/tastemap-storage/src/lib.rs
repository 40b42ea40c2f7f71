//! Storage layer for tastemap.
//!
//! Provides RocksDB-backed storage with:
//! - A dedicated column family for restaurant records
//! - Prefixed string keys (`rst:{id}`) for prefix scans
//! - JSON-encoded values shared with the rest of the workspace

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;

pub use db::{Storage, StorageStats};
pub use error::StorageError;
pub use keys::RestaurantKey;
