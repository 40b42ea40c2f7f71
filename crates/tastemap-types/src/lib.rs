//! # tastemap-types
//!
//! Shared domain types for the tastemap category-reconciliation engine.
//!
//! This crate defines the data structures used throughout the system:
//! - Restaurants: raw free-text categories plus the reconciled interests
//! - Category mappings: one category matched onto the interest taxonomy
//! - Taxonomy: the closed interest vocabulary and embedding prompt templates
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use tastemap_types::{enhance_category, INTEREST_TAXONOMY};
//!
//! assert!(INTEREST_TAXONOMY.contains(&"Pizza"));
//! assert!(enhance_category("Pizza Corner").ends_with("Pizza Corner"));
//! ```

pub mod config;
pub mod error;
pub mod mapping;
pub mod restaurant;
pub mod taxonomy;

pub use config::{EmbeddingBackend, EmbeddingSettings, MappingSettings, Settings};
pub use error::TypesError;
pub use mapping::CategoryMapping;
pub use restaurant::Restaurant;
pub use taxonomy::{enhance_category, enhance_interest, taxonomy, INTEREST_TAXONOMY};
