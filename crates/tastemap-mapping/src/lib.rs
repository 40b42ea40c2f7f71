//! # tastemap-mapping
//!
//! Maps free-text restaurant categories onto the fixed interest taxonomy
//! and reconciles the result into restaurant records.
//!
//! ## Pipeline
//! - [`CategoryMapper`] embeds the taxonomy and the categories through the
//!   shared [`EmbeddingProvider`](tastemap_embeddings::EmbeddingProvider)
//!   and ranks interests per category with [`rank_interests`]
//! - [`update_restaurant_interests`] / [`update_all_restaurants_interests`]
//!   union the mapped interests of each restaurant's categories and write
//!   them through a [`RestaurantStore`]
//! - [`write_mappings`] / [`read_mappings`] move mappings to and from JSON
//!   for offline review

pub mod error;
pub mod export;
pub mod matcher;
pub mod orchestrator;
pub mod reconcile;
pub mod store;

pub use error::MappingError;
pub use export::{read_mappings, validate_mappings, write_mappings};
pub use matcher::{find_matching_interests, rank_interests, InterestRanking, LabeledEmbedding};
pub use orchestrator::CategoryMapper;
pub use reconcile::{
    merge_interests, update_all_restaurants_interests, update_restaurant_interests,
    ReconcileOutcome, ReconcileSummary,
};
pub use store::RestaurantStore;
