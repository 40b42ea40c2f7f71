//! Mapping error types.

use thiserror::Error;

/// Errors that can occur while mapping or reconciling.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Persistence collaborator failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] tastemap_storage::StorageError),

    /// Embedding math failed
    #[error("Embedding error: {0}")]
    Embedding(#[from] tastemap_embeddings::EmbeddingError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Restaurant not found
    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
