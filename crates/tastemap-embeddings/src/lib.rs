//! # tastemap-embeddings
//!
//! Embedding generation for the tastemap category-reconciliation engine.
//!
//! ## Features
//! - Lazily acquired, process-shared embedding resource (local Candle
//!   all-MiniLM-L6-v2, 384 dimensions)
//! - Memoization of every computed embedding, keyed by exact text
//! - Deterministic fallback embeddings whenever the resource cannot be
//!   acquired or fails for a single text
//! - Cosine similarity and normalization helpers
//!
//! The provider never returns fewer vectors than it was given texts, and
//! every vector has the configured dimension, even on fallback.

pub mod cache;
pub mod candle;
pub mod error;
pub mod fallback;
pub mod mock;
pub mod model;
pub mod model_files;
pub mod provider;
pub mod similarity;

pub use crate::candle::{CandleEmbedder, CandleLoader};
pub use cache::{CachedEmbedding, EmbeddingCache, EmbeddingOrigin};
pub use error::EmbeddingError;
pub use fallback::fallback_embedding;
pub use model::{Embedding, EmbeddingResource, ModelInfo, ResourceLoader, ResourceOutput};
pub use model_files::{ModelFiles, ModelPaths};
pub use provider::{
    DisabledLoader, EmbeddingProvider, ProvidedEmbedding, ProviderConfig, ProviderStatus,
};
pub use similarity::{cosine_similarity, l2_norm, normalize};
