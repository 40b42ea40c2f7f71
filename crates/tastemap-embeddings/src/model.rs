//! Embedding types and the embedding-resource boundary.
//!
//! An embedding resource is anything that turns text into a numeric
//! vector, asynchronously and fallibly. Resources hand back a
//! [`ResourceOutput`], which is adapted into a plain vector in exactly one
//! place ([`ResourceOutput::into_vector`]).

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::EmbeddingError;
use crate::similarity;

/// Vector embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create a new embedding from a vector.
    /// Normalizes the vector to unit length (zero vectors stay zero).
    pub fn new(values: Vec<f32>) -> Self {
        let mut values = values;
        similarity::normalize(&mut values);
        Self { values }
    }

    /// Create embedding without normalization (for pre-normalized vectors)
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cosine similarity with another embedding.
    pub fn cosine_similarity(&self, other: &Embedding) -> Result<f32, EmbeddingError> {
        similarity::cosine_similarity(&self.values, &other.values)
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name (e.g., "all-MiniLM-L6-v2")
    pub name: String,
    /// Embedding dimension
    pub dimension: usize,
    /// Maximum sequence length in tokens
    pub max_sequence_length: usize,
}

/// Raw output of an embedding resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOutput {
    /// A single vector
    Vector(Vec<f32>),
    /// A batch of vectors (e.g. a `[1, dim]` tensor); the first row is used
    Rows(Vec<Vec<f32>>),
}

impl ResourceOutput {
    /// Adapt the resource's output into one vector of `dimension` values.
    ///
    /// Returns `None` when the output is empty or has the wrong length;
    /// the caller substitutes a fallback embedding in that case.
    pub fn into_vector(self, dimension: usize) -> Option<Vec<f32>> {
        let values = match self {
            ResourceOutput::Vector(values) => values,
            ResourceOutput::Rows(rows) => rows.into_iter().next()?,
        };
        (!values.is_empty() && values.len() == dimension).then_some(values)
    }
}

/// An expensive embedding resource, acquired once and shared.
///
/// Implementations must be thread-safe (Send + Sync) for concurrent use.
#[async_trait]
pub trait EmbeddingResource: Send + Sync {
    /// Get model information
    fn info(&self) -> &ModelInfo;

    /// Produce the raw embedding output for a single text.
    async fn embed(&self, text: &str) -> Result<ResourceOutput, EmbeddingError>;
}

/// Acquires an [`EmbeddingResource`]. Acquisition may be slow (model
/// download, weight loading) and may fail.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn EmbeddingResource>, EmbeddingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_normalization() {
        let emb = Embedding::new(vec![3.0, 4.0]);
        // 3-4-5 triangle: normalized should be [0.6, 0.8]
        assert!((emb.values[0] - 0.6).abs() < 0.001);
        assert!((emb.values[1] - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_zero_embedding_stays_zero() {
        let emb = Embedding::new(vec![0.0, 0.0, 0.0]);
        assert!(emb.values.iter().all(|v| *v == 0.0));
        assert_eq!(emb.dimension(), 3);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let emb1 = Embedding::new(vec![1.0, 0.0, 0.0]);
        let emb2 = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert!((emb1.cosine_similarity(&emb2).unwrap() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        let emb1 = Embedding::new(vec![1.0, 0.0]);
        let emb2 = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert!(matches!(
            emb1.cosine_similarity(&emb2),
            Err(EmbeddingError::ShapeMismatch { left: 2, right: 3 })
        ));
    }

    #[test]
    fn test_output_vector() {
        let out = ResourceOutput::Vector(vec![0.1, 0.2, 0.3]);
        assert_eq!(out.into_vector(3), Some(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn test_output_rows_uses_first_row() {
        let out = ResourceOutput::Rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(out.into_vector(2), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn test_output_empty_or_wrong_length_rejected() {
        assert_eq!(ResourceOutput::Vector(vec![]).into_vector(3), None);
        assert_eq!(ResourceOutput::Rows(vec![]).into_vector(3), None);
        assert_eq!(ResourceOutput::Vector(vec![1.0, 2.0]).into_vector(3), None);
    }
}
