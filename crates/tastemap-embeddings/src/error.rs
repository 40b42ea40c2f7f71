//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Vectors of different lengths were compared
    #[error("Shape mismatch: {left} vs {right} dimensions")]
    ShapeMismatch { left: usize, right: usize },

    /// A caller waited on another caller's acquisition and gave up
    #[error("Timed out after {waited_ms}ms waiting for the embedding resource")]
    InitializationTimeout { waited_ms: u64 },

    /// The embedding resource could not be acquired
    #[error("Embedding resource unavailable: {0}")]
    ResourceAcquisitionFailed(String),

    /// The resource failed for one text
    #[error("Embedding computation failed: {0}")]
    EmbeddingComputationFailed(String),

    /// Candle model error
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    /// Tokenizer error
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Model file not found
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
