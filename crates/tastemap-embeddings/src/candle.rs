//! Candle-based embedding resource.
//!
//! Uses all-MiniLM-L6-v2 for 384-dimensional embeddings. Loading reads
//! (and on first run downloads) the model files, so the loader moves it
//! onto a blocking thread.

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::error::EmbeddingError;
use crate::model::{EmbeddingResource, ModelInfo, ResourceLoader, ResourceOutput};
use crate::model_files::ModelFiles;

/// Embedding dimension for all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// Maximum sequence length
pub const MAX_SEQ_LENGTH: usize = 256;

/// Output width read from the model's config.json.
#[derive(Deserialize)]
struct ModelDims {
    hidden_size: usize,
}

/// Candle-based embedder using a BERT sentence-embedding model.
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl CandleEmbedder {
    /// Load the embedding model (downloading if needed).
    pub fn load(files: &ModelFiles) -> Result<Self, EmbeddingError> {
        let paths = files.resolve()?;
        Self::load_from_paths(
            files.model_name(),
            &paths.config,
            &paths.tokenizer,
            &paths.weights,
        )
    }

    /// Load from explicit file paths
    pub fn load_from_paths(
        name: &str,
        config_path: &std::path::Path,
        tokenizer_path: &std::path::Path,
        weights_path: &std::path::Path,
    ) -> Result<Self, EmbeddingError> {
        info!(model = name, "Loading embedding model...");

        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(config_path)?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;
        let ModelDims { hidden_size } = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        // SAFETY: the weights file is not modified while mapped
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };

        let model = BertModel::load(vb, &config)?;

        info!(
            dim = hidden_size,
            max_seq = MAX_SEQ_LENGTH,
            "Model loaded successfully"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            info: ModelInfo {
                name: name.to_string(),
                dimension: hidden_size,
                max_sequence_length: MAX_SEQ_LENGTH,
            },
        })
    }

    /// Mean pooling over token embeddings (excluding padding)
    fn mean_pooling(
        &self,
        embeddings: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor, EmbeddingError> {
        let mask = attention_mask
            .unsqueeze(2)?
            .broadcast_as(embeddings.shape())?;
        let mask_f32 = mask.to_dtype(DType::F32)?;

        let masked = embeddings.broadcast_mul(&mask_f32)?;
        let sum = masked.sum(1)?;

        let mask_sum = mask_f32.sum(1)?;
        let mask_sum = mask_sum.clamp(1e-9, f64::MAX)?;

        Ok(sum.broadcast_div(&mask_sum)?)
    }

    /// Run one text through the model, returning the pooled `[1, dim]` rows.
    fn forward(&self, text: &str) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let len = encoding.get_ids().len().min(MAX_SEQ_LENGTH);
        if len == 0 {
            return Ok(Vec::new());
        }
        let ids = encoding.get_ids()[..len].to_vec();
        let mask = encoding.get_attention_mask()[..len].to_vec();

        let input_ids = Tensor::from_vec(ids, (1, len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (1, len), &self.device)?;
        let token_type_ids = Tensor::zeros_like(&input_ids)?;

        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = self.mean_pooling(&output, &attention_mask)?;
        Ok(pooled.to_vec2()?)
    }
}

#[async_trait]
impl EmbeddingResource for CandleEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    async fn embed(&self, text: &str) -> Result<ResourceOutput, EmbeddingError> {
        debug!(len = text.len(), "Embedding text");
        self.forward(text)
            .map(ResourceOutput::Rows)
            .map_err(|e| EmbeddingError::EmbeddingComputationFailed(e.to_string()))
    }
}

/// Acquires a [`CandleEmbedder`] on a blocking thread.
#[derive(Debug, Clone)]
pub struct CandleLoader {
    files: ModelFiles,
}

impl CandleLoader {
    pub fn new(files: ModelFiles) -> Self {
        Self { files }
    }
}

#[async_trait]
impl ResourceLoader for CandleLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingResource>, EmbeddingError> {
        let files = self.files.clone();
        let embedder = tokio::task::spawn_blocking(move || CandleEmbedder::load(&files))
            .await
            .map_err(|e| EmbeddingError::ResourceAcquisitionFailed(e.to_string()))??;
        let resource: Arc<dyn EmbeddingResource> = Arc::new(embedder);
        Ok(resource)
    }
}
