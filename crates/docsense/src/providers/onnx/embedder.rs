//! ONNX-based sentence embeddings
//!
//! Runs all-MiniLM-L6-v2 in-process for 384-dimensional embeddings, with mean
//! pooling over the attention mask and L2 normalisation.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::inference::{l2_normalize, mean_pool};

use super::LocalModel;

/// ONNX Runtime embedder; the session is shared behind a mutex
pub struct OnnxEmbedder {
    model: Arc<Mutex<LocalModel>>,
    dimensions: usize,
    batch_size: usize,
}

impl OnnxEmbedder {
    /// Load the model, downloading it into the cache directory on first use
    pub async fn new(config: &EmbeddingConfig) -> Result<Self> {
        tracing::info!("Initializing ONNX embedder with model: {}", config.model);

        let model = LocalModel::load(&config.model, &config.cache_dir, config.max_length, &[])
            .await
            .map_err(|e| Error::embedding(e.to_string()))?;

        tracing::info!("ONNX embedder initialized successfully");

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        })
    }

    async fn run_blocking(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let batch_size = self.batch_size;
        let dimensions = self.dimensions;

        tokio::task::spawn_blocking(move || {
            let mut model = model.lock();
            let mut all_embeddings = Vec::with_capacity(texts.len());
            for batch in texts.chunks(batch_size) {
                all_embeddings.extend(model.embed_batch(batch, dimensions)?);
            }
            Ok(all_embeddings)
        })
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }
}

impl LocalModel {
    fn embed_batch(&mut self, texts: &[String], dimensions: usize) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.iter().map(String::as_str).collect::<Vec<_>>(), true)
            .map_err(|e| Error::embedding(format!("Tokenization failed: {}", e)))?;

        let batch = self.batch(&encodings)?;
        let (batch_size, seq_len) = (batch.batch_size, batch.seq_len);
        let attention_mask = batch.attention_mask.clone();

        let (dims, hidden) = self
            .run(batch, "last_hidden_state")
            .map_err(|e| Error::embedding(e.to_string()))?;
        let hidden_size = dims.get(2).copied().unwrap_or(dimensions);
        let row = seq_len * hidden_size;

        if hidden.len() < batch_size * row {
            return Err(Error::embedding(format!(
                "Unexpected hidden state shape {:?}",
                dims
            )));
        }

        Ok((0..batch_size)
            .map(|i| {
                let tokens = &hidden[i * row..(i + 1) * row];
                let mask = &attention_mask[i * seq_len..(i + 1) * seq_len];
                let mut embedding = mean_pool(tokens, mask, hidden_size);
                l2_normalize(&mut embedding);
                embedding
            })
            .collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OnnxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.run_blocking(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("Empty embedding result"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.run_blocking(texts.to_vec()).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "onnx"
    }
}
