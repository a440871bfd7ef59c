//! Ranks document chunks against a question by cosine similarity

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::RetrievedChunk;

use super::chunker::SentenceChunker;

/// Cosine similarity; NaN when either vector has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm_a * norm_b)
}

/// Per-question retriever; chunks and embeddings are computed fresh on every call
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: SentenceChunker,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: &RetrievalConfig) -> Self {
        Self {
            embedder,
            chunker: SentenceChunker::from_config(config),
            top_k: config.top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Top `k` chunks for `question`, most similar first
    pub async fn retrieve(
        &self,
        question: &str,
        text: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        if text.is_empty() {
            return Err(Error::EmptyContent);
        }

        let chunks = self.chunker.chunk(text);
        let chunk_vectors = self.embedder.embed_batch(&chunks).await?;
        if chunk_vectors.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "expected {} chunk embeddings, got {}",
                chunks.len(),
                chunk_vectors.len()
            )));
        }
        let question_vector = self.embedder.embed(question).await?;

        let mut ranked: Vec<RetrievedChunk> = chunks
            .into_iter()
            .zip(chunk_vectors.iter())
            .enumerate()
            .map(|(index, (content, vector))| {
                let similarity = cosine_similarity(vector, &question_vector);
                RetrievedChunk {
                    index,
                    content,
                    similarity: if similarity.is_nan() { 0.0 } else { similarity },
                }
            })
            .collect();

        // Stable: equal similarities keep document order
        ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        ranked.truncate(k);

        tracing::debug!(
            "Retrieved {} chunks (best similarity {:.3})",
            ranked.len(),
            ranked.first().map(|c| c.similarity).unwrap_or(0.0)
        );

        Ok(ranked)
    }

    /// Retrieve and join the chunk texts with single spaces
    pub async fn context(&self, question: &str, text: &str) -> Result<String> {
        let chunks = self.retrieve(question, text, self.top_k).await?;
        Ok(chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }
}
