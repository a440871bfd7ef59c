//! Embedding-based zero-shot scorer
//!
//! Each candidate label is turned into a hypothesis sentence, embedded with
//! the same sentence model as the document sample, and scored by cosine
//! similarity. A temperature softmax over the similarities yields a
//! probability distribution across the candidates.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ClassificationConfig;
use crate::error::{Error, Result};
use crate::retrieval::cosine_similarity;
use crate::types::LabelScore;

use super::embedding::EmbeddingProvider;
use super::inference::softmax;
use super::scorer::ZeroShotScorer;

pub struct EmbeddingZeroShotScorer {
    embedder: Arc<dyn EmbeddingProvider>,
    hypothesis_template: String,
    temperature: f32,
}

impl EmbeddingZeroShotScorer {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: &ClassificationConfig) -> Self {
        Self {
            embedder,
            hypothesis_template: config.hypothesis_template.clone(),
            temperature: config.softmax_temperature,
        }
    }

    fn hypothesis(&self, label: &str) -> String {
        self.hypothesis_template.replace("{label}", label)
    }
}

#[async_trait]
impl ZeroShotScorer for EmbeddingZeroShotScorer {
    async fn score(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>> {
        if labels.is_empty() {
            return Err(Error::classification("no candidate labels"));
        }

        let sample = self.embedder.embed(text).await?;
        let hypotheses: Vec<String> = labels.iter().map(|label| self.hypothesis(label)).collect();
        let label_vectors = self.embedder.embed_batch(&hypotheses).await?;

        if label_vectors.len() != labels.len() {
            return Err(Error::classification(format!(
                "expected {} hypothesis embeddings, got {}",
                labels.len(),
                label_vectors.len()
            )));
        }

        let similarities: Vec<f32> = label_vectors
            .iter()
            .map(|vector| {
                let sim = cosine_similarity(&sample, vector);
                if sim.is_nan() { 0.0 } else { sim }
            })
            .collect();

        let mut scores: Vec<LabelScore> = labels
            .iter()
            .zip(softmax(&similarities, self.temperature))
            .map(|(label, confidence)| LabelScore::new(*label, confidence))
            .collect();
        scores.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        Ok(scores)
    }

    fn name(&self) -> &str {
        "embedding-zero-shot"
    }
}
