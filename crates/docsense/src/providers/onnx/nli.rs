//! NLI cross-encoder zero-shot scorer
//!
//! Each candidate label becomes a hypothesis sentence that is paired with the
//! document sample and run through an MNLI model. The entailment logits are
//! compared across hypotheses, which gives a single-label distribution over
//! the candidates.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

use crate::config::ClassificationConfig;
use crate::error::{Error, Result};
use crate::providers::inference::{entailment_distribution, entailment_index};
use crate::providers::scorer::ZeroShotScorer;
use crate::types::LabelScore;

use super::LocalModel;

pub struct OnnxNliScorer {
    model: Arc<Mutex<LocalModel>>,
    entailment: usize,
    hypothesis_template: String,
}

impl OnnxNliScorer {
    /// Load the NLI model; `cache_root` is shared with the other local models
    pub async fn new(config: &ClassificationConfig, cache_root: &Path) -> Result<Self> {
        tracing::info!("Initializing NLI scorer with model: {}", config.nli_model);

        let model = LocalModel::load(
            &config.nli_model,
            cache_root,
            config.nli_max_length,
            &["config.json"],
        )
        .await
        .map_err(|e| Error::classification(e.to_string()))?;

        let labels = model.id2label()?;
        let entailment = entailment_index(&labels).ok_or_else(|| {
            Error::Config(format!(
                "{} has no entailment class in {:?}",
                config.nli_model, labels
            ))
        })?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            entailment,
            hypothesis_template: config.hypothesis_template.clone(),
        })
    }
}

impl LocalModel {
    /// Class logits for each (premise, hypothesis) pair
    fn pair_logits(&mut self, premise: &str, hypotheses: &[String]) -> Result<Vec<Vec<f32>>> {
        let pairs: Vec<(&str, &str)> = hypotheses.iter().map(|h| (premise, h.as_str())).collect();
        let encodings = self
            .tokenizer
            .encode_batch(pairs, true)
            .map_err(|e| Error::classification(format!("Tokenization failed: {}", e)))?;

        let batch = self.batch(&encodings)?;
        let (dims, data) = self
            .run(batch, "logits")
            .map_err(|e| Error::classification(e.to_string()))?;

        let classes = dims.last().copied().unwrap_or(0);
        if classes == 0 || data.len() != hypotheses.len() * classes {
            return Err(Error::classification(format!(
                "Unexpected logits shape {:?}",
                dims
            )));
        }
        Ok(data.chunks(classes).map(<[f32]>::to_vec).collect())
    }
}

#[async_trait]
impl ZeroShotScorer for OnnxNliScorer {
    async fn score(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>> {
        if labels.is_empty() {
            return Err(Error::classification("no candidate labels"));
        }

        let premise = text.to_string();
        let hypotheses: Vec<String> = labels
            .iter()
            .map(|label| self.hypothesis_template.replace("{label}", label))
            .collect();
        let model = Arc::clone(&self.model);

        let logits = tokio::task::spawn_blocking(move || {
            model.lock().pair_logits(&premise, &hypotheses)
        })
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;

        let mut scores: Vec<LabelScore> = labels
            .iter()
            .zip(entailment_distribution(&logits, self.entailment))
            .map(|(label, confidence)| LabelScore::new(*label, confidence))
            .collect();
        scores.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        Ok(scores)
    }

    fn name(&self) -> &str {
        "nli-zero-shot"
    }
}
