//! BERT token-classification NER
//!
//! The document is recognized in line-aligned segments. Each token takes the
//! highest-scoring BIO tag and tagged tokens are merged back into surface
//! spans using the tokenizer's byte offsets.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

use crate::config::NerConfig;
use crate::error::{Error, Result};
use crate::providers::inference::{argmax, decode_bio_spans, text_segments};
use crate::providers::ner::{NerProvider, NerSpan};

use super::LocalModel;

pub struct OnnxNer {
    model: Arc<Mutex<LocalModel>>,
    id2label: Arc<Vec<String>>,
    segment_chars: usize,
}

impl OnnxNer {
    /// Load the token-classification model into the shared cache root
    pub async fn new(config: &NerConfig, cache_root: &Path) -> Result<Self> {
        tracing::info!("Initializing ONNX NER with model: {}", config.model);

        let files = ["config.json"];
        let model = LocalModel::load(&config.model, cache_root, config.max_length, &files)
            .await
            .map_err(|e| Error::ner(e.to_string()))?;
        let id2label = model.id2label()?;

        tracing::debug!("NER tag set: {:?}", id2label);

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            id2label: Arc::new(id2label),
            segment_chars: config.segment_chars.max(1),
        })
    }
}

impl LocalModel {
    fn tag_segment(&mut self, segment: &str, id2label: &[String]) -> Result<Vec<NerSpan>> {
        let encoding = self
            .tokenizer
            .encode(segment, true)
            .map_err(|e| Error::ner(format!("Tokenization failed: {}", e)))?;
        let offsets: Vec<(usize, usize)> = encoding.get_offsets().to_vec();

        let batch = self.batch(std::slice::from_ref(&encoding))?;
        let seq_len = batch.seq_len;
        let (dims, logits) = self
            .run(batch, "logits")
            .map_err(|e| Error::ner(e.to_string()))?;

        let classes = dims.last().copied().unwrap_or(0);
        if classes == 0 || logits.len() != seq_len * classes {
            return Err(Error::ner(format!("Unexpected logits shape {:?}", dims)));
        }

        let tokens: Vec<(usize, usize, &str)> = logits
            .chunks(classes)
            .zip(&offsets)
            .map(|(row, &(start, end))| {
                let tag = id2label.get(argmax(row)).map(String::as_str).unwrap_or("O");
                (start, end, tag)
            })
            .collect();

        Ok(decode_bio_spans(segment, &tokens))
    }
}

#[async_trait]
impl NerProvider for OnnxNer {
    async fn recognize(&self, text: &str) -> Result<Vec<NerSpan>> {
        let text = text.to_string();
        let model = Arc::clone(&self.model);
        let id2label = Arc::clone(&self.id2label);
        let segment_chars = self.segment_chars;

        tokio::task::spawn_blocking(move || {
            let mut model = model.lock();
            let mut spans = Vec::new();
            for segment in text_segments(&text, segment_chars) {
                spans.extend(model.tag_segment(segment, &id2label)?);
            }
            Ok(spans)
        })
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &str {
        "onnx-ner"
    }
}
