//! Ollama-based providers for embeddings, generation and entity recognition
//!
//! Wraps the shared OllamaClient to implement the provider traits.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::generation::OllamaClient;

use super::embedding::EmbeddingProvider;
use super::llm::{GenerationParams, GenerationProvider};
use super::ner::{NerProvider, NerSpan};

/// Ollama embedding provider using all-minilm or similar models
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: &LlmConfig, dimensions: usize) -> Result<Self> {
        Ok(Self::from_client(Arc::new(OllamaClient::new(config)?), dimensions))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, dimensions: usize) -> Self {
        Self { client, dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama LLM provider for answer generation
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaLlm {
    /// Create a new Ollama LLM provider
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self::from_client(
            Arc::new(OllamaClient::new(config)?),
            config.generate_model.clone(),
        ))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl GenerationProvider for OllamaLlm {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        self.client.generate(prompt, params).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

const NER_PROMPT: &str = r#"Extract named entities from the text below.
Return ONLY a JSON array of objects with "text" and "label" fields.
Use these labels: PERSON (people), ORG (companies, agencies, institutions),
DATE (absolute or relative dates), GPE (countries, cities, states).
Copy each entity exactly as it appears in the text.

TEXT:
"#;

#[derive(Deserialize)]
struct RawSpan {
    text: String,
    label: String,
}

/// Entity recognition by prompting a generation model for JSON spans
pub struct OllamaNer {
    llm: Arc<dyn GenerationProvider>,
    params: GenerationParams,
}

impl OllamaNer {
    pub fn new(llm: Arc<dyn GenerationProvider>) -> Self {
        Self {
            llm,
            params: GenerationParams {
                max_length: 1024,
                temperature: 0.0,
                do_sample: false,
            },
        }
    }

    /// Pull the JSON array out of a model reply that may carry prose around it
    fn parse_spans(reply: &str) -> Result<Vec<NerSpan>> {
        let start = reply
            .find('[')
            .ok_or_else(|| Error::ner("reply contains no JSON array"))?;
        let end = reply
            .rfind(']')
            .filter(|end| *end > start)
            .ok_or_else(|| Error::ner("reply contains an unterminated JSON array"))?;

        let raw: Vec<RawSpan> = serde_json::from_str(&reply[start..=end])?;
        Ok(raw
            .into_iter()
            .filter(|span| !span.text.trim().is_empty())
            .map(|span| NerSpan::new(span.text.trim(), span.label.trim().to_uppercase()))
            .collect())
    }
}

#[async_trait]
impl NerProvider for OllamaNer {
    async fn recognize(&self, text: &str) -> Result<Vec<NerSpan>> {
        let prompt = format!("{}{}", NER_PROMPT, text);
        let reply = self.llm.generate(&prompt, &self.params).await?;
        Self::parse_spans(&reply)
    }

    fn name(&self) -> &str {
        "ollama-ner"
    }
}
