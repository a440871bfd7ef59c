//! Generation provider trait for text-to-text models

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::error::Result;

/// Sampling parameters for one generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Upper bound on generated tokens
    pub max_length: u32,
    pub temperature: f32,
    pub do_sample: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for GenerationParams {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_length: config.max_length,
            temperature: config.temperature,
            do_sample: true,
        }
    }
}

/// Trait for prompt-in, text-out generation models
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (phi3, llama3.2, etc.)
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate text for a fully built prompt
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
