//! Named-entity recognizer trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One recognized span
///
/// `label` uses the recognizer's own tag set; labels outside the fixed
/// entity kinds are ignored downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NerSpan {
    pub text: String,
    pub label: String,
}

impl NerSpan {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Trait for named-entity recognition over a full document
///
/// Implementations:
/// - `OllamaNer`: Prompted recognition through an Ollama model
/// - `OnnxNer`: Local BERT token-classification model
/// - `PatternNer`: Rule-based fallback when no model is configured
#[async_trait]
pub trait NerProvider: Send + Sync {
    /// Recognize entity spans in document order
    async fn recognize(&self, text: &str) -> Result<Vec<NerSpan>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
