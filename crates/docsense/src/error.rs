//! Error types for the document pipeline

use thiserror::Error;

/// Result type alias for docsense operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Ollama/LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Named-entity recognizer error
    #[error("Entity recognition failed: {0}")]
    Ner(String),

    /// Classifier invocation failed or returned a malformed result
    #[error("Classification failed: {0}")]
    Classification(String),

    /// Document text was empty where content is required
    #[error("No content to process")]
    EmptyContent,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Config file parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an NER error
    pub fn ner(message: impl Into<String>) -> Self {
        Self::Ner(message.into())
    }

    /// Create a classification error
    pub fn classification(message: impl Into<String>) -> Self {
        Self::Classification(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
