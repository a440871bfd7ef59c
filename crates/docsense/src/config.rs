//! Configuration for the document pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocSenseConfig {
    /// Ollama connection and model names
    #[serde(default)]
    pub llm: LlmConfig,
    /// Sentence-embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Zero-shot classification settings
    #[serde(default)]
    pub classification: ClassificationConfig,
    /// Named-entity recognizer selection
    #[serde(default)]
    pub ner: NerConfig,
    /// Chunking and ranking settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Answer generation settings
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl DocSenseConfig {
    /// Parse a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "all-minilm".to_string(),
            generate_model: "phi3".to_string(),
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Which embedding backend to load
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama `/api/embeddings`
    #[default]
    Ollama,
    /// Local ONNX Runtime session (requires the `onnx` feature)
    Onnx,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend used for chunk, question and label-hypothesis embeddings
    pub backend: EmbeddingBackend,
    /// Model for the ONNX backend; a bare name is looked up under `sentence-transformers/`
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Batch size for embedding generation
    pub batch_size: usize,
    /// Maximum sequence length
    pub max_length: usize,
    /// Cache root for every downloaded ONNX model, one subdirectory per repository
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Ollama,
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
            max_length: 256,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("docsense")
                .join("models"),
        }
    }
}

/// Which zero-shot scorer to load
///
/// The NLI cross-encoder is the default whenever the `onnx` feature is built;
/// without it only the embedding scorer can be constructed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScorerBackend {
    /// Entailment scoring of (sample, hypothesis) pairs with an NLI model
    Nli,
    /// Cosine similarity between sample and hypothesis embeddings
    Embedding,
}

impl Default for ScorerBackend {
    fn default() -> Self {
        if cfg!(feature = "onnx") {
            ScorerBackend::Nli
        } else {
            ScorerBackend::Embedding
        }
    }
}

/// Zero-shot classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Scorer implementation
    pub scorer: ScorerBackend,
    /// Leading characters of the document used as the classification sample
    pub sample_chars: usize,
    /// Number of ranked predictions kept
    pub top_k: usize,
    /// Confidence below which callers should show all predictions
    pub low_confidence_threshold: f32,
    /// Hypothesis sentence, `{label}` is replaced by each candidate
    pub hypothesis_template: String,
    /// HuggingFace repository of the ONNX NLI model
    pub nli_model: String,
    /// Token limit for a (sample, hypothesis) pair
    pub nli_max_length: usize,
    /// Softmax temperature applied to hypothesis similarities (embedding scorer)
    pub softmax_temperature: f32,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            scorer: ScorerBackend::default(),
            sample_chars: 1000,
            top_k: 3,
            low_confidence_threshold: 0.5,
            hypothesis_template: "This document is a {label}.".to_string(),
            nli_model: "Xenova/bart-large-mnli".to_string(),
            nli_max_length: 512,
            softmax_temperature: 0.05,
        }
    }
}

/// Which named-entity recognizer to load
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NerBackend {
    /// Prompted recognition through the Ollama generation model
    #[default]
    Ollama,
    /// Local ONNX token-classification model (requires the `onnx` feature)
    Onnx,
    /// Rule-based fallback for environments without any model
    Patterns,
}

/// NER configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    pub backend: NerBackend,
    /// HuggingFace repository of the ONNX token-classification model
    pub model: String,
    /// Token limit per recognized segment
    pub max_length: usize,
    /// Documents are recognized in line-aligned segments of about this many characters
    pub segment_chars: usize,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            backend: NerBackend::Ollama,
            model: "Xenova/bert-base-NER".to_string(),
            max_length: 512,
            segment_chars: 1000,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the generator
    pub top_k: usize,
    /// Chunks must be strictly longer than this many characters
    pub min_chunk_chars: usize,
    /// Window size used when no sentence chunk qualifies
    pub fallback_window_chars: usize,
    /// Literal delimiter between sentence chunks
    pub delimiter: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_chunk_chars: 20,
            fallback_window_chars: 200,
            delimiter: ". ".to_string(),
        }
    }
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Upper bound on generated tokens
    pub max_length: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: 200,
            temperature: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = DocSenseConfig::default();
        assert_eq!(config.classification.sample_chars, 1000);
        assert_eq!(config.classification.top_k, 3);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.fallback_window_chars, 200);
        assert_eq!(config.generation.max_length, 200);
        assert!((config.generation.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let raw = r#"
[llm]
generate_model = "llama3.2:3b"

[ner]
backend = "patterns"

[classification]
scorer = "embedding"
"#;
        let config: DocSenseConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.llm.generate_model, "llama3.2:3b");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.ner.backend, NerBackend::Patterns);
        assert_eq!(config.ner.model, "Xenova/bert-base-NER");
        assert_eq!(config.classification.scorer, ScorerBackend::Embedding);
        assert_eq!(config.classification.top_k, 3);
        assert_eq!(config.embeddings.backend, EmbeddingBackend::Ollama);
        assert_eq!(config.retrieval.delimiter, ". ");
    }

    #[test]
    fn test_model_backed_defaults() {
        let config = DocSenseConfig::default();
        assert_eq!(config.ner.backend, NerBackend::Ollama);
        let expected = if cfg!(feature = "onnx") {
            ScorerBackend::Nli
        } else {
            ScorerBackend::Embedding
        };
        assert_eq!(config.classification.scorer, expected);
    }

    #[test]
    fn test_load_without_path_is_default() {
        let config = DocSenseConfig::load(None).unwrap();
        assert_eq!(config.embeddings.dimensions, 384);
    }
}
