//! Provider abstractions for the pretrained models
//!
//! Each model the pipeline relies on is reached through a trait so the
//! backend (Ollama, ONNX, local rules) can be swapped without touching the
//! ranking, extraction or prompting logic.

pub mod embedding;
pub mod inference;
pub mod llm;
pub mod ner;
pub mod ollama;
pub mod patterns;
pub mod scorer;
pub mod zero_shot;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use embedding::EmbeddingProvider;
pub use llm::{GenerationParams, GenerationProvider};
pub use ner::{NerProvider, NerSpan};
pub use scorer::ZeroShotScorer;
