//! Retrieval chunk type

use serde::{Deserialize, Serialize};

/// A chunk of the document ranked against a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Position of the chunk in document order
    pub index: usize,
    /// Chunk text
    pub content: String,
    /// Cosine similarity to the question (NaN mapped to 0.0)
    pub similarity: f32,
}
