//! Chunking and similarity ranking for question answering

pub mod chunker;
pub mod search;

pub use chunker::SentenceChunker;
pub use search::{cosine_similarity, Retriever};
