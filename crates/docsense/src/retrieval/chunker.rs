//! Sentence-ish chunking with a fixed-window fallback

use crate::config::RetrievalConfig;

/// Splits text on a literal delimiter, keeping chunks above a minimum length
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    delimiter: String,
    /// Chunks must be strictly longer than this many characters
    min_chars: usize,
    /// Window size used when no chunk qualifies
    window_chars: usize,
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

impl SentenceChunker {
    pub fn new(delimiter: impl Into<String>, min_chars: usize, window_chars: usize) -> Self {
        Self {
            delimiter: delimiter.into(),
            min_chars,
            window_chars: window_chars.max(1),
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(
            config.delimiter.clone(),
            config.min_chunk_chars,
            config.fallback_window_chars,
        )
    }

    /// Chunk `text`; returns an empty list only for empty text
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chunks: Vec<String> = if self.delimiter.is_empty() {
            vec![text.to_string()]
        } else {
            text.split(self.delimiter.as_str()).map(str::to_string).collect()
        };

        let chunks: Vec<String> = chunks
            .into_iter()
            .filter(|chunk| chunk.chars().count() > self.min_chars)
            .collect();

        if !chunks.is_empty() {
            return chunks;
        }

        tracing::debug!("No sentence chunk qualified, using {}-char windows", self.window_chars);
        self.windows(text)
    }

    /// Non-overlapping fixed-size character windows
    fn windows(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.window_chars)
            .map(|window| window.iter().collect())
            .collect()
    }
}
