//! Zero-shot label scorer trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::LabelScore;

/// Scores a text against an arbitrary candidate label set
///
/// Implementations return one entry per candidate, sorted by descending
/// confidence, with confidences in `[0, 1]`.
///
/// Implementations:
/// - `OnnxNliScorer`: NLI cross-encoder entailment over (text, hypothesis) pairs
/// - `EmbeddingZeroShotScorer`: hypothesis-embedding similarity with softmax
#[async_trait]
pub trait ZeroShotScorer: Send + Sync {
    async fn score(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>>;

    /// Get scorer name for logging
    fn name(&self) -> &str;
}
