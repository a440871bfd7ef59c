//! Ranked classification over a fixed candidate label set

use std::sync::Arc;

use crate::config::ClassificationConfig;
use crate::error::{Error, Result};
use crate::providers::ZeroShotScorer;
use crate::types::{ClassificationResult, LabelScore};

/// Candidate document types, in scoring order
pub const CANDIDATE_LABELS: [&str; 15] = [
    "research paper",
    "whitepaper",
    "technical report",
    "invoice",
    "receipt",
    "purchase order",
    "resume",
    "CV",
    "curriculum vitae",
    "contract",
    "agreement",
    "legal document",
    "business report",
    "blog post",
    "article",
];

/// First `max_chars` characters of `text`
pub fn leading_sample(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Classifies documents by delegating scoring to a pluggable [`ZeroShotScorer`]
pub struct ZeroShotClassifier {
    scorer: Arc<dyn ZeroShotScorer>,
    sample_chars: usize,
    top_k: usize,
}

impl ZeroShotClassifier {
    pub fn new(scorer: Arc<dyn ZeroShotScorer>, config: &ClassificationConfig) -> Self {
        Self {
            scorer,
            sample_chars: config.sample_chars,
            top_k: config.top_k.max(1),
        }
    }

    /// Classify a document; scorer failures propagate
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let sample = leading_sample(text, self.sample_chars);
        tracing::info!(
            "Classifying sample of {} chars with {}",
            sample.chars().count(),
            self.scorer.name()
        );

        let scores = self.scorer.score(sample, &CANDIDATE_LABELS).await?;
        let ranked = Self::rank(scores, self.top_k)?;

        let result = ClassificationResult::from_ranked(ranked)
            .ok_or_else(|| Error::classification("scorer returned no labels"))?;

        tracing::info!("Classified as '{}' ({:.2})", result.label, result.confidence);
        Ok(result)
    }

    /// Validate scores and keep the `top_k` best, highest first
    fn rank(mut scores: Vec<LabelScore>, top_k: usize) -> Result<Vec<LabelScore>> {
        if let Some(bad) = scores
            .iter()
            .find(|s| !(0.0..=1.0).contains(&s.confidence))
        {
            return Err(Error::classification(format!(
                "confidence {} for '{}' is outside [0, 1]",
                bad.confidence, bad.label
            )));
        }

        scores.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        scores.truncate(top_k);
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Returns fixed scores and remembers the sample it was given
    struct ScriptedScorer {
        scores: Vec<LabelScore>,
        seen: Mutex<Option<String>>,
    }

    impl ScriptedScorer {
        fn new(scores: Vec<(&str, f32)>) -> Self {
            Self {
                scores: scores.into_iter().map(|(l, c)| LabelScore::new(l, c)).collect(),
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ZeroShotScorer for ScriptedScorer {
        async fn score(&self, text: &str, _labels: &[&str]) -> Result<Vec<LabelScore>> {
            *self.seen.lock() = Some(text.to_string());
            Ok(self.scores.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl ZeroShotScorer for FailingScorer {
        async fn score(&self, _text: &str, _labels: &[&str]) -> Result<Vec<LabelScore>> {
            Err(Error::embedding("connection refused"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn classifier(scorer: Arc<dyn ZeroShotScorer>) -> ZeroShotClassifier {
        ZeroShotClassifier::new(scorer, &ClassificationConfig::default())
    }

    #[tokio::test]
    async fn test_top_three_sorted() {
        let scorer = Arc::new(ScriptedScorer::new(vec![
            ("receipt", 0.2),
            ("invoice", 0.6),
            ("article", 0.05),
            ("purchase order", 0.15),
        ]));
        let result = classifier(scorer).classify("Invoice #1").await.unwrap();

        assert_eq!(result.label, "invoice");
        assert_eq!(result.confidence, 0.6);
        let labels: Vec<&str> = result.all_predictions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["invoice", "receipt", "purchase order"]);
        assert_eq!(result.all_predictions[0].label, result.label);
    }

    #[tokio::test]
    async fn test_fewer_than_three_predictions() {
        let scorer = Arc::new(ScriptedScorer::new(vec![("CV", 0.9)]));
        let result = classifier(scorer).classify("Jane Doe").await.unwrap();
        assert_eq!(result.all_predictions.len(), 1);
    }

    #[tokio::test]
    async fn test_sample_truncated_to_1000_chars() {
        let scorer = Arc::new(ScriptedScorer::new(vec![("article", 1.0)]));
        let text = "é".repeat(1500);
        classifier(scorer.clone()).classify(&text).await.unwrap();
        assert_eq!(scorer.seen.lock().as_deref().map(|s| s.chars().count()), Some(1000));

        classifier(scorer.clone()).classify("short").await.unwrap();
        assert_eq!(scorer.seen.lock().as_deref(), Some("short"));
    }

    #[tokio::test]
    async fn test_scorer_failure_propagates() {
        assert!(classifier(Arc::new(FailingScorer)).classify("anything").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_or_malformed_scores_are_errors() {
        let empty = Arc::new(ScriptedScorer::new(Vec::new()));
        assert!(matches!(
            classifier(empty).classify("x").await,
            Err(Error::Classification(_))
        ));

        let malformed = Arc::new(ScriptedScorer::new(vec![("invoice", 1.7)]));
        assert!(matches!(
            classifier(malformed).classify("x").await,
            Err(Error::Classification(_))
        ));
    }

    #[test]
    fn test_leading_sample() {
        assert_eq!(leading_sample("abcdef", 3), "abc");
        assert_eq!(leading_sample("ab", 3), "ab");
        assert_eq!(leading_sample("", 3), "");
    }
}
