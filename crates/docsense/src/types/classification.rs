//! Classification result types

use serde::{Deserialize, Serialize};

/// One candidate label with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub confidence: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Ranked document-type classification
///
/// `label` and `confidence` always equal the first entry of `all_predictions`,
/// which is sorted by descending confidence and holds at most the configured
/// number of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: f32,
    /// Serialized as `[label, confidence]` pairs
    #[serde(with = "pairs")]
    pub all_predictions: Vec<LabelScore>,
}

impl ClassificationResult {
    /// Build from ranked predictions; `None` when `predictions` is empty
    pub fn from_ranked(predictions: Vec<LabelScore>) -> Option<Self> {
        let top = predictions.first()?.clone();
        Some(Self {
            label: top.label,
            confidence: top.confidence,
            all_predictions: predictions,
        })
    }

    /// Whether callers should surface all predictions instead of trusting the top one
    pub fn is_low_confidence(&self, threshold: f32) -> bool {
        self.confidence < threshold
    }
}

mod pairs {
    use super::LabelScore;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        scores: &[LabelScore],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let pairs: Vec<(&str, f32)> = scores
            .iter()
            .map(|s| (s.label.as_str(), s.confidence))
            .collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<LabelScore>, D::Error> {
        let pairs: Vec<(String, f32)> = Vec::deserialize(deserializer)?;
        Ok(pairs
            .into_iter()
            .map(|(label, confidence)| LabelScore { label, confidence })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ranked_takes_top() {
        let result = ClassificationResult::from_ranked(vec![
            LabelScore::new("invoice", 0.8),
            LabelScore::new("receipt", 0.15),
        ])
        .unwrap();
        assert_eq!(result.label, "invoice");
        assert_eq!(result.confidence, 0.8);
        assert!(!result.is_low_confidence(0.5));
        assert!(ClassificationResult::from_ranked(Vec::new()).is_none());
    }

    #[test]
    fn test_predictions_serialize_as_pairs() {
        let result = ClassificationResult::from_ranked(vec![LabelScore::new("CV", 0.25)]).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["all_predictions"][0][0], "CV");
        assert!(result.is_low_confidence(0.5));

        let back: ClassificationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
