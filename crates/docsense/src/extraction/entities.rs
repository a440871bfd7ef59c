//! Typed entity extraction: NER pass plus regex detectors

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

use crate::error::Result;
use crate::providers::NerProvider;
use crate::types::{EntityBag, EntityKind};

/// Domain vocabulary reported under TECH
pub const TECH_TERMS: [&str; 13] = [
    "LLM",
    "AI",
    "Machine Learning",
    "Deep Learning",
    "NLP",
    "Transformer",
    "GPT",
    "BERT",
    "Generative AI",
    "Foundation Models",
    "Natural Language Processing",
    "Computer Vision",
    "Neural Network",
];

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").expect("Invalid regex")
});

/// International prefix, parenthesized area code, dash/space separated; applied in this order
static PHONE: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"\+\d{1,3}[\s-]?\d{1,4}[\s-]?\d{1,4}[\s-]?\d{1,9}").expect("Invalid regex"),
        Regex::new(r"\(\d{3}\)\s?\d{3}[\s-]\d{4}").expect("Invalid regex"),
        Regex::new(r"\d{3}[\s-]\d{3}[\s-]\d{4}").expect("Invalid regex"),
    ]
});

static MONEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?\d{1,3}(?:,\d{3})*(?:\.\d{2})?|\d+(?:\.\d{2})?(?:\s*(?:dollars|USD))?")
        .expect("Invalid regex")
});

static TECH: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    TECH_TERMS
        .iter()
        .map(|term| {
            let regex = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(term)))
                .case_insensitive(true)
                .build()
                .expect("Invalid regex");
            (*term, regex)
        })
        .collect()
});

/// Kinds taken from the recognizer; the rest come from dedicated detectors
const NER_KINDS: [EntityKind; 4] = [
    EntityKind::Person,
    EntityKind::Org,
    EntityKind::Date,
    EntityKind::Gpe,
];

/// Produces an [`EntityBag`] for a document
pub struct EntityExtractor {
    ner: Arc<dyn NerProvider>,
}

impl EntityExtractor {
    pub fn new(ner: Arc<dyn NerProvider>) -> Self {
        Self { ner }
    }

    /// Extract all entity kinds from `text`
    ///
    /// A recognizer failure is logged and leaves the NER-derived kinds empty;
    /// the regex detectors still run.
    pub async fn extract(&self, text: &str, doc_type: &str) -> Result<EntityBag> {
        let mut bag = EntityBag::new();

        match self.ner.recognize(text).await {
            Ok(spans) => {
                for span in spans {
                    if let Some(kind) = EntityKind::from_label(&span.label) {
                        if NER_KINDS.contains(&kind) {
                            bag.insert(kind, span.text);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "NER backend {} failed, continuing with regex detectors: {}",
                    self.ner.name(),
                    e
                );
            }
        }

        Self::apply_detectors(&mut bag, text, doc_type);

        tracing::debug!(
            "Extracted {} entities (doc_type: {}, ner: {})",
            bag.total(),
            doc_type,
            self.ner.name()
        );

        Ok(bag)
    }

    /// Regex and vocabulary detectors; these replace anything the recognizer
    /// may have reported for their kinds
    fn apply_detectors(bag: &mut EntityBag, text: &str, doc_type: &str) {
        bag.replace(EntityKind::Email, EMAIL.find_iter(text).map(|m| m.as_str()));

        // Overlapping hits from different patterns are all kept, e.g. both
        // "+1 555-123-4567" and "555-123-4567"
        bag.replace(
            EntityKind::Phone,
            PHONE
                .iter()
                .flat_map(|pattern| pattern.find_iter(text).map(|m| m.as_str())),
        );

        bag.replace(
            EntityKind::Tech,
            TECH.iter()
                .filter(|(_, regex)| regex.is_match(text))
                .map(|(term, _)| *term),
        );

        if doc_type == "invoice" {
            bag.replace(EntityKind::Money, MONEY.find_iter(text).map(|m| m.as_str()));
        } else {
            bag.replace(EntityKind::Money, std::iter::empty::<&str>());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::patterns::PatternNer;
    use crate::providers::NerSpan;
    use async_trait::async_trait;

    struct ScriptedNer(Vec<NerSpan>);

    #[async_trait]
    impl NerProvider for ScriptedNer {
        async fn recognize(&self, _text: &str) -> Result<Vec<NerSpan>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct BrokenNer;

    #[async_trait]
    impl NerProvider for BrokenNer {
        async fn recognize(&self, _text: &str) -> Result<Vec<NerSpan>> {
            Err(Error::ner("model unavailable"))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn extractor(spans: Vec<NerSpan>) -> EntityExtractor {
        EntityExtractor::new(Arc::new(ScriptedNer(spans)))
    }

    #[tokio::test]
    async fn test_ner_spans_deduplicated_and_filtered() {
        let bag = extractor(vec![
            NerSpan::new("Ada Lovelace", "PERSON"),
            NerSpan::new("Ada Lovelace", "PERSON"),
            NerSpan::new("Analytical Engines", "PRODUCT"),
            NerSpan::new("$5", "MONEY"),
            NerSpan::new("fake@ner.io", "EMAIL"),
            NerSpan::new("London", "GPE"),
        ])
        .extract("No regex material here.", "article")
        .await
        .unwrap();

        assert_eq!(bag.get(EntityKind::Person), ["Ada Lovelace"]);
        assert_eq!(bag.get(EntityKind::Gpe), ["London"]);
        assert!(bag.get(EntityKind::Money).is_empty());
        assert!(bag.get(EntityKind::Email).is_empty());
    }

    #[tokio::test]
    async fn test_email_and_phone_patterns() {
        let text = "Reach me at jane.doe@example.com or jane.doe@example.com, \
                    +1 555-123-4567, (555) 987-6543, or 555-222-3333.";
        let bag = extractor(Vec::new()).extract(text, "resume").await.unwrap();

        assert_eq!(bag.get(EntityKind::Email), ["jane.doe@example.com"]);
        assert_eq!(
            bag.get(EntityKind::Phone),
            ["+1 555-123-4567", "(555) 987-6543", "555-123-4567", "555-222-3333"]
        );
    }

    #[tokio::test]
    async fn test_tech_terms_case_insensitive_whole_word() {
        let text = "We fine-tune a transformer for nlp. Said no one: AIRPLANE.";
        let bag = extractor(Vec::new()).extract(text, "whitepaper").await.unwrap();

        assert_eq!(bag.get(EntityKind::Tech), ["NLP", "Transformer"]);
    }

    #[tokio::test]
    async fn test_money_only_for_invoice() {
        let text = "Total due: $1,234.56";
        let invoice = extractor(Vec::new()).extract(text, "invoice").await.unwrap();
        assert!(invoice.get(EntityKind::Money).contains(&"$1,234.56".to_string()));

        let other = extractor(Vec::new()).extract(text, "receipt").await.unwrap();
        assert!(other.get(EntityKind::Money).is_empty());
    }

    #[tokio::test]
    async fn test_every_kind_present_and_distinct() {
        let text =
            "Acme Corp, Acme Corp. Call 555-123-4567 or 555-123-4567. AI AI ai. $10 and $10.";
        let bag = EntityExtractor::new(Arc::new(PatternNer))
            .extract(text, "invoice")
            .await
            .unwrap();

        assert_eq!(bag.iter().count(), EntityKind::ALL.len());
        for (_, values) in bag.iter() {
            let mut seen = std::collections::HashSet::new();
            assert!(values.iter().all(|v| seen.insert(v)));
        }
    }

    #[tokio::test]
    async fn test_ner_failure_degrades_to_regex() {
        let bag = EntityExtractor::new(Arc::new(BrokenNer))
            .extract("contact: ops@acme.io", "article")
            .await
            .unwrap();
        assert_eq!(bag.get(EntityKind::Email), ["ops@acme.io"]);
        assert!(bag.get(EntityKind::Person).is_empty());
    }

    #[tokio::test]
    async fn test_empty_text() {
        let bag = EntityExtractor::new(Arc::new(PatternNer))
            .extract("", "invoice")
            .await
            .unwrap();
        assert_eq!(bag.total(), 0);
    }
}
