//! Rule-based fallback named-entity recognizer
//!
//! Used when no model-backed recognizer is available (`ner.backend =
//! "patterns"`). Covers organisation names ending in a corporate or
//! institutional suffix, common date layouts, honorific and labelled person
//! names, and a small place-name gazetteer. Matches from all rules are merged
//! into non-overlapping spans, earliest first and longest on ties.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

use super::ner::{NerProvider, NerSpan};

struct Rule {
    label: &'static str,
    regex: Regex,
    /// Capture group holding the entity text
    group: usize,
}

impl Rule {
    fn new(label: &'static str, pattern: &str, group: usize) -> Self {
        Self {
            label,
            regex: Regex::new(pattern).expect("Invalid regex"),
            group,
        }
    }
}

const MONTHS: &str = concat!(
    "January|February|March|April|May|June|July|August|September|October|November|",
    "December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec",
);

const ORG_SUFFIXES: &str = concat!(
    "Corp|Corporation|Inc|Incorporated|LLC|LLP|Ltd|Limited|Co|Company|Group|GmbH|",
    "Holdings|Technologies|Labs|Systems|Solutions|Partners|University|Institute|",
    "Foundation|Association|Bank",
);

const PLACES: &str = concat!(
    "United States|United Kingdom|USA|UK|Canada|Mexico|Brazil|Germany|France|Spain|",
    "Italy|Netherlands|Sweden|Norway|Switzerland|Ireland|India|China|Japan|Korea|",
    "Singapore|Australia|New Zealand|South Africa|Nigeria|Kenya|Egypt|Israel|New York|",
    "Los Angeles|San Francisco|Seattle|Chicago|Boston|Austin|Minneapolis|Toronto|",
    "Vancouver|London|Paris|Berlin|Madrid|Rome|Amsterdam|Dublin|Zurich|Tokyo|Beijing|",
    "Shanghai|Bangalore|Mumbai|Delhi|Sydney|California|Texas|Florida|Washington|",
    "Minnesota|Massachusetts|Illinois",
);

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(
            "ORG",
            &format!(
                r"\b(?:[A-Z][A-Za-z0-9&'-]*[ \t]+){{0,4}}(?:{})\b",
                ORG_SUFFIXES
            ),
            0,
        ),
        Rule::new(
            "ORG",
            concat!(
                r"\b(?:University|Institute|Bank|Ministry|Department)",
                r"[ \t]+of(?:[ \t]+[A-Z][A-Za-z-]*){1,3}",
            ),
            0,
        ),
        Rule::new("DATE", r"\b\d{4}-\d{2}-\d{2}\b", 0),
        Rule::new("DATE", r"\b\d{1,2}/\d{1,2}/\d{2,4}\b", 0),
        Rule::new(
            "DATE",
            &format!(
                r"\b(?:{})\.?[ \t]+\d{{1,2}}(?:st|nd|rd|th)?,?[ \t]+\d{{4}}\b",
                MONTHS
            ),
            0,
        ),
        Rule::new(
            "DATE",
            &format!(r"\b\d{{1,2}}[ \t]+(?:{})\.?,?[ \t]+\d{{4}}\b", MONTHS),
            0,
        ),
        Rule::new("DATE", &format!(r"\b(?:{})[ \t]+\d{{4}}\b", MONTHS), 0),
        Rule::new(
            "PERSON",
            r"\b(?:Mr|Mrs|Ms|Dr|Prof)\.?[ \t]+([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+){0,2})",
            1,
        ),
        Rule::new(
            "PERSON",
            concat!(
                r"(?:Name|Author|Authors|Candidate|Prepared by|Contact|Attn)[ \t]*:[ \t]*",
                r"([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z]+){1,2})",
            ),
            1,
        ),
        Rule::new("GPE", &format!(r"\b(?:{})\b", PLACES), 0),
    ]
});

/// Capitalised words that precede an organisation name but are never part of it
const ORG_NON_NAME_WORDS: [&str; 32] = [
    "The", "From", "Bill", "Billed", "To", "Thank", "You", "For", "Choosing", "By", "Paid",
    "Pay", "Payable", "Remit", "Invoice", "Invoiced", "Sold", "Ship", "Shipped", "Dear",
    "Welcome", "With", "Our", "Your", "Please", "Issued", "Vendor", "Customer", "Client",
    "Attn", "And", "At",
];

/// Byte offset and text of each whitespace-separated word
fn word_offsets(value: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in value.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                words.push((s, &value[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push((s, &value[s..]));
    }
    words
}

/// Drop everything up to the last non-name word ("Billed From Acme Corp" -> "Acme Corp")
///
/// Returns the offset into `value` where the name starts, or `None` when only
/// the suffix would remain.
fn org_name_start(value: &str) -> Option<usize> {
    let words = word_offsets(value);
    let last = words.len().checked_sub(1)?;
    let keep_from = words[..last]
        .iter()
        .rposition(|(_, word)| ORG_NON_NAME_WORDS.contains(word))
        .map_or(0, |i| i + 1);
    if keep_from >= last {
        return None;
    }
    Some(words[keep_from].0)
}

struct Candidate {
    start: usize,
    end: usize,
    label: &'static str,
    text: String,
}

/// Local rule-based recognizer; never fails
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternNer;

impl PatternNer {
    pub fn new() -> Self {
        Self
    }

    /// Recognize spans synchronously
    pub fn recognize_sync(&self, text: &str) -> Vec<NerSpan> {
        let mut candidates: Vec<Candidate> = Vec::new();

        for rule in RULES.iter() {
            for caps in rule.regex.captures_iter(text) {
                let Some(m) = caps.get(rule.group) else {
                    continue;
                };
                let mut start = m.start();
                let mut value = m.as_str();

                if rule.label == "ORG" {
                    let Some(offset) = org_name_start(value) else {
                        continue;
                    };
                    start += offset;
                    value = &value[offset..];
                }

                let value = value.trim_end();
                if value.is_empty() {
                    continue;
                }

                candidates.push(Candidate {
                    start,
                    end: start + value.len(),
                    label: rule.label,
                    text: value.to_string(),
                });
            }
        }

        // Earliest first, longest on ties
        candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut spans = Vec::new();
        let mut covered_until = 0usize;
        for candidate in candidates {
            if candidate.start < covered_until {
                continue;
            }
            covered_until = candidate.end;
            spans.push(NerSpan::new(candidate.text, candidate.label));
        }

        spans
    }
}

#[async_trait]
impl NerProvider for PatternNer {
    async fn recognize(&self, text: &str) -> Result<Vec<NerSpan>> {
        Ok(self.recognize_sync(text))
    }

    fn name(&self) -> &str {
        "patterns"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_for<'a>(spans: &'a [NerSpan], label: &str) -> Vec<&'a str> {
        spans
            .iter()
            .filter(|s| s.label == label)
            .map(|s| s.text.as_str())
            .collect()
    }

    #[test]
    fn test_org_with_suffix() {
        let spans = PatternNer
            .recognize_sync("Invoice from Acme Corp for services. Paid by The Globex Corporation.");
        assert_eq!(labels_for(&spans, "ORG"), vec!["Acme Corp", "Globex Corporation"]);
    }

    #[test]
    fn test_org_after_leading_capitalised_words() {
        let spans = PatternNer.recognize_sync("Billed From Acme Corp, 12 Main St.");
        assert_eq!(labels_for(&spans, "ORG"), vec!["Acme Corp"]);

        let spans = PatternNer.recognize_sync("Thank You For Choosing Acme Corp");
        assert_eq!(labels_for(&spans, "ORG"), vec!["Acme Corp"]);

        let spans = PatternNer.recognize_sync("Globex Systems Corp");
        assert_eq!(labels_for(&spans, "ORG"), vec!["Globex Systems Corp"]);
    }

    #[test]
    fn test_bare_suffix_is_not_an_org() {
        let spans = PatternNer.recognize_sync("Payable To Company");
        assert!(labels_for(&spans, "ORG").is_empty());
    }

    #[test]
    fn test_university_of() {
        let spans =
            PatternNer.recognize_sync("Work done at the University of Minnesota Twin Cities.");
        assert_eq!(
            labels_for(&spans, "ORG"),
            vec!["University of Minnesota Twin Cities"]
        );
    }

    #[test]
    fn test_dates() {
        let text = "Invoice Date: 2024-01-05\nDue 02/05/2024, signed January 5, 2024 \
                    and 3 March 2023. Published June 2022.";
        let spans = PatternNer.recognize_sync(text);
        assert_eq!(
            labels_for(&spans, "DATE"),
            vec!["2024-01-05", "02/05/2024", "January 5, 2024", "3 March 2023", "June 2022"]
        );
    }

    #[test]
    fn test_people_and_places() {
        let text = "Authors: Jane Doe\nReviewed by Dr. Alan Turing in London.";
        let spans = PatternNer.recognize_sync(text);
        assert_eq!(labels_for(&spans, "PERSON"), vec!["Jane Doe", "Alan Turing"]);
        assert_eq!(labels_for(&spans, "GPE"), vec!["London"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(PatternNer.recognize_sync("").is_empty());
    }
}
