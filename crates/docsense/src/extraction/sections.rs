//! Header-keyword section segmentation
//!
//! A single pass over the lines of a document. A line whose lower-cased,
//! trimmed form contains a keyword from one of the ordered rules becomes a
//! header and switches the current section; the first matching rule wins.
//! Other non-empty lines are appended to the current section. Lines before
//! the first header are dropped.
//!
//! Header detection is a substring heuristic: a body line such as
//! "These results confirm..." is taken as a header.

use crate::types::{SectionKind, SectionMap};

/// Ordered (keywords, section) rules, evaluated top to bottom
const SECTION_RULES: [(&[&str], SectionKind); 6] = [
    (&["abstract", "summary"], SectionKind::Abstract),
    (&["introduction"], SectionKind::Introduction),
    (&["methodology", "method", "approach"], SectionKind::Methodology),
    (&["result", "finding", "experiment"], SectionKind::Results),
    (&["conclusion", "discussion"], SectionKind::Conclusion),
    (&["reference", "bibliography"], SectionKind::References),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct SectionSegmenter;

impl SectionSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Section a line opens, if it reads as a header
    pub fn header_kind(line: &str) -> Option<SectionKind> {
        let lowered = line.trim().to_lowercase();
        SECTION_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(_, kind)| *kind)
    }

    pub fn segment(&self, text: &str) -> SectionMap {
        let mut sections = SectionMap::default();
        let mut current: Option<SectionKind> = None;

        for line in text.split('\n') {
            if let Some(kind) = Self::header_kind(line) {
                current = Some(kind);
                continue;
            }

            if let Some(kind) = current {
                if !line.trim().is_empty() {
                    sections.push_line(kind, line);
                }
            }
        }

        tracing::debug!(
            "Segmented document: {} references, abstract {} chars",
            sections.reference_count(),
            sections.abstract_text.len()
        );

        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abstract_and_methodology() {
        let sections = SectionSegmenter.segment("Abstract\nFoo bar.\nMethodology\nBaz qux.");

        assert_eq!(sections.abstract_text, "Foo bar. ");
        assert_eq!(sections.methodology, "Baz qux. ");
        assert!(sections.introduction.is_empty());
        assert!(sections.results.is_empty());
        assert!(sections.conclusion.is_empty());
        assert!(sections.references.is_empty());
    }

    #[test]
    fn test_lines_before_first_header_dropped() {
        let sections =
            SectionSegmenter.segment("Title Page\nSome preface\n\nIntroduction\nHello world");
        assert_eq!(sections.introduction, "Hello world ");
        assert_eq!(sections.text(SectionKind::Abstract), "");
    }

    #[test]
    fn test_priority_order_first_rule_wins() {
        // "summary" (abstract rule) outranks "results"
        assert_eq!(
            SectionSegmenter::header_kind("Summary of Results"),
            Some(SectionKind::Abstract)
        );
        // "method" outranks "experiment"
        assert_eq!(
            SectionSegmenter::header_kind("  EXPERIMENTAL METHODS "),
            Some(SectionKind::Methodology)
        );
        assert_eq!(SectionSegmenter::header_kind("Discussion"), Some(SectionKind::Conclusion));
        assert_eq!(SectionSegmenter::header_kind("Plain sentence."), None);
    }

    #[test]
    fn test_body_line_with_keyword_switches_section() {
        let sections = SectionSegmenter.segment("Abstract\nOur approach is new.\nIt works.");
        assert!(sections.abstract_text.is_empty());
        assert_eq!(sections.methodology, "It works. ");
    }

    #[test]
    fn test_references_trimmed_and_deduplicated() {
        let text = "References\n  [1] Smith 2020  \n[2] Doe 2021\n[1] Smith 2020\n\n";
        let sections = SectionSegmenter.segment(text);
        assert_eq!(sections.references, vec!["[1] Smith 2020", "[2] Doe 2021"]);
        assert_eq!(sections.reference_count(), 2);
    }

    #[test]
    fn test_body_lines_kept_untrimmed() {
        let sections = SectionSegmenter.segment("Conclusion\n  indented line\r\n");
        assert_eq!(sections.conclusion, "  indented line\r ");
    }

    #[test]
    fn test_empty_text() {
        assert!(SectionSegmenter.segment("").is_empty());
    }
}
