//! Maps a document type onto its schema and fills it from extracted entities/sections

use crate::types::structured::{
    ContactInfo, ContractFields, GeneralFields, InvoiceFields, KeySections, ResearchFields,
    ResumeFields,
};
use crate::types::{EntityBag, EntityKind, ExtractedFields, SectionMap, StructuredOutput};

/// Appended to any field cut at its length cap
pub const TRUNCATION_MARKER: &str = "...";

const TITLE_CHARS: usize = 100;
const SECTION_CHARS: usize = 500;
const SUMMARY_CHARS: usize = 300;

/// Keep the first `max_chars` characters, adding the marker only when something was cut
pub fn truncate_with_marker(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{}", &text[..idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

fn truncate_plain(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Short preview of a document for display
pub fn preview(text: &str, max_chars: usize) -> String {
    truncate_with_marker(text, max_chars)
}

/// Schema group a document type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentGroup {
    Research,
    Invoice,
    Resume,
    Contract,
    General,
}

impl DocumentGroup {
    /// Exact, case-sensitive membership test
    pub fn of(doc_type: &str) -> Self {
        match doc_type {
            "whitepaper" | "research paper" | "technical report" => DocumentGroup::Research,
            "invoice" => DocumentGroup::Invoice,
            "resume" | "CV" | "curriculum vitae" => DocumentGroup::Resume,
            "contract" | "agreement" | "legal document" => DocumentGroup::Contract,
            _ => DocumentGroup::General,
        }
    }

    /// Name reported as `document_type`; research and general keep the input label
    pub fn canonical_name<'a>(&self, doc_type: &'a str) -> &'a str {
        match self {
            DocumentGroup::Invoice => "invoice",
            DocumentGroup::Resume => "resume",
            DocumentGroup::Contract => "contract",
            DocumentGroup::Research | DocumentGroup::General => doc_type,
        }
    }

    /// Only the research schema reads sections
    pub fn needs_sections(&self) -> bool {
        matches!(self, DocumentGroup::Research)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredOutputBuilder;

impl StructuredOutputBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        text: &str,
        doc_type: &str,
        entities: &EntityBag,
        sections: &SectionMap,
    ) -> StructuredOutput {
        let group = DocumentGroup::of(doc_type);

        let extracted_fields = match group {
            DocumentGroup::Research => ExtractedFields::Research(ResearchFields {
                title: truncate_plain(text, TITLE_CHARS),
                authors: entities.values(EntityKind::Person),
                organizations: entities.values(EntityKind::Org),
                publication_date: entities.values(EntityKind::Date),
                technologies: entities.values(EntityKind::Tech),
                key_sections: KeySections {
                    abstract_text: truncate_with_marker(&sections.abstract_text, SECTION_CHARS),
                    methodology: truncate_with_marker(&sections.methodology, SECTION_CHARS),
                    key_findings: truncate_with_marker(&sections.results, SECTION_CHARS),
                },
                reference_count: sections.reference_count(),
            }),
            DocumentGroup::Invoice => ExtractedFields::Invoice(InvoiceFields {
                vendor_name: entities.values(EntityKind::Org),
                invoice_date: entities.values(EntityKind::Date),
                total_amount: entities.values(EntityKind::Money),
                line_items: Vec::new(),
            }),
            DocumentGroup::Resume => ExtractedFields::Resume(ResumeFields {
                candidate_name: entities.values(EntityKind::Person),
                contact_info: ContactInfo {
                    email: entities.values(EntityKind::Email),
                    phone: entities.values(EntityKind::Phone),
                },
                skills: entities.values(EntityKind::Tech),
                education: Vec::new(),
                work_experience: Vec::new(),
            }),
            DocumentGroup::Contract => ExtractedFields::Contract(ContractFields {
                parties: entities.values(EntityKind::Org),
                dates: entities.values(EntityKind::Date),
                key_clauses: Vec::new(),
            }),
            DocumentGroup::General => ExtractedFields::General(GeneralFields {
                key_entities: entities.non_empty(),
                summary: truncate_with_marker(text, SUMMARY_CHARS),
            }),
        };

        StructuredOutput {
            document_type: group.canonical_name(doc_type).to_string(),
            extracted_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> EntityBag {
        let mut bag = EntityBag::new();
        bag.insert(EntityKind::Person, "Jane Doe");
        bag.insert(EntityKind::Org, "Acme Corp");
        bag.insert(EntityKind::Date, "2024-01-05");
        bag.insert(EntityKind::Email, "jane@acme.io");
        bag.insert(EntityKind::Phone, "555-123-4567");
        bag.insert(EntityKind::Money, "$1,234.56");
        bag.insert(EntityKind::Tech, "NLP");
        bag
    }

    fn build(text: &str, doc_type: &str, sections: &SectionMap) -> StructuredOutput {
        StructuredOutputBuilder.build(text, doc_type, &bag(), sections)
    }

    #[test]
    fn test_truncate_with_marker() {
        assert_eq!(truncate_with_marker("abcdef", 3), "abc...");
        assert_eq!(truncate_with_marker("abc", 3), "abc");
        assert_eq!(truncate_with_marker("ééééé", 2), "éé...");

        for n in [0usize, 1, 5, 10] {
            let source = "x".repeat(7);
            let out = truncate_with_marker(&source, n);
            assert!(out.chars().count() <= n + TRUNCATION_MARKER.len());
            assert_eq!(out.ends_with(TRUNCATION_MARKER), source.chars().count() > n);
        }
    }

    #[test]
    fn test_canonical_document_types() {
        let sections = SectionMap::default();
        let cases = [
            ("CV", "resume"),
            ("curriculum vitae", "resume"),
            ("resume", "resume"),
            ("agreement", "contract"),
            ("legal document", "contract"),
            ("invoice", "invoice"),
            ("whitepaper", "whitepaper"),
            ("technical report", "technical report"),
            ("blog post", "blog post"),
            ("Invoice", "Invoice"),
        ];
        for (input, expected) in cases {
            assert_eq!(build("text", input, &sections).document_type, expected, "input {input}");
        }
    }

    #[test]
    fn test_research_fields() {
        let sections = SectionMap {
            abstract_text: "a".repeat(600),
            methodology: "short method ".to_string(),
            results: "r".repeat(500),
            references: vec!["[1] x".to_string(), "[2] y".to_string()],
            ..SectionMap::default()
        };
        let text = "T".repeat(150);
        let out = build(&text, "research paper", &sections);

        let ExtractedFields::Research(fields) = out.extracted_fields else {
            panic!("expected research schema");
        };
        assert_eq!(fields.title.chars().count(), 100);
        assert_eq!(fields.key_sections.abstract_text, format!("{}...", "a".repeat(500)));
        assert_eq!(fields.key_sections.methodology, "short method ");
        assert_eq!(fields.key_sections.key_findings, "r".repeat(500));
        assert_eq!(fields.reference_count, 2);
        assert_eq!(fields.authors, vec!["Jane Doe"]);
        assert_eq!(fields.technologies, vec!["NLP"]);
    }

    #[test]
    fn test_invoice_fields() {
        let out = build("Invoice", "invoice", &SectionMap::default());
        let ExtractedFields::Invoice(fields) = out.extracted_fields else {
            panic!("expected invoice schema");
        };
        assert_eq!(fields.vendor_name, vec!["Acme Corp"]);
        assert_eq!(fields.total_amount, vec!["$1,234.56"]);
        assert!(fields.line_items.is_empty());
    }

    #[test]
    fn test_resume_and_contract_fields() {
        let out = build("cv", "CV", &SectionMap::default());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["extracted_fields"]["contact_info"]["email"][0], "jane@acme.io");
        assert_eq!(json["extracted_fields"]["contact_info"]["phone"][0], "555-123-4567");
        assert!(json["extracted_fields"]["education"].as_array().unwrap().is_empty());

        let out = build("deal", "contract", &SectionMap::default());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["extracted_fields"]["parties"][0], "Acme Corp");
        assert_eq!(json["extracted_fields"]["dates"][0], "2024-01-05");
    }

    #[test]
    fn test_general_fields_omit_empty_kinds() {
        let text = "s".repeat(301);
        let out = build(&text, "article", &SectionMap::default());
        let json = serde_json::to_value(&out).unwrap();

        let key_entities = json["extracted_fields"]["key_entities"].as_object().unwrap();
        assert!(key_entities.contains_key("PERSON"));
        assert!(!key_entities.contains_key("GPE"));
        assert_eq!(
            json["extracted_fields"]["summary"],
            format!("{}...", "s".repeat(300))
        );
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 1000), "short");
        assert!(preview(&"p".repeat(1001), 1000).ends_with("..."));
    }
}
