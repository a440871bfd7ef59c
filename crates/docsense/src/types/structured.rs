//! Type-specific structured output schemas

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entity::EntityKind;

/// Structured extraction for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredOutput {
    /// Canonical group name (or the raw label for research and general documents)
    pub document_type: String,
    pub extracted_fields: ExtractedFields,
}

/// Schema variant selected by document type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractedFields {
    Research(ResearchFields),
    Invoice(InvoiceFields),
    Resume(ResumeFields),
    Contract(ContractFields),
    General(GeneralFields),
}

/// Whitepapers, research papers and technical reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchFields {
    pub title: String,
    pub authors: Vec<String>,
    pub organizations: Vec<String>,
    pub publication_date: Vec<String>,
    pub technologies: Vec<String>,
    pub key_sections: KeySections,
    pub reference_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySections {
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub methodology: String,
    pub key_findings: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceFields {
    pub vendor_name: Vec<String>,
    pub invoice_date: Vec<String>,
    pub total_amount: Vec<String>,
    /// Always empty: table extraction is not performed
    pub line_items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeFields {
    pub candidate_name: Vec<String>,
    pub contact_info: ContactInfo,
    pub skills: Vec<String>,
    /// Always empty
    pub education: Vec<serde_json::Value>,
    /// Always empty
    pub work_experience: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Vec<String>,
    pub phone: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractFields {
    pub parties: Vec<String>,
    pub dates: Vec<String>,
    /// Always empty
    pub key_clauses: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralFields {
    /// Only kinds with at least one value
    pub key_entities: BTreeMap<EntityKind, Vec<String>>,
    pub summary: String,
}
