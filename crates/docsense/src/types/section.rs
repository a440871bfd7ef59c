//! Section kinds and the accumulated section map

use serde::{Deserialize, Serialize};

/// Semantic section of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Abstract,
    Introduction,
    Methodology,
    Results,
    Conclusion,
    References,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Abstract => "abstract",
            SectionKind::Introduction => "introduction",
            SectionKind::Methodology => "methodology",
            SectionKind::Results => "results",
            SectionKind::Conclusion => "conclusion",
            SectionKind::References => "references",
        }
    }
}

/// Text gathered under each section header
///
/// Prose sections hold their body lines joined with a trailing space each;
/// references hold distinct trimmed lines in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMap {
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub introduction: String,
    pub methodology: String,
    pub results: String,
    pub conclusion: String,
    pub references: Vec<String>,
}

impl SectionMap {
    /// Accumulated text of a prose section (empty for references)
    pub fn text(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::Abstract => &self.abstract_text,
            SectionKind::Introduction => &self.introduction,
            SectionKind::Methodology => &self.methodology,
            SectionKind::Results => &self.results,
            SectionKind::Conclusion => &self.conclusion,
            SectionKind::References => "",
        }
    }

    /// Append one body line to `kind`
    pub(crate) fn push_line(&mut self, kind: SectionKind, line: &str) {
        let target = match kind {
            SectionKind::Abstract => &mut self.abstract_text,
            SectionKind::Introduction => &mut self.introduction,
            SectionKind::Methodology => &mut self.methodology,
            SectionKind::Results => &mut self.results,
            SectionKind::Conclusion => &mut self.conclusion,
            SectionKind::References => {
                let reference = line.trim();
                if !self.references.iter().any(|r| r == reference) {
                    self.references.push(reference.to_string());
                }
                return;
            }
        };
        target.push_str(line);
        target.push(' ');
    }

    /// Number of distinct reference lines
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abstract_text.is_empty()
            && self.introduction.is_empty()
            && self.methodology.is_empty()
            && self.results.is_empty()
            && self.conclusion.is_empty()
            && self.references.is_empty()
    }
}
