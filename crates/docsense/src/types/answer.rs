//! Outcome of a question-answering call

use serde::{Deserialize, Serialize};
use std::fmt;

/// Returned when the document text is empty
pub const NO_CONTENT_MESSAGE: &str = "No content to answer from.";

/// Returned when the generation model fails
pub const GENERATION_FALLBACK_MESSAGE: &str =
    "I couldn't generate an answer. Please try a different question.";

/// Guidance shown next to a soft-failure answer
pub const SOFT_FAILURE_HINT: &str = "Try asking about specific content in the document, \
    like 'What is the main topic?' or 'What technologies are discussed?'";

const SOFT_FAILURE_MARKERS: [&str; 2] = ["couldn't generate", "No content"];

/// Result of answering one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// Generated text, verbatim from the model
    Answered { text: String },
    /// The document had no text
    NoContent,
    /// The generation model failed
    Failed { reason: String },
}

impl AnswerOutcome {
    /// Text shown to the user; failures render as the fixed sentinels
    pub fn text(&self) -> &str {
        match self {
            AnswerOutcome::Answered { text } => text,
            AnswerOutcome::NoContent => NO_CONTENT_MESSAGE,
            AnswerOutcome::Failed { .. } => GENERATION_FALLBACK_MESSAGE,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            AnswerOutcome::Answered { text } => text,
            other => other.text().to_string(),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, AnswerOutcome::Answered { .. })
    }

    /// Whether a rendered answer carries one of the soft-failure sentinels
    pub fn is_soft_failure(answer: &str) -> bool {
        SOFT_FAILURE_MARKERS.iter().any(|marker| answer.contains(marker))
    }
}

impl fmt::Display for AnswerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_soft_failures() {
        assert!(AnswerOutcome::is_soft_failure(AnswerOutcome::NoContent.text()));
        let failed = AnswerOutcome::Failed {
            reason: "timeout".to_string(),
        };
        assert!(AnswerOutcome::is_soft_failure(&failed.to_string()));
        assert!(!AnswerOutcome::is_soft_failure("The total is $1,234.56"));
    }

    #[test]
    fn test_answered_text_is_verbatim() {
        let outcome = AnswerOutcome::Answered {
            text: "  spaced  ".to_string(),
        };
        assert!(outcome.is_answered());
        assert_eq!(outcome.into_text(), "  spaced  ");
    }
}
