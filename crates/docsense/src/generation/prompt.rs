//! Prompt templates for grounded generation

/// Prompt builder for document questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Instruction, question, then the retrieved context
    pub fn build_grounded_prompt(question: &str, context: &str) -> String {
        format!(
            "Answer this question based only on the context: {question}\nContext: {context}",
            question = question,
            context = context
        )
    }
}
