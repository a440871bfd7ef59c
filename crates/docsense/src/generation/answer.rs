//! Retrieval-augmented answering for a single document

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{GenerationParams, GenerationProvider};
use crate::retrieval::Retriever;
use crate::types::AnswerOutcome;

use super::prompt::PromptBuilder;

/// Answers questions from the top-ranked chunks of a document
pub struct AnswerGenerator {
    retriever: Retriever,
    llm: Arc<dyn GenerationProvider>,
    params: GenerationParams,
}

impl AnswerGenerator {
    pub fn new(
        retriever: Retriever,
        llm: Arc<dyn GenerationProvider>,
        params: GenerationParams,
    ) -> Self {
        Self {
            retriever,
            llm,
            params,
        }
    }

    /// Answer `question` from `text`
    ///
    /// Empty text short-circuits to [`AnswerOutcome::NoContent`] without calling
    /// any model. Generation failures become [`AnswerOutcome::Failed`];
    /// retrieval (embedding) failures are returned as errors.
    pub async fn generate(&self, question: &str, text: &str) -> Result<AnswerOutcome> {
        if text.is_empty() {
            return Ok(AnswerOutcome::NoContent);
        }

        let context = self.retriever.context(question, text).await?;
        let prompt = PromptBuilder::build_grounded_prompt(question, &context);

        tracing::info!(
            "Generating answer with {} ({} context chars)",
            self.llm.model(),
            context.len()
        );

        match self.llm.generate(&prompt, &self.params).await {
            Ok(text) => Ok(AnswerOutcome::Answered { text }),
            Err(e) => {
                tracing::warn!("Answer generation failed: {}", e);
                Ok(AnswerOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Like [`generate`](Self::generate), rendered to the user-facing string
    pub async fn answer(&self, question: &str, text: &str) -> Result<String> {
        Ok(self.generate(question, text).await?.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrievalConfig;
    use crate::error::Error;
    use crate::providers::EmbeddingProvider;
    use crate::retrieval::search::tests::BagOfWordsEmbedder;
    use crate::types::answer::{GENERATION_FALLBACK_MESSAGE, NO_CONTENT_MESSAGE};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes its prompt back and counts calls
    #[derive(Default)]
    struct EchoLlm {
        calls: AtomicUsize,
        last_prompt: Mutex<String>,
        last_params: Mutex<Option<GenerationParams>>,
    }

    #[async_trait]
    impl GenerationProvider for EchoLlm {
        async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock() = prompt.to_string();
            *self.last_params.lock() = Some(*params);
            Ok("generated".to_string())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl GenerationProvider for FailingLlm {
        async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
            Err(Error::llm("model crashed"))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("no embedder"))
        }

        fn dimensions(&self) -> usize {
            0
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn generator_with(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn GenerationProvider>,
    ) -> AnswerGenerator {
        let retriever = Retriever::new(embedder, &RetrievalConfig::default());
        AnswerGenerator::new(retriever, llm, GenerationParams::default())
    }

    const DOC: &str = "Acme Corp issued the invoice on January fifth. \
                       The total amount due is one thousand dollars. \
                       Payment is expected within thirty days of receipt. \
                       Late payments incur a small monthly fee";

    #[tokio::test]
    async fn test_empty_text_returns_no_content_without_model_call() {
        let llm = Arc::new(EchoLlm::default());
        let generator = generator_with(Arc::new(FailingEmbedder), llm.clone());

        let answer = generator.answer("What is the total?", "").await.unwrap();
        assert_eq!(answer, NO_CONTENT_MESSAGE);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_prompt_contains_top_three_chunks() {
        let llm = Arc::new(EchoLlm::default());
        let generator = generator_with(Arc::new(BagOfWordsEmbedder), llm.clone());

        let outcome = generator.generate("What is the total amount due?", DOC).await.unwrap();
        assert_eq!(outcome, AnswerOutcome::Answered { text: "generated".to_string() });

        let prompt = llm.last_prompt.lock().clone();
        let expected_prefix = "Answer this question based only on the context: \
                               What is the total amount due?\nContext: ";
        assert!(prompt.starts_with(expected_prefix));
        assert!(prompt.contains("The total amount due is one thousand dollars"));
        let context = prompt.split("\nContext: ").nth(1).unwrap();
        let included = [
            "Acme Corp issued the invoice on January fifth",
            "The total amount due is one thousand dollars",
            "Payment is expected within thirty days of receipt",
            "Late payments incur a small monthly fee",
        ]
        .iter()
        .filter(|chunk| context.contains(*chunk))
        .count();
        assert_eq!(included, 3);

        let params = llm.last_params.lock().unwrap();
        assert_eq!(params.max_length, 200);
        assert!((params.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_generation_failure_becomes_fallback() {
        let generator = generator_with(Arc::new(BagOfWordsEmbedder), Arc::new(FailingLlm));

        let outcome = generator.generate("Who issued it?", DOC).await.unwrap();
        assert!(matches!(
            outcome,
            AnswerOutcome::Failed { ref reason } if reason.contains("model crashed")
        ));
        assert_eq!(outcome.text(), GENERATION_FALLBACK_MESSAGE);
        assert!(AnswerOutcome::is_soft_failure(&outcome.into_text()));
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let generator = generator_with(Arc::new(FailingEmbedder), Arc::new(EchoLlm::default()));
        assert!(generator.answer("Who issued it?", DOC).await.is_err());
    }
}
