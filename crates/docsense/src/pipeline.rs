//! Document pipeline: model initialisation and the per-request facade
//!
//! `ModelHandles` is built once per process and shared read-only. Every call
//! on `DocumentPipeline` creates its own entity bag, section map and chunk set.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::classification::ZeroShotClassifier;
use crate::config::{DocSenseConfig, EmbeddingBackend, NerBackend, ScorerBackend};
use crate::error::Result;
use crate::extraction::{EntityExtractor, SectionSegmenter};
use crate::generation::{AnswerGenerator, OllamaClient};
use crate::providers::{
    ollama::{OllamaEmbedder, OllamaLlm, OllamaNer},
    patterns::PatternNer,
    zero_shot::EmbeddingZeroShotScorer,
    EmbeddingProvider, GenerationParams, GenerationProvider, NerProvider, ZeroShotScorer,
};
use crate::retrieval::Retriever;
use crate::structuring::{DocumentGroup, StructuredOutputBuilder};
use crate::types::{AnswerOutcome, ClassificationResult, SectionMap, StructuredOutput};

/// The pretrained models, loaded once
#[derive(Clone)]
pub struct ModelHandles {
    pub scorer: Arc<dyn ZeroShotScorer>,
    pub ner: Arc<dyn NerProvider>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: Arc<dyn GenerationProvider>,
}

impl ModelHandles {
    pub fn new(
        scorer: Arc<dyn ZeroShotScorer>,
        ner: Arc<dyn NerProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            scorer,
            ner,
            embedder,
            generator,
        }
    }

    /// Construct every backend named by the configuration
    pub async fn from_config(config: &DocSenseConfig) -> Result<Self> {
        tracing::info!("Initializing models...");

        let ollama = Arc::new(OllamaClient::new(&config.llm)?);

        let embedder: Arc<dyn EmbeddingProvider> = match config.embeddings.backend {
            EmbeddingBackend::Ollama => {
                tracing::info!("Using Ollama embeddings ({})", config.llm.embed_model);
                Arc::new(OllamaEmbedder::from_client(
                    Arc::clone(&ollama),
                    config.embeddings.dimensions,
                ))
            }
            EmbeddingBackend::Onnx => Self::onnx_embedder(config).await?,
        };

        let generator: Arc<dyn GenerationProvider> = Arc::new(OllamaLlm::from_client(
            Arc::clone(&ollama),
            config.llm.generate_model.clone(),
        ));
        tracing::info!("Using Ollama generation ({})", config.llm.generate_model);

        let ner: Arc<dyn NerProvider> = match config.ner.backend {
            NerBackend::Ollama => Arc::new(OllamaNer::new(Arc::clone(&generator))),
            NerBackend::Onnx => Self::onnx_ner(config).await?,
            NerBackend::Patterns => {
                tracing::warn!("Using the rule-based fallback recognizer for entities");
                Arc::new(PatternNer::new())
            }
        };
        tracing::info!("Using NER backend: {}", ner.name());

        let scorer: Arc<dyn ZeroShotScorer> = match config.classification.scorer {
            ScorerBackend::Nli => Self::nli_scorer(config).await?,
            ScorerBackend::Embedding => Arc::new(EmbeddingZeroShotScorer::new(
                Self::scorer_embedder(config, &embedder)?,
                &config.classification,
            )),
        };
        tracing::info!("Using zero-shot scorer: {}", scorer.name());

        if !ollama.health_check().await? {
            tracing::warn!("Ollama not available at {}", ollama.base_url());
        }

        Ok(Self::new(scorer, ner, embedder, generator))
    }

    /// Embedder behind the embedding scorer
    ///
    /// Classification failures are fatal, so Ollama requests on this path are
    /// sent once instead of going through the backoff loop.
    fn scorer_embedder(
        config: &DocSenseConfig,
        embedder: &Arc<dyn EmbeddingProvider>,
    ) -> Result<Arc<dyn EmbeddingProvider>> {
        match config.embeddings.backend {
            EmbeddingBackend::Ollama => {
                let client = Arc::new(OllamaClient::without_retry(&config.llm)?);
                Ok(Arc::new(OllamaEmbedder::from_client(
                    client,
                    config.embeddings.dimensions,
                )))
            }
            EmbeddingBackend::Onnx => Ok(Arc::clone(embedder)),
        }
    }

    #[cfg(feature = "onnx")]
    async fn onnx_embedder(config: &DocSenseConfig) -> Result<Arc<dyn EmbeddingProvider>> {
        let embedder = crate::providers::onnx::OnnxEmbedder::new(&config.embeddings).await?;
        Ok(Arc::new(embedder))
    }

    #[cfg(feature = "onnx")]
    async fn onnx_ner(config: &DocSenseConfig) -> Result<Arc<dyn NerProvider>> {
        let ner = crate::providers::onnx::OnnxNer::new(&config.ner, &config.embeddings.cache_dir)
            .await?;
        Ok(Arc::new(ner))
    }

    #[cfg(feature = "onnx")]
    async fn nli_scorer(config: &DocSenseConfig) -> Result<Arc<dyn ZeroShotScorer>> {
        let scorer = crate::providers::onnx::OnnxNliScorer::new(
            &config.classification,
            &config.embeddings.cache_dir,
        )
        .await?;
        Ok(Arc::new(scorer))
    }

    #[cfg(not(feature = "onnx"))]
    async fn onnx_embedder(_config: &DocSenseConfig) -> Result<Arc<dyn EmbeddingProvider>> {
        Err(onnx_required("embeddings.backend = \"onnx\""))
    }

    #[cfg(not(feature = "onnx"))]
    async fn onnx_ner(_config: &DocSenseConfig) -> Result<Arc<dyn NerProvider>> {
        Err(onnx_required("ner.backend = \"onnx\""))
    }

    #[cfg(not(feature = "onnx"))]
    async fn nli_scorer(_config: &DocSenseConfig) -> Result<Arc<dyn ZeroShotScorer>> {
        Err(onnx_required("classification.scorer = \"nli\""))
    }
}

#[cfg(not(feature = "onnx"))]
fn onnx_required(setting: &str) -> crate::error::Error {
    crate::error::Error::Config(format!("{} requires the `onnx` feature", setting))
}

/// Classification plus structured extraction for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub classification: ClassificationResult,
    pub structured_output: StructuredOutput,
}

/// Runs the pipeline components over caller-owned document text
pub struct DocumentPipeline {
    classifier: ZeroShotClassifier,
    extractor: EntityExtractor,
    segmenter: SectionSegmenter,
    builder: StructuredOutputBuilder,
    answerer: AnswerGenerator,
    low_confidence_threshold: f32,
}

impl DocumentPipeline {
    pub fn new(config: &DocSenseConfig, handles: &ModelHandles) -> Self {
        let retriever = Retriever::new(Arc::clone(&handles.embedder), &config.retrieval);
        Self {
            classifier: ZeroShotClassifier::new(
                Arc::clone(&handles.scorer),
                &config.classification,
            ),
            extractor: EntityExtractor::new(Arc::clone(&handles.ner)),
            segmenter: SectionSegmenter::new(),
            builder: StructuredOutputBuilder::new(),
            answerer: AnswerGenerator::new(
                retriever,
                Arc::clone(&handles.generator),
                GenerationParams::from(&config.generation),
            ),
            low_confidence_threshold: config.classification.low_confidence_threshold,
        }
    }

    pub fn low_confidence_threshold(&self) -> f32 {
        self.low_confidence_threshold
    }

    pub async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.classifier.classify(text).await
    }

    /// Extract entities (and sections for research documents) and build the schema
    pub async fn structure(&self, text: &str, doc_type: &str) -> Result<StructuredOutput> {
        let entities = self.extractor.extract(text, doc_type).await?;
        let sections = if DocumentGroup::of(doc_type).needs_sections() {
            self.segmenter.segment(text)
        } else {
            SectionMap::default()
        };
        Ok(self.builder.build(text, doc_type, &entities, &sections))
    }

    /// Classify, then structure using the classified label
    pub async fn analyze(&self, text: &str) -> Result<DocumentAnalysis> {
        let classification = self.classify(text).await?;
        if classification.is_low_confidence(self.low_confidence_threshold) {
            tracing::warn!(
                "Low confidence in classification ({:.2})",
                classification.confidence
            );
        }
        let structured_output = self.structure(text, &classification.label).await?;
        Ok(DocumentAnalysis {
            classification,
            structured_output,
        })
    }

    pub async fn answer(&self, question: &str, text: &str) -> Result<AnswerOutcome> {
        self.answerer.generate(question, text).await
    }

    /// Answer rendered as the user-facing string, sentinels included
    pub async fn ask(&self, question: &str, text: &str) -> Result<String> {
        self.answerer.answer(question, text).await
    }
}
