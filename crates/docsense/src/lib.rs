//! docsense: document classification, structured extraction, and grounded Q&A
//!
//! This crate takes the plain text of a single document and produces a
//! zero-shot document-type classification, a type-specific structured
//! extraction of entities and sections, and retrieval-augmented answers to
//! questions about the document. All models are fixed, pretrained black boxes
//! reached through the traits in [`providers`].

pub mod classification;
pub mod config;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod structuring;
pub mod types;

pub use config::DocSenseConfig;
pub use error::{Error, Result};
pub use pipeline::{DocumentAnalysis, DocumentPipeline, ModelHandles};
pub use types::{
    answer::AnswerOutcome,
    classification::{ClassificationResult, LabelScore},
    entity::{EntityBag, EntityKind},
    section::{SectionKind, SectionMap},
    structured::{ExtractedFields, StructuredOutput},
};
