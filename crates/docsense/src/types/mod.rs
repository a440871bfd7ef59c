//! Core types for the document pipeline

pub mod answer;
pub mod chunk;
pub mod classification;
pub mod entity;
pub mod section;
pub mod structured;

pub use answer::AnswerOutcome;
pub use chunk::RetrievedChunk;
pub use classification::{ClassificationResult, LabelScore};
pub use entity::{EntityBag, EntityKind};
pub use section::{SectionKind, SectionMap};
pub use structured::{ExtractedFields, StructuredOutput};
