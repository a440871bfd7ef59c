//! Entity and section extraction

pub mod entities;
pub mod sections;

pub use entities::{EntityExtractor, TECH_TERMS};
pub use sections::SectionSegmenter;
