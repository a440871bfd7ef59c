//! Type-specific structured output

pub mod builder;

pub use builder::{
    preview, truncate_with_marker, DocumentGroup, StructuredOutputBuilder, TRUNCATION_MARKER,
};
