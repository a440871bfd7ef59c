//! Zero-shot document-type classification

pub mod classifier;

pub use classifier::{ZeroShotClassifier, CANDIDATE_LABELS};
