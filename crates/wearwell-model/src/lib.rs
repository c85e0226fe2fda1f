//! Recommendation prediction for review text.
//!
//! Loads word-embedding and classifier artifacts lazily (once per process),
//! composes feature vectors when the classifier cannot consume raw text, and
//! degrades to a deterministic keyword heuristic when artifacts are missing.

pub mod classifier;
pub mod embedding;
pub mod error;
pub mod features;
pub mod keywords;
pub mod pipeline;
pub mod types;

pub use classifier::ClassifierProvider;
pub use embedding::EmbeddingProvider;
pub use error::ModelError;
pub use pipeline::{ModelPaths, PredictionPipeline};
pub use types::{ArtifactStatus, Prediction, PredictionSource};
