//! The prediction degradation ladder.
//!
//! Three rungs, attempted in strict order, never cycling back:
//! 1. direct-text call on the loaded classifier,
//! 2. composed feature vector (embeddings + auxiliary scalars) on the same
//!    classifier,
//! 3. deterministic keyword heuristic.
//!
//! Missing or corrupt artifacts surface as the distinguished `NotReady`
//! condition and drop straight to the heuristic; they never fail a request.

use std::path::PathBuf;

use crate::classifier::ClassifierProvider;
use crate::embedding::EmbeddingProvider;
use crate::error::ModelError;
use crate::features::compose;
use crate::keywords::heuristic_prediction;
use crate::types::{ArtifactStatus, Prediction, PredictionSource};

/// File locations of the three model artifacts.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub embeddings: PathBuf,
    pub classifier: PathBuf,
    pub vectorizer: PathBuf,
}

pub struct PredictionPipeline {
    embeddings: EmbeddingProvider,
    classifier: ClassifierProvider,
    paths: ModelPaths,
}

impl PredictionPipeline {
    #[must_use]
    pub fn new(paths: ModelPaths) -> Self {
        Self {
            embeddings: EmbeddingProvider::new(&paths.embeddings),
            classifier: ClassifierProvider::new(&paths.classifier, &paths.vectorizer),
            paths,
        }
    }

    /// Artifact presence for the health endpoint. Checks the file system only;
    /// nothing is loaded or cached here.
    #[must_use]
    pub fn artifact_status(&self) -> ArtifactStatus {
        ArtifactStatus {
            fasttext: self.paths.embeddings.exists(),
            classifier: self.paths.classifier.exists(),
            tfidf_vectorizer: self.paths.vectorizer.exists(),
        }
    }

    /// Generate a recommendation label for the provided review text.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] when the text is empty after
    /// trimming. Artifact unavailability never errors; it degrades to the
    /// keyword heuristic.
    pub fn predict(
        &self,
        review_text: &str,
        rating: Option<f64>,
    ) -> Result<Prediction, ModelError> {
        let text = review_text.trim();
        if text.is_empty() {
            return Err(ModelError::InvalidInput(
                "reviewText must be a non-empty string".to_string(),
            ));
        }

        let classifier = match self.classifier.get() {
            Ok(classifier) => classifier,
            Err(e) => {
                tracing::warn!(error = %e, "classifier unavailable, using keyword fallback");
                return Ok(heuristic_prediction(text, rating));
            }
        };

        if classifier.accepts_text() {
            match classifier.predict_proba_text(text) {
                Ok(proba) => return Ok(backend_prediction(proba)),
                Err(e) => {
                    tracing::warn!(error = %e, "direct text call failed, composing features");
                }
            }
        }

        let embeddings = match self.embeddings.get() {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!(error = %e, "embedding model unavailable, using keyword fallback");
                return Ok(heuristic_prediction(text, rating));
            }
        };

        let features = compose(text, rating, classifier.expected_input_width(), &embeddings);
        match classifier.predict_proba_vector(&features) {
            Ok(proba) => Ok(backend_prediction(proba)),
            Err(e) => {
                tracing::error!(error = %e, "vectorized call failed, using keyword fallback");
                Ok(heuristic_prediction(text, rating))
            }
        }
    }
}

fn backend_prediction(proba: [f64; 2]) -> Prediction {
    let prediction = u8::from(proba[1] > proba[0]);
    Prediction {
        prediction,
        confidence: proba[usize::from(prediction)],
        source: PredictionSource::Backend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn paths_in(dir: &Path) -> ModelPaths {
        ModelPaths {
            embeddings: dir.join("fasttext_embeddings.json"),
            classifier: dir.join("classifier.json"),
            vectorizer: dir.join("tfidf_vectorizer.json"),
        }
    }

    fn write(path: &Path, body: &serde_json::Value) {
        std::fs::write(path, body.to_string()).expect("write artifact");
    }

    #[test]
    fn empty_text_is_invalid_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = PredictionPipeline::new(paths_in(dir.path()));
        let err = pipeline.predict("   ", Some(5.0)).expect_err("empty text");
        assert!(matches!(err, ModelError::InvalidInput(_)));
    }

    #[test]
    fn no_artifacts_falls_back_to_heuristic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = PredictionPipeline::new(paths_in(dir.path()));

        let result = pipeline.predict("terrible waste", None).expect("fallback");
        assert_eq!(result.source, PredictionSource::Fallback);
        assert_eq!(result.prediction, 0);
        assert!((result.confidence - 0.8808).abs() < 1e-3);
    }

    #[test]
    fn fallback_is_deterministic_for_fixed_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = PredictionPipeline::new(paths_in(dir.path()));

        let a = pipeline.predict("lovely but runs small", Some(4.0)).unwrap();
        let b = pipeline.predict("lovely but runs small", Some(4.0)).unwrap();
        assert_eq!(a.prediction, b.prediction);
        assert!((a.confidence - b.confidence).abs() < 1e-15);
    }

    #[test]
    fn pipeline_classifier_answers_directly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = paths_in(dir.path());
        write(
            &paths.classifier,
            &json!({
                "kind": "pipeline",
                "vectorizer": { "vocabulary": { "great": 0 }, "idf": [1.0] },
                "coefficients": [3.0],
                "intercept": 0.0
            }),
        );
        let pipeline = PredictionPipeline::new(paths);

        let result = pipeline.predict("great great great", None).expect("direct");
        assert_eq!(result.source, PredictionSource::Backend);
        assert_eq!(result.prediction, 1);
    }

    #[test]
    fn vector_classifier_uses_composed_features() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = paths_in(dir.path());
        write(
            &paths.embeddings,
            &json!({ "dim": 2, "vectors": { "great": [2.0, 0.0], "bad": [-2.0, 0.0] } }),
        );
        // Width 2 matches the embedding dim exactly, so the pooled vector is
        // used unchanged; weight on the first component decides the class.
        write(
            &paths.classifier,
            &json!({ "kind": "vector", "coefficients": [1.5, 0.0], "intercept": 0.0 }),
        );
        let pipeline = PredictionPipeline::new(paths);

        let result = pipeline.predict("great", None).expect("vectorized");
        assert_eq!(result.source, PredictionSource::Backend);
        assert_eq!(result.prediction, 1);

        let result = pipeline.predict("bad", None).expect("vectorized");
        assert_eq!(result.source, PredictionSource::Backend);
        assert_eq!(result.prediction, 0);
    }

    #[test]
    fn vector_classifier_without_embeddings_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = paths_in(dir.path());
        write(
            &paths.classifier,
            &json!({ "kind": "vector", "coefficients": [1.0, 1.0], "intercept": 0.0 }),
        );
        let pipeline = PredictionPipeline::new(paths);

        let result = pipeline.predict("terrible waste", None).expect("fallback");
        assert_eq!(result.source, PredictionSource::Fallback);
    }

    #[test]
    fn artifact_status_reflects_files_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = paths_in(dir.path());
        write(&paths.classifier, &json!({ "kind": "vector", "coefficients": [], "intercept": 0.0 }));
        let pipeline = PredictionPipeline::new(paths);

        let status = pipeline.artifact_status();
        assert!(!status.fasttext);
        assert!(status.classifier);
        assert!(!status.tfidf_vectorizer);
    }

    #[test]
    fn backend_prediction_picks_argmax() {
        let result = backend_prediction([0.3, 0.7]);
        assert_eq!(result.prediction, 1);
        assert!((result.confidence - 0.7).abs() < 1e-12);

        let result = backend_prediction([0.9, 0.1]);
        assert_eq!(result.prediction, 0);
        assert!((result.confidence - 0.9).abs() < 1e-12);
    }
}
