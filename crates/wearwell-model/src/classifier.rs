//! Trained classifier artifacts: lazy load and probability scoring.
//!
//! The artifact declares its shape up front via a `kind` tag, so the call
//! contract is fixed once at load time:
//! - `"pipeline"` accepts raw text (tf-idf term weights + logistic model);
//!   term weights live inline or in the separate vectorizer artifact.
//! - `"vector"` requires an externally composed feature vector.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::Deserialize;

use crate::error::ModelError;

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sparse tf-idf term weights: token -> column index, plus per-column idf.
#[derive(Debug, Deserialize)]
pub struct TermWeights {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TermWeights {
    #[must_use]
    pub fn width(&self) -> usize {
        self.idf.len()
    }

    /// Map text to a dense tf-idf vector using prediction-path tokenization.
    #[must_use]
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut features = vec![0.0_f64; self.idf.len()];
        for token in wearwell_core::text::predict_tokens(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                features[index] += self.idf[index];
            }
        }
        features
    }

    fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotReady(format!(
                "vectorizer missing at {}",
                path.display()
            )));
        }
        let raw = std::fs::read(path)
            .map_err(|e| ModelError::NotReady(format!("unable to read vectorizer: {e}")))?;
        let weights: TermWeights = serde_json::from_slice(&raw)
            .map_err(|e| ModelError::NotReady(format!("unable to parse vectorizer: {e}")))?;
        weights.validate()?;
        Ok(weights)
    }

    fn validate(&self) -> Result<(), ModelError> {
        for (token, &index) in &self.vocabulary {
            if index >= self.idf.len() {
                return Err(ModelError::NotReady(format!(
                    "vocabulary entry '{token}' points past idf table (index {index}, width {})",
                    self.idf.len()
                )));
            }
        }
        Ok(())
    }
}

/// Logistic regression over a dense feature vector.
#[derive(Debug, Deserialize)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    #[must_use]
    pub fn input_width(&self) -> usize {
        self.coefficients.len()
    }

    /// Probability distribution over `{0, 1}`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Prediction`] when the feature width does not match
    /// the trained coefficient width.
    pub fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::Prediction(format!(
                "feature vector has width {}, classifier expects {}",
                features.len(),
                self.coefficients.len()
            )));
        }
        let score: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        let p1 = sigmoid(score);
        Ok([1.0 - p1, p1])
    }
}

/// On-disk classifier artifact, tagged by capability.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ClassifierArtifact {
    Pipeline {
        #[serde(default)]
        vectorizer: Option<TermWeights>,
        coefficients: Vec<f64>,
        intercept: f64,
    },
    Vector {
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

/// A loaded classifier with its call shape decided at load time.
#[derive(Debug)]
pub enum Classifier {
    /// End-to-end pipeline: raw text in, probabilities out.
    Pipeline { vectorizer: TermWeights, model: LinearModel },
    /// Requires a separately composed feature vector.
    Vector(LinearModel),
}

impl Classifier {
    /// Whether the direct-text call is available.
    #[must_use]
    pub fn accepts_text(&self) -> bool {
        matches!(self, Classifier::Pipeline { .. })
    }

    /// Feature width expected by the vector call.
    #[must_use]
    pub fn expected_input_width(&self) -> usize {
        match self {
            Classifier::Pipeline { model, .. } | Classifier::Vector(model) => model.input_width(),
        }
    }

    /// Direct-text probability call.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Prediction`] for vector-shaped classifiers, which
    /// refuse raw text, or when the underlying model call fails.
    pub fn predict_proba_text(&self, text: &str) -> Result<[f64; 2], ModelError> {
        match self {
            Classifier::Pipeline { vectorizer, model } => {
                model.predict_proba(&vectorizer.transform(text))
            }
            Classifier::Vector(_) => Err(ModelError::Prediction(
                "classifier requires a composed feature vector".to_string(),
            )),
        }
    }

    /// Vector-input probability call.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Prediction`] on feature width mismatch.
    pub fn predict_proba_vector(&self, features: &[f64]) -> Result<[f64; 2], ModelError> {
        match self {
            Classifier::Pipeline { model, .. } | Classifier::Vector(model) => {
                model.predict_proba(features)
            }
        }
    }

    fn load(classifier_path: &Path, vectorizer_path: &Path) -> Result<Self, ModelError> {
        if !classifier_path.exists() {
            return Err(ModelError::NotReady(format!(
                "classifier missing at {}",
                classifier_path.display()
            )));
        }
        let raw = std::fs::read(classifier_path)
            .map_err(|e| ModelError::NotReady(format!("unable to read classifier: {e}")))?;
        let artifact: ClassifierArtifact = serde_json::from_slice(&raw)
            .map_err(|e| ModelError::NotReady(format!("unable to parse classifier: {e}")))?;

        match artifact {
            ClassifierArtifact::Pipeline {
                vectorizer,
                coefficients,
                intercept,
            } => {
                let vectorizer = match vectorizer {
                    Some(weights) => {
                        weights.validate()?;
                        weights
                    }
                    None => TermWeights::load(vectorizer_path)?,
                };
                if coefficients.len() != vectorizer.width() {
                    return Err(ModelError::NotReady(format!(
                        "classifier width {} does not match vectorizer width {}",
                        coefficients.len(),
                        vectorizer.width()
                    )));
                }
                Ok(Classifier::Pipeline {
                    vectorizer,
                    model: LinearModel {
                        coefficients,
                        intercept,
                    },
                })
            }
            ClassifierArtifact::Vector {
                coefficients,
                intercept,
            } => Ok(Classifier::Vector(LinearModel {
                coefficients,
                intercept,
            })),
        }
    }
}

/// Lazily loads the classifier artifact (and, for pipeline artifacts without
/// inline term weights, the separate vectorizer artifact), at most once per
/// process. The outcome is cached, successful or not.
pub struct ClassifierProvider {
    classifier_path: PathBuf,
    vectorizer_path: PathBuf,
    cell: OnceLock<Result<Arc<Classifier>, ModelError>>,
}

impl ClassifierProvider {
    #[must_use]
    pub fn new(classifier_path: impl Into<PathBuf>, vectorizer_path: impl Into<PathBuf>) -> Self {
        Self {
            classifier_path: classifier_path.into(),
            vectorizer_path: vectorizer_path.into(),
            cell: OnceLock::new(),
        }
    }

    /// Get the loaded classifier, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotReady`] if an artifact is missing or fails to
    /// deserialize; the same error is returned on every subsequent call.
    pub fn get(&self) -> Result<Arc<Classifier>, ModelError> {
        self.cell
            .get_or_init(|| {
                let loaded =
                    Classifier::load(&self.classifier_path, &self.vectorizer_path).map(Arc::new);
                match &loaded {
                    Ok(classifier) => tracing::info!(
                        path = %self.classifier_path.display(),
                        accepts_text = classifier.accepts_text(),
                        "classifier loaded"
                    ),
                    Err(e) => tracing::warn!(error = %e, "classifier unavailable"),
                }
                loaded
            })
            .clone()
    }
}
