use serde::Serialize;

/// Which rung of the degradation ladder produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    /// A trained classifier artifact (direct text or composed features).
    Backend,
    /// The deterministic keyword heuristic.
    Fallback,
}

/// Binary "would recommend" label with confidence.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub prediction: u8,
    pub confidence: f64,
    pub source: PredictionSource,
}

/// On-disk availability of the three model artifacts, as reported by the
/// health endpoint. Existence checks only; nothing is loaded.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ArtifactStatus {
    pub fasttext: bool,
    pub classifier: bool,
    pub tfidf_vectorizer: bool,
}
