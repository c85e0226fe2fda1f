use thiserror::Error;

/// Errors from model loading and prediction.
///
/// `Clone` because a failed load outcome is cached in a once-cell and handed
/// back to every subsequent caller without re-touching disk.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// A required artifact is missing from its expected location or failed to
    /// deserialize. Callers degrade gracefully on this variant instead of
    /// treating it as fatal.
    #[error("model not ready: {0}")]
    NotReady(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A loaded model failed at call time.
    #[error("prediction failed: {0}")]
    Prediction(String),
}

impl ModelError {
    #[must_use]
    pub fn is_not_ready(&self) -> bool {
        matches!(self, ModelError::NotReady(_))
    }
}
