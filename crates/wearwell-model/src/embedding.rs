//! Word-embedding model: lazy load, token lookup, mean pooling.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::Deserialize;

use crate::error::ModelError;

/// Fixed-dimension word embeddings exported as JSON:
/// `{ "dim": N, "vectors": { token: [f32; N] } }`.
#[derive(Debug, Deserialize)]
pub struct EmbeddingModel {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingModel {
    /// Configured vector dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Look up a single token. Out-of-vocabulary tokens are absent, not errors.
    #[must_use]
    pub fn embed(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(Vec::as_slice)
    }

    /// Component-wise arithmetic mean over the in-vocabulary tokens, in input
    /// order. Tokens absent from the vocabulary are skipped entirely. Returns
    /// the zero vector of `dim` when no token matches (including empty input).
    #[must_use]
    pub fn pool(&self, tokens: &[String]) -> Vec<f32> {
        let mut sum = vec![0.0_f32; self.dim];
        let mut found = 0_usize;

        for token in tokens {
            if let Some(vector) = self.embed(token) {
                for (acc, component) in sum.iter_mut().zip(vector) {
                    *acc += component;
                }
                found += 1;
            }
        }

        if found > 0 {
            #[allow(clippy::cast_precision_loss)]
            let n = found as f32;
            for component in &mut sum {
                *component /= n;
            }
        }
        sum
    }

    fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotReady(format!(
                "embedding model missing at {}",
                path.display()
            )));
        }

        let raw = std::fs::read(path).map_err(|e| {
            ModelError::NotReady(format!("unable to read embedding model: {e}"))
        })?;
        let model: EmbeddingModel = serde_json::from_slice(&raw).map_err(|e| {
            ModelError::NotReady(format!("unable to parse embedding model: {e}"))
        })?;

        for (token, vector) in &model.vectors {
            if vector.len() != model.dim {
                return Err(ModelError::NotReady(format!(
                    "embedding for '{token}' has width {}, expected {}",
                    vector.len(),
                    model.dim
                )));
            }
        }

        Ok(model)
    }
}

/// Lazily loads the embedding artifact, at most once per process.
///
/// The outcome — loaded model or `NotReady` — is cached; repeated calls after
/// a failure re-return the same condition without re-attempting disk I/O.
pub struct EmbeddingProvider {
    path: PathBuf,
    cell: OnceLock<Result<Arc<EmbeddingModel>, ModelError>>,
}

impl EmbeddingProvider {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }

    /// Get the loaded model, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotReady`] if the artifact is missing or fails to
    /// deserialize; the same error is returned on every subsequent call.
    pub fn get(&self) -> Result<Arc<EmbeddingModel>, ModelError> {
        self.cell
            .get_or_init(|| {
                let loaded = EmbeddingModel::load(&self.path).map(Arc::new);
                match &loaded {
                    Ok(model) => {
                        tracing::info!(path = %self.path.display(), dim = model.dim(), "embedding model loaded");
                    }
                    Err(e) => tracing::warn!(error = %e, "embedding model unavailable"),
                }
                loaded
            })
            .clone()
    }
}
