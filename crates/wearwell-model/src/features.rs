//! Feature composition for vector-input classifiers.

use wearwell_core::text::predict_tokens;

use crate::embedding::EmbeddingModel;

/// Build the feature vector a vector-input classifier expects.
///
/// The base is the pooled embedding of the prediction-path tokens. When the
/// base width already equals `expected_width` it is returned unchanged.
/// Otherwise auxiliary scalars are appended in fixed order — normalized rating
/// (`rating / 5`, omitted when absent), token count, unique-token ratio — and
/// the result is truncated to `expected_width` (tail dropped silently, possibly
/// mid-auxiliary) or zero-padded up to it. The trained classifier's exact input
/// contract is not statically known here; this reconciliation keeps the call
/// shape-compatible either way.
#[must_use]
pub fn compose(
    text: &str,
    rating: Option<f64>,
    expected_width: usize,
    embeddings: &EmbeddingModel,
) -> Vec<f64> {
    let tokens = predict_tokens(text);
    let mut features: Vec<f64> = embeddings.pool(&tokens).iter().map(|&c| f64::from(c)).collect();

    if features.len() == expected_width {
        return features;
    }

    if let Some(rating) = rating {
        features.push(rating / 5.0);
    }

    let token_count = tokens.len();
    #[allow(clippy::cast_precision_loss)]
    features.push(token_count as f64);

    let unique_ratio = if token_count == 0 {
        0.0
    } else {
        let mut distinct = tokens.clone();
        distinct.sort_unstable();
        distinct.dedup();
        #[allow(clippy::cast_precision_loss)]
        {
            distinct.len() as f64 / token_count as f64
        }
    };
    features.push(unique_ratio);

    features.truncate(expected_width);
    features.resize(expected_width, 0.0);
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    use crate::embedding::EmbeddingProvider;

    fn model_with_dim_three(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("fasttext_embeddings.json");
        let body = json!({
            "dim": 3,
            "vectors": { "great": [1.0, 2.0, 3.0], "dress": [3.0, 2.0, 1.0] }
        });
        std::fs::write(&path, body.to_string()).expect("write embedding artifact");
        path
    }

    #[test]
    fn exact_width_returns_base_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = EmbeddingProvider::new(model_with_dim_three(dir.path()))
            .get()
            .expect("model loads");

        let features = compose("great dress", Some(5.0), 3, &model);
        assert_eq!(features, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn appends_auxiliary_scalars_in_fixed_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = EmbeddingProvider::new(model_with_dim_three(dir.path()))
            .get()
            .expect("model loads");

        // 3 embedding components + rating/5 + token count + unique ratio
        let features = compose("great great dress", Some(4.0), 6, &model);
        assert_eq!(features.len(), 6);
        assert!((features[3] - 0.8).abs() < 1e-12, "normalized rating");
        assert!((features[4] - 3.0).abs() < 1e-12, "token count");
        assert!((features[5] - 2.0 / 3.0).abs() < 1e-12, "unique ratio");
    }

    #[test]
    fn omits_rating_when_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = EmbeddingProvider::new(model_with_dim_three(dir.path()))
            .get()
            .expect("model loads");

        let features = compose("great dress", None, 5, &model);
        assert_eq!(features.len(), 5);
        assert!((features[3] - 2.0).abs() < 1e-12, "token count follows embedding");
        assert!((features[4] - 1.0).abs() < 1e-12, "unique ratio last");
    }

    #[test]
    fn truncates_tail_including_auxiliary_block() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = EmbeddingProvider::new(model_with_dim_three(dir.path()))
            .get()
            .expect("model loads");

        // Expected width 4 keeps the embedding plus only the first auxiliary.
        let features = compose("great dress", Some(5.0), 4, &model);
        assert_eq!(features, vec![2.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn zero_pads_when_still_short() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = EmbeddingProvider::new(model_with_dim_three(dir.path()))
            .get()
            .expect("model loads");

        let features = compose("great", None, 8, &model);
        assert_eq!(features.len(), 8);
        assert_eq!(&features[5..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_text_yields_zero_base_and_zero_ratio() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = EmbeddingProvider::new(model_with_dim_three(dir.path()))
            .get()
            .expect("model loads");

        let features = compose("", None, 5, &model);
        assert_eq!(features, vec![0.0, 0.0, 0.0, 0.0, 0.0]);
    }
}
