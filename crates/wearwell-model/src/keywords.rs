//! Deterministic keyword heuristic — the last rung of the degradation ladder.

use wearwell_core::text::predict_tokens;

use crate::classifier::sigmoid;
use crate::types::{Prediction, PredictionSource};

const POSITIVE_KEYWORDS: &[&str] = &[
    "amazing",
    "beautiful",
    "best",
    "comfortable",
    "excellent",
    "favorite",
    "great",
    "love",
    "perfect",
    "recommend",
    "stylish",
    "wonderful",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "awful",
    "bad",
    "cheap",
    "disappointing",
    "horrible",
    "poor",
    "return",
    "terrible",
    "uncomfortable",
    "waste",
    "worst",
];

/// Score review text with the fixed sentiment keyword bag.
///
/// `score = positives - negatives + (rating - 3) / 1.5` (the rating term is 0
/// when absent), squashed through a logistic. Class 1 iff probability >= 0.5;
/// confidence is the probability of the predicted class. Pure: the same text
/// and rating always produce the same prediction.
#[must_use]
pub fn heuristic_prediction(review_text: &str, rating: Option<f64>) -> Prediction {
    let tokens = predict_tokens(review_text);

    let positive = tokens
        .iter()
        .filter(|t| POSITIVE_KEYWORDS.contains(&t.as_str()))
        .count();
    let negative = tokens
        .iter()
        .filter(|t| NEGATIVE_KEYWORDS.contains(&t.as_str()))
        .count();

    let rating_adjustment = rating.map_or(0.0, |r| (r - 3.0) / 1.5);

    #[allow(clippy::cast_precision_loss)]
    let score = positive as f64 - negative as f64 + rating_adjustment;
    let probability = sigmoid(score);
    let prediction = u8::from(probability >= 0.5);
    let confidence = if prediction == 1 {
        probability
    } else {
        1.0 - probability
    };

    Prediction {
        prediction,
        confidence,
        source: PredictionSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_negative_keywords_without_rating() {
        // terrible + waste -> score = -2, p = sigmoid(-2) ~= 0.119
        let result = heuristic_prediction("terrible waste", None);
        assert_eq!(result.prediction, 0);
        assert!(
            (result.confidence - 0.8808).abs() < 1e-3,
            "expected confidence ~0.881, got {}",
            result.confidence
        );
        assert_eq!(result.source, PredictionSource::Fallback);
    }

    #[test]
    fn positive_keywords_predict_recommend() {
        let result = heuristic_prediction("great fit, love it", None);
        assert_eq!(result.prediction, 1);
        assert!(result.confidence > 0.5);
    }

    #[test]
    fn neutral_text_without_rating_ties_to_recommend() {
        // score = 0 -> p = 0.5, and 0.5 >= 0.5 predicts class 1
        let result = heuristic_prediction("the quick brown fox", None);
        assert_eq!(result.prediction, 1);
        assert!((result.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn low_rating_pushes_negative() {
        // rating 1 -> adjustment (1 - 3) / 1.5 = -1.333
        let result = heuristic_prediction("the quick brown fox", Some(1.0));
        assert_eq!(result.prediction, 0);
    }

    #[test]
    fn high_rating_offsets_negative_keyword() {
        // bad (-1) + (5 - 3) / 1.5 = +0.333 -> recommend
        let result = heuristic_prediction("bad color though", Some(5.0));
        assert_eq!(result.prediction, 1);
    }

    #[test]
    fn heuristic_is_deterministic() {
        let a = heuristic_prediction("terrible waste", Some(2.0));
        let b = heuristic_prediction("terrible waste", Some(2.0));
        assert_eq!(a.prediction, b.prediction);
        assert!((a.confidence - b.confidence).abs() < 1e-15);
    }

    #[test]
    fn punctuation_does_not_hide_keywords() {
        let result = heuristic_prediction("Terrible!! WASTE...", None);
        assert_eq!(result.prediction, 0);
    }
}
