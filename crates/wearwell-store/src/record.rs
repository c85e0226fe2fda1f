//! Product records with incrementally maintained aggregates.

use std::collections::BTreeSet;

use serde::Serialize;

pub(crate) const DEFAULT_LABEL: &str = "General";

/// Insertion-ordered frequency counter for small label sets.
///
/// Plurality lookup is a linear scan; ties break toward the first-inserted
/// label, so repeated queries over unchanged counts are stable.
#[derive(Debug, Default, Clone)]
pub(crate) struct LabelCounter(Vec<(String, u32)>);

impl LabelCounter {
    pub(crate) fn bump(&mut self, label: &str) {
        if let Some(entry) = self.0.iter_mut().find(|(known, _)| known == label) {
            entry.1 += 1;
        } else {
            self.0.push((label.to_string(), 1));
        }
    }

    pub(crate) fn plurality(&self) -> Option<&str> {
        let mut best: Option<(&str, u32)> = None;
        for (label, count) in &self.0 {
            let beats = best.is_none_or(|(_, best_count)| *count > best_count);
            if beats {
                best = Some((label, *count));
            }
        }
        best.map(|(label, _)| label)
    }
}

/// Internal representation of a clothing product.
///
/// Aggregates only grow: `recommended_sum <= review_count`,
/// `rating_count <= review_count`, `clothing_ids` and `search_blob` are
/// append-only.
#[derive(Debug, Clone)]
pub(crate) struct ProductRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub clothing_ids: BTreeSet<String>,
    pub category_counter: LabelCounter,
    pub department_counter: LabelCounter,
    pub division_counter: LabelCounter,
    pub review_count: u64,
    pub rating_sum: f64,
    pub rating_count: u64,
    pub recommended_sum: u64,
    pub positive_feedback_sum: i64,
    pub search_blob: String,
}

impl ProductRecord {
    pub(crate) fn new(id: String, title: String, description: String, image_url: String) -> Self {
        Self {
            id,
            title,
            description,
            image_url,
            clothing_ids: BTreeSet::new(),
            category_counter: LabelCounter::default(),
            department_counter: LabelCounter::default(),
            division_counter: LabelCounter::default(),
            review_count: 0,
            rating_sum: 0.0,
            rating_count: 0,
            recommended_sum: 0,
            positive_feedback_sum: 0,
            search_blob: String::new(),
        }
    }

    pub(crate) fn category(&self) -> &str {
        self.category_counter.plurality().unwrap_or(DEFAULT_LABEL)
    }

    pub(crate) fn department(&self) -> &str {
        self.department_counter.plurality().unwrap_or(DEFAULT_LABEL)
    }

    pub(crate) fn division(&self) -> &str {
        self.division_counter.plurality().unwrap_or(DEFAULT_LABEL)
    }

    /// Append lowercased, non-empty parts to the search blob, space-joined.
    /// The blob is never rewritten, only extended.
    pub(crate) fn push_search_text<'a>(&mut self, parts: impl IntoIterator<Item = &'a str>) {
        for part in parts {
            let lowered = part.to_lowercase();
            if lowered.is_empty() {
                continue;
            }
            if !self.search_blob.is_empty() {
                self.search_blob.push(' ');
            }
            self.search_blob.push_str(&lowered);
        }
    }

    /// `ratingSum / ratingCount` to 2 decimals; null until a rating exists.
    pub(crate) fn average_rating(&self) -> Option<f64> {
        #[allow(clippy::cast_precision_loss)]
        (self.rating_count > 0).then(|| round_to(self.rating_sum / self.rating_count as f64, 2))
    }

    /// `recommendedSum / reviewCount` to 3 decimals; null until a review exists.
    pub(crate) fn recommendation_rate(&self) -> Option<f64> {
        #[allow(clippy::cast_precision_loss)]
        (self.review_count > 0)
            .then(|| round_to(self.recommended_sum as f64 / self.review_count as f64, 3))
    }

    pub(crate) fn to_view(&self) -> ProductView {
        ProductView {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category().to_string(),
            department_name: self.department().to_string(),
            division_name: self.division().to_string(),
            image_url: self.image_url.clone(),
            average_rating: self.average_rating(),
            review_count: self.review_count,
            positive_feedback_count: self.positive_feedback_sum,
            recommendation_rate: self.recommendation_rate(),
            clothing_ids: self.clothing_ids.iter().cloned().collect(),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Public, derived view of a product. Computed on read, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub department_name: String,
    pub division_name: String,
    pub image_url: String,
    pub average_rating: Option<f64>,
    pub review_count: u64,
    pub positive_feedback_count: i64,
    pub recommendation_rate: Option<f64>,
    pub clothing_ids: Vec<String>,
}

/// One review, owned exclusively by its product's review list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub title: String,
    pub review_text: String,
    pub rating: Option<f64>,
    pub recommended: u8,
    pub age: Option<i64>,
    pub positive_feedback_count: i64,
    pub clothing_id: Option<String>,
    pub division_name: String,
    pub department_name: String,
    pub category: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProductRecord {
        ProductRecord::new(
            "cozy-sweater".to_string(),
            "Cozy Sweater".to_string(),
            "A warm sweater".to_string(),
            "https://example.com/cozy.jpg".to_string(),
        )
    }

    #[test]
    fn plurality_picks_most_frequent_label() {
        let mut counter = LabelCounter::default();
        counter.bump("Dresses");
        counter.bump("Tops");
        counter.bump("Tops");
        assert_eq!(counter.plurality(), Some("Tops"));
    }

    #[test]
    fn plurality_tie_goes_to_first_inserted() {
        let mut counter = LabelCounter::default();
        counter.bump("Dresses");
        counter.bump("Tops");
        counter.bump("Tops");
        counter.bump("Dresses");
        assert_eq!(counter.plurality(), Some("Dresses"));
    }

    #[test]
    fn plurality_of_empty_counter_is_none() {
        assert_eq!(LabelCounter::default().plurality(), None);
    }

    #[test]
    fn labels_default_to_general_when_uncounted() {
        let product = record();
        assert_eq!(product.category(), "General");
        assert_eq!(product.department(), "General");
        assert_eq!(product.division(), "General");
    }

    #[test]
    fn average_rating_null_without_ratings() {
        let mut product = record();
        assert_eq!(product.average_rating(), None);
        product.review_count = 1;
        // A review without a rating still leaves averageRating null.
        assert_eq!(product.average_rating(), None);
    }

    #[test]
    fn average_rating_rounds_to_two_decimals() {
        let mut product = record();
        product.rating_sum = 5.0 + 4.0 + 4.0;
        product.rating_count = 3;
        assert_eq!(product.average_rating(), Some(4.33));
    }

    #[test]
    fn recommendation_rate_rounds_to_three_decimals() {
        let mut product = record();
        product.review_count = 3;
        product.recommended_sum = 2;
        assert_eq!(product.recommendation_rate(), Some(0.667));
    }

    #[test]
    fn recommendation_rate_null_without_reviews() {
        assert_eq!(record().recommendation_rate(), None);
    }

    #[test]
    fn search_blob_grows_and_lowercases() {
        let mut product = record();
        product.push_search_text(["Cozy Sweater", "", "Warm KNIT"]);
        assert_eq!(product.search_blob, "cozy sweater warm knit");
        product.push_search_text(["more"]);
        assert_eq!(product.search_blob, "cozy sweater warm knit more");
    }

    #[test]
    fn view_serializes_camel_case() {
        let json = serde_json::to_value(record().to_view()).expect("serialize view");
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("reviewCount").is_some());
        assert!(json.get("averageRating").expect("key present").is_null());
        assert_eq!(json["category"], "General");
    }
}
