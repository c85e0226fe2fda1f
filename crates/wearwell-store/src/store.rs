//! CSV dataset ingestion and the catalog query/mutation engine.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use wearwell_core::text::slugify;

use crate::error::StoreError;
use crate::record::{ProductRecord, ProductView, Review, DEFAULT_LABEL};

const DEFAULT_PRODUCT_TITLE: &str = "Unknown Item";
const DEFAULT_REVIEW_TITLE: &str = "Untitled Review";
const DEFAULT_PAGE_SIZE: usize = 12;
const MAX_PAGE_SIZE: i64 = 100;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Anchor for the synthetic back-dated CSV timestamps, so review ordering is
/// reproducible across restarts.
fn base_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .expect("valid date")
        .and_hms_opt(0, 0, 0)
        .expect("valid time")
}

/// One row of the dataset. Every field deserializes as an optional string;
/// numeric interpretation is lenient and happens during ingestion.
#[derive(Debug, Deserialize)]
struct DatasetRow {
    #[serde(rename = "Clothing ID", default)]
    clothing_id: Option<String>,
    #[serde(rename = "Age", default)]
    age: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Review Text", default)]
    review_text: Option<String>,
    #[serde(rename = "Rating", default)]
    rating: Option<String>,
    #[serde(rename = "Recommended IND", default)]
    recommended: Option<String>,
    #[serde(rename = "Positive Feedback Count", default)]
    positive_feedback: Option<String>,
    #[serde(rename = "Division Name", default)]
    division: Option<String>,
    #[serde(rename = "Department Name", default)]
    department: Option<String>,
    #[serde(rename = "Class Name", default)]
    category: Option<String>,
    #[serde(rename = "Clothes Title", default)]
    clothes_title: Option<String>,
    #[serde(rename = "Clothes Description", default)]
    clothes_description: Option<String>,
}

/// Paginated product listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<ProductView>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub available_categories: Vec<String>,
}

/// Product view plus its full review list, newest first.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductView,
    pub reviews: Vec<Review>,
}

/// Compact product entry for front-end dropdowns.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image_url: String,
}

/// A validated user review submission. Unlike CSV rows, the rating is always
/// present on this path.
#[derive(Debug)]
pub struct NewReview {
    pub product_id: String,
    pub title: String,
    pub review_text: String,
    pub rating: f64,
    pub recommended: i64,
    pub age: Option<i64>,
}

/// The in-memory catalog. Built once at startup; `add_review` is the only
/// mutation. First-encounter order of products is retained so that sorting
/// ties break deterministically.
#[derive(Debug)]
pub struct CatalogStore {
    products: HashMap<String, ProductRecord>,
    order: Vec<String>,
    reviews: HashMap<String, Vec<Review>>,
    categories: Vec<String>,
}

impl CatalogStore {
    /// Load the dataset from disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatasetMissing`] when the file does not exist and
    /// [`StoreError::Dataset`] when the CSV is structurally unreadable.
    /// Malformed numeric *values* are not errors; they become absent fields.
    pub fn load_from_path(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::DatasetMissing(path.to_path_buf()));
        }
        let reader = csv::Reader::from_path(path)?;
        let store = Self::ingest(reader)?;
        tracing::info!(
            path = %path.display(),
            products = store.product_count(),
            reviews = store.review_total(),
            "dataset loaded"
        );
        Ok(store)
    }

    /// Build a store from any CSV reader. Used directly by tests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dataset`] when the CSV is structurally unreadable.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        Self::ingest(csv::Reader::from_reader(reader))
    }

    fn ingest<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, StoreError> {
        let mut store = Self {
            products: HashMap::new(),
            order: Vec::new(),
            reviews: HashMap::new(),
            categories: Vec::new(),
        };

        for (index, row) in reader.deserialize::<DatasetRow>().enumerate() {
            store.ingest_row(index, row?);
        }

        let labels: BTreeSet<String> = store
            .products
            .values()
            .map(|p| p.category().to_string())
            .collect();
        store.categories = labels.into_iter().collect();

        Ok(store)
    }

    fn ingest_row(&mut self, index: usize, row: DatasetRow) {
        let title = text_or(row.clothes_title, DEFAULT_PRODUCT_TITLE);
        let description = text_or(row.clothes_description, "");
        let slug = slugify(&title);

        let product = match self.products.entry(slug.clone()) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                self.order.push(slug.clone());
                let image_url = format!("https://source.unsplash.com/featured/?clothing,{slug}");
                entry.insert(ProductRecord::new(slug.clone(), title, description, image_url))
            }
        };

        let category = nonblank_or(row.category, DEFAULT_LABEL);
        let department = nonblank_or(row.department, DEFAULT_LABEL);
        let division = nonblank_or(row.division, DEFAULT_LABEL);
        let clothing_id = text_or(row.clothing_id, "");

        product.category_counter.bump(&category);
        product.department_counter.bump(&department);
        product.division_counter.bump(&division);
        if !clothing_id.is_empty() {
            product.clothing_ids.insert(clothing_id.clone());
        }

        let rating = lenient_float(row.rating.as_deref());
        if let Some(rating) = rating {
            product.rating_sum += rating;
            product.rating_count += 1;
        }

        let recommended = lenient_int(row.recommended.as_deref());
        if recommended == Some(1) {
            product.recommended_sum += 1;
        }

        let positive_feedback = lenient_int(row.positive_feedback.as_deref()).unwrap_or(0);
        product.positive_feedback_sum += positive_feedback;

        let review_text = text_or(row.review_text, "");
        let review_title = nonblank_or(row.title, DEFAULT_REVIEW_TITLE);
        let age = lenient_int(row.age.as_deref());

        #[allow(clippy::cast_possible_wrap)]
        let created_at = (base_date() - Duration::days((index % 365) as i64))
            .format(TIMESTAMP_FORMAT)
            .to_string();

        product.review_count += 1;
        let (title_part, description_part) = (product.title.clone(), product.description.clone());
        product.push_search_text([
            title_part.as_str(),
            description_part.as_str(),
            category.as_str(),
            department.as_str(),
            division.as_str(),
            review_text.as_str(),
        ]);

        let review = Review {
            id: format!("csv-{}", index + 1),
            title: review_title,
            review_text,
            rating,
            recommended: u8::from(recommended == Some(1)),
            age,
            positive_feedback_count: positive_feedback,
            clothing_id: (!clothing_id.is_empty()).then_some(clothing_id),
            division_name: division,
            department_name: department,
            category,
            created_at,
        };
        self.reviews.entry(slug).or_default().push(review);
    }

    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn review_total(&self) -> usize {
        self.reviews.values().map(Vec::len).sum()
    }

    /// Sorted distinct plurality category labels, computed once after load.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Paginated, filtered, searchable product listing.
    ///
    /// `page` clamps to >= 1, `page_size` to `[1, 100]`. Category matching is
    /// exact and case-sensitive against the plurality label. Search matches
    /// the lowercased term or its singular/plural alternate as a substring of
    /// the search blob. Results sort by lowercase title; ties keep encounter
    /// order. `availableCategories` is always the full list.
    #[must_use]
    pub fn list_products(
        &self,
        page: i64,
        page_size: i64,
        search: Option<&str>,
        category: Option<&str>,
    ) -> ProductPage {
        let page = usize::try_from(page.max(1)).unwrap_or(1);
        let page_size =
            usize::try_from(page_size.clamp(1, MAX_PAGE_SIZE)).unwrap_or(DEFAULT_PAGE_SIZE);

        let search_forms = search.and_then(search_forms);

        let mut filtered: Vec<&ProductRecord> = self
            .order
            .iter()
            .filter_map(|slug| self.products.get(slug))
            .filter(|p| category.is_none_or(|wanted| p.category() == wanted))
            .filter(|p| {
                search_forms
                    .as_ref()
                    .is_none_or(|forms| forms.iter().any(|form| p.search_blob.contains(form)))
            })
            .collect();
        filtered.sort_by_key(|p| p.title.to_lowercase());

        let total_items = filtered.len();
        let total_pages = std::cmp::max(1, total_items.div_ceil(page_size));

        let start = (page - 1).saturating_mul(page_size);
        let items = filtered
            .into_iter()
            .skip(start)
            .take(page_size)
            .map(ProductRecord::to_view)
            .collect();

        ProductPage {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            available_categories: self.categories.clone(),
        }
    }

    /// Product detail plus full review list, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub fn get_product(&self, product_id: &str) -> Result<ProductDetail, StoreError> {
        let record = self
            .products
            .get(product_id)
            .ok_or_else(|| StoreError::NotFound(product_id.to_string()))?;
        Ok(ProductDetail {
            product: record.to_view(),
            reviews: self.reviews.get(product_id).cloned().unwrap_or_default(),
        })
    }

    /// Compact entries for every product, sorted by lowercase title.
    #[must_use]
    pub fn product_options(&self) -> Vec<ProductOption> {
        let mut options: Vec<ProductOption> = self
            .order
            .iter()
            .filter_map(|slug| self.products.get(slug))
            .map(|p| ProductOption {
                id: p.id.clone(),
                title: p.title.clone(),
                category: p.category().to_string(),
                image_url: p.image_url.clone(),
            })
            .collect();
        options.sort_by_key(|o| o.title.to_lowercase());
        options
    }

    /// Record a user-submitted review, inserted at the head of the product's
    /// review list, and update the product aggregates incrementally.
    ///
    /// `recommended` is normalized defensively: only a literal 1 counts as a
    /// recommendation. Category/department/division counters and the positive
    /// feedback sum are intentionally untouched — user submissions carry no
    /// such metadata.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown product id.
    pub fn add_review(&mut self, input: NewReview) -> Result<Review, StoreError> {
        let record = self
            .products
            .get_mut(&input.product_id)
            .ok_or_else(|| StoreError::NotFound(input.product_id.clone()))?;

        let recommended = u8::from(input.recommended == 1);
        let reviews = self.reviews.entry(input.product_id.clone()).or_default();

        let title = input.title.trim();
        let review_text = input.review_text.trim().to_string();
        let review = Review {
            id: format!("user-{}", reviews.len() + 1),
            title: if title.is_empty() {
                DEFAULT_REVIEW_TITLE.to_string()
            } else {
                title.to_string()
            },
            review_text: review_text.clone(),
            rating: Some(input.rating),
            recommended,
            age: input.age,
            positive_feedback_count: 0,
            clothing_id: None,
            division_name: record.division().to_string(),
            department_name: record.department().to_string(),
            category: record.category().to_string(),
            created_at: Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string(),
        };

        reviews.insert(0, review.clone());

        record.review_count += 1;
        record.rating_sum += input.rating;
        record.rating_count += 1;
        record.recommended_sum += u64::from(recommended);
        record.push_search_text([review_text.as_str()]);

        Ok(review)
    }
}

/// `(value or default).strip()` — empty or absent raw text becomes the
/// default, then the survivor is trimmed.
fn text_or(value: Option<String>, default: &str) -> String {
    let raw = match value {
        Some(v) if !v.is_empty() => v,
        _ => default.to_string(),
    };
    raw.trim().to_string()
}

/// Like [`text_or`], but a whitespace-only value also falls back to the
/// default after trimming.
fn nonblank_or(value: Option<String>, default: &str) -> String {
    let text = text_or(value, default);
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

fn lenient_float(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok()
}

/// Integers parse through float first so "4.0" still counts as 4, matching
/// the dataset's mixed formatting.
fn lenient_int(value: Option<&str>) -> Option<i64> {
    #[allow(clippy::cast_possible_truncation)]
    lenient_float(value).map(|f| f.trunc() as i64)
}

/// Lowercase/trim a search term and derive its singular/plural alternate:
/// strip a trailing `s` when present, otherwise append one.
fn search_forms(term: &str) -> Option<Vec<String>> {
    let normalized = term.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    let alternate = normalized
        .strip_suffix('s')
        .map_or_else(|| format!("{normalized}s"), ToString::to_string);
    Some(vec![normalized, alternate])
}
