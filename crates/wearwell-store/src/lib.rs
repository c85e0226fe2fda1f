//! In-memory catalog of clothing products and their reviews.
//!
//! Built once per process from the CSV dataset; per-product aggregates are
//! maintained incrementally as rows load and as user reviews arrive. No
//! persistence — restart rebuilds from the CSV.

mod error;
mod record;
mod store;

pub use error::StoreError;
pub use record::{ProductView, Review};
pub use store::{CatalogStore, NewReview, ProductDetail, ProductOption, ProductPage};
