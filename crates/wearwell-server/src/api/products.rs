use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use wearwell_store::{ProductDetail, ProductOption, ProductPage};

use super::{ApiError, AppState};

const DEFAULT_PAGE_SIZE: i64 = 12;

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct OptionsBody {
    items: Vec<ProductOption>,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<ProductPage> {
    let store = state.store.read().await;
    Json(store.list_products(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        query.search.as_deref(),
        query.category.as_deref(),
    ))
}

pub(super) async fn product_options(State(state): State<AppState>) -> Json<OptionsBody> {
    let store = state.store.read().await;
    Json(OptionsBody {
        items: store.product_options(),
    })
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductDetail>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.get_product(&product_id)?))
}
