use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use wearwell_store::{NewReview, ProductDetail, Review};

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CreatedReview {
    review: Review,
    product: ProductDetail,
}

fn required_string(body: &Value, field: &'static str) -> Result<String, ApiError> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| ApiError::bad_request(format!("{field} is required")))
}

/// JSON number or numeric string; everything else is a validation failure.
fn required_number(body: &Value, field: &'static str) -> Result<f64, ApiError> {
    let invalid = || ApiError::bad_request(format!("{field} must be a number"));
    match body.get(field) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn required_recommended(body: &Value) -> Result<i64, ApiError> {
    let invalid = || ApiError::bad_request("recommended must be 0 or 1");
    let value = match body.get("recommended") {
        Some(Value::Number(n)) => n.as_i64().ok_or_else(invalid)?,
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    if value == 0 || value == 1 {
        Ok(value)
    } else {
        Err(invalid())
    }
}

/// Absent, null, or blank means "not given"; anything else must parse as an
/// integer.
fn optional_age(body: &Value) -> Result<Option<i64>, ApiError> {
    let invalid = || ApiError::bad_request("age must be an integer");
    match body.get("age") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse::<i64>().map(Some).map_err(|_| invalid())
        }
        Some(_) => Err(invalid()),
    }
}

pub(super) async fn create_review(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedReview>), ApiError> {
    let Json(body) = body.map_err(|_| ApiError::bad_request("request body must be valid JSON"))?;

    let input = NewReview {
        product_id: required_string(&body, "productId")?,
        title: required_string(&body, "title")?,
        review_text: required_string(&body, "reviewText")?,
        rating: required_number(&body, "rating")?,
        recommended: required_recommended(&body)?,
        age: optional_age(&body)?,
    };
    let product_id = input.product_id.clone();

    let mut store = state.store.write().await;
    let review = store.add_review(input)?;
    let product = store.get_product(&product_id)?;

    Ok((StatusCode::CREATED, Json(CreatedReview { review, product })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_string_trims_and_rejects_blank() {
        let body = json!({ "title": "  ok  ", "blank": "  " });
        assert_eq!(required_string(&body, "title").expect("present"), "ok");
        assert!(required_string(&body, "blank").is_err());
        assert!(required_string(&body, "missing").is_err());
    }

    #[test]
    fn required_number_accepts_numeric_strings() {
        let body = json!({ "rating": "4.5" });
        let parsed = required_number(&body, "rating").expect("numeric string");
        assert!((parsed - 4.5).abs() < f64::EPSILON);
        assert!(required_number(&json!({ "rating": "x" }), "rating").is_err());
    }

    #[test]
    fn recommended_only_accepts_binary_values() {
        assert_eq!(
            required_recommended(&json!({ "recommended": "0" })).expect("string zero"),
            0
        );
        assert!(required_recommended(&json!({ "recommended": 2 })).is_err());
        assert!(required_recommended(&json!({ "recommended": "yes" })).is_err());
        assert!(required_recommended(&json!({})).is_err());
    }

    #[test]
    fn age_blank_string_counts_as_absent() {
        assert_eq!(optional_age(&json!({ "age": "" })).expect("blank ok"), None);
        assert_eq!(optional_age(&json!({ "age": null })).expect("null ok"), None);
        assert_eq!(optional_age(&json!({ "age": 30 })).expect("number"), Some(30));
        assert!(optional_age(&json!({ "age": 29.5 })).is_err());
        assert!(optional_age(&json!({ "age": "old" })).is_err());
    }
}
