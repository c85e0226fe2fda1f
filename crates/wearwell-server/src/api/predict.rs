use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::Value;
use wearwell_model::{ModelError, Prediction};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

/// `rating` is advisory: a JSON number or a numeric string is used, anything
/// else is logged and dropped rather than rejected.
fn lenient_rating(value: Option<&Value>) -> Option<f64> {
    let value = value?;
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<f64>() {
                Ok(rating) => Some(rating),
                Err(_) => {
                    tracing::warn!(rating = %s, "unparsable rating ignored");
                    None
                }
            }
        }
        other => {
            tracing::warn!(rating = %other, "non-numeric rating ignored");
            None
        }
    }
}

pub(super) async fn predict(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::bad_request("request body must be valid JSON"))?;

    let review_text = body
        .get("reviewText")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let rating = lenient_rating(body.get("rating"));

    match state.pipeline.predict(review_text, rating) {
        Ok(prediction) => Ok(Json(prediction)),
        Err(e @ ModelError::InvalidInput(_)) => Err(ApiError::bad_request(e.to_string())),
        Err(e) if e.is_not_ready() => {
            tracing::error!(request_id = %req_id.0, error = %e, "prediction backend not ready");
            Err(ApiError::service_unavailable(e.to_string()))
        }
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "prediction failed");
            Err(ApiError::internal("Prediction failed"))
        }
    }
}
