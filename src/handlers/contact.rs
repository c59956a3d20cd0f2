use axum::{extract::State, response::IntoResponse, Json};
use serde_json::Value;
use tracing::info;

use crate::{
    errors::ApiError,
    validation::{validate, SchemaKind},
    ApiResponse, AppState,
};

/// POST /api/contact — validate the contact form and hand the transformed
/// message to the back office.
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let data = validate(SchemaKind::ContactForm, &body).map_err(ApiError::Validation)?;

    state
        .back_office
        .submit_contact(data)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!("contact message accepted");
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "received": true }),
    )))
}
