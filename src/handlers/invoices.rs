use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;
use tracing::info;

use crate::{
    errors::ApiError,
    validation::{validate, SchemaKind},
    ApiResponse, AppState,
};

/// POST /admin/api/invoices — validate and store a new invoice.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let data = validate(SchemaKind::Invoice, &body).map_err(ApiError::Validation)?;

    let id = state
        .back_office
        .save_invoice(data)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(%id, "invoice created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(serde_json::json!({ "id": id }))),
    ))
}
