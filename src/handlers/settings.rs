use axum::{extract::State, response::IntoResponse, Json};
use serde_json::Value;
use tracing::info;

use crate::{
    errors::ApiError,
    validation::{validate, SchemaKind},
    ApiResponse, AppState,
};

/// PUT /admin/api/settings — validate and apply company settings.
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let data = validate(SchemaKind::CompanySettings, &body).map_err(ApiError::Validation)?;

    state
        .back_office
        .update_settings(data)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!("company settings updated");
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "updated": true }),
    )))
}
