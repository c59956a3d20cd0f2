use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    errors::ApiError,
    validation::{validate, SchemaKind},
    ApiResponse, AppState,
};

/// GET /api/track/:container_id — validate the id, then look the shipment up.
pub async fn track(
    State(state): State<AppState>,
    Path(container_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let data = validate(
        SchemaKind::TrackingId,
        &json!({ "container_id": container_id }),
    )
    .map_err(ApiError::Validation)?;
    // validated + uppercased form, never the raw path segment
    let container_id = data["container_id"].as_str().unwrap_or_default();

    let status = state
        .back_office
        .track_container(container_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("No shipment found for {container_id}")))?;

    Ok(Json(ApiResponse::success(status)))
}
