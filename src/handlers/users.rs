use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;
use tracing::info;

use crate::{
    errors::ApiError,
    validation::{validate, SchemaKind},
    ApiResponse, AppState,
};

/// POST /admin/api/users — validate and create a back-office account.
/// Password strength is enforced by the schema; the secret itself goes to
/// the auth provider via the back office, never to logs.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let data = validate(SchemaKind::User, &body).map_err(ApiError::Validation)?;

    let id = state
        .back_office
        .create_user(data)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(%id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(serde_json::json!({ "id": id }))),
    ))
}
