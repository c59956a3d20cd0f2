use axum::{extract::State, response::IntoResponse, Json};
use serde_json::Value;

use crate::{
    errors::ApiError,
    security::password,
    validation::{validate, SchemaKind},
    ApiResponse, AppState,
};

/// POST /api/auth/login — validate credentials' shape and pass them on.
/// Credential verification itself belongs to the hosted auth provider; this
/// endpoint only guarantees the provider never sees unvalidated input.
pub async fn login(
    State(_state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let data = validate(SchemaKind::Login, &body).map_err(ApiError::Validation)?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "email": data["email"],
        "accepted": true,
    }))))
}

/// POST /api/auth/password-strength — strength meter for the signup form.
pub async fn password_strength(Json(body): Json<Value>) -> Result<impl IntoResponse, ApiError> {
    let Some(candidate) = body.get("password").and_then(Value::as_str) else {
        let mut errors = crate::validation::FieldErrors::new();
        errors.insert(
            "password".to_string(),
            vec!["password is required".to_string()],
        );
        return Err(ApiError::Validation(errors));
    };

    Ok(Json(ApiResponse::success(serde_json::to_value(
        password::check_strength(candidate),
    ).map_err(|e| ApiError::Internal(e.to_string()))?)))
}
