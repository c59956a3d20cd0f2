use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    errors::ApiError,
    security::file_guard::{self, FileDescriptor, FilePolicy},
    validation::{validate, FieldErrors, SchemaKind},
    ApiResponse, AppState,
};

/// POST /admin/api/testimonials — photo uploads, as multipart form data or
/// as JSON metadata. Every file part is validated and checked against the
/// photo policy before anything reaches the back office; one bad part
/// rejects the whole request and nothing is persisted.
pub async fn create(
    State(state): State<AppState>,
    req: Request,
) -> Result<impl IntoResponse, ApiError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let raw_uploads = if is_multipart {
        multipart_file_metadata(req, &state).await?
    } else {
        let Json(body) = Json::<Value>::from_request(req, &state)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        vec![body]
    };

    let policy = FilePolicy::testimonial_photo();
    let mut checked = Vec::with_capacity(raw_uploads.len());
    for raw in &raw_uploads {
        let data = validate(SchemaKind::UploadMetadata, raw).map_err(ApiError::Validation)?;
        let descriptor = FileDescriptor {
            name: data["file_name"].as_str().unwrap_or_default().to_string(),
            mime_type: data["mime_type"].as_str().unwrap_or_default().to_string(),
            size_bytes: data["size_bytes"].as_u64().unwrap_or_default(),
        };
        file_guard::check(&descriptor, &policy)
            .map_err(|rejection| ApiError::FileRejected(rejection.to_string()))?;
        checked.push(data);
    }

    let mut ids = Vec::with_capacity(checked.len());
    for data in checked {
        let id = state
            .back_office
            .save_testimonial(data)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        ids.push(id);
    }

    info!(count = ids.len(), "testimonial upload accepted");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(json!({ "ids": ids }))),
    ))
}

/// Collect metadata for every file part of a multipart body. Non-file form
/// fields carry no upload and are skipped.
async fn multipart_file_metadata(
    req: Request,
    state: &AppState,
) -> Result<Vec<Value>, ApiError> {
    let mut multipart = Multipart::from_request(req, state)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        parts.push(json!({
            "file_name": file_name,
            "mime_type": mime_type,
            "size_bytes": bytes.len(),
        }));
    }

    if parts.is_empty() {
        let mut errors = FieldErrors::new();
        errors.insert(
            "file".to_string(),
            vec!["A file part is required".to_string()],
        );
        return Err(ApiError::Validation(errors));
    }
    Ok(parts)
}
