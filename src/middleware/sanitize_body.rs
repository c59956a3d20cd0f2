use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::BodyExt as _;
use tracing::warn;

use crate::{errors::ErrorBody, security::sanitize, AppState};

/// Buffer, sanitize and reinject JSON request bodies. Oversized bodies are
/// rejected up front; a body that declares JSON but fails to parse is a 500
/// per the pipeline's error policy (unexpected at this layer — handlers
/// never see it). Non-JSON requests pass through untouched.
pub async fn sanitize_body_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let max_bytes = state.config.max_body_bytes;

    if let Some(length) = req
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
    {
        if length > max_bytes {
            warn!(length, max_bytes, "request body too large");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorBody::new("PAYLOAD_TOO_LARGE", "Request body too large")),
            )
                .into_response();
        }
    }

    // Scanner user agents are logged but not blocked; blocking on UA alone
    // produces false positives.
    if let Some(ua) = req.headers().get("user-agent").and_then(|v| v.to_str().ok()) {
        if is_suspicious_user_agent(ua) {
            warn!(user_agent = %ua, "suspicious user agent");
        }
    }

    let is_json = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            return crate::errors::ApiError::Internal(format!("failed to read body: {err}"))
                .into_response()
        }
    };

    if bytes.len() > max_bytes {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorBody::new("PAYLOAD_TOO_LARGE", "Request body too large")),
        )
            .into_response();
    }

    if bytes.is_empty() {
        return next.run(Request::from_parts(parts, Body::empty())).await;
    }

    let mut value: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(err) => {
            return crate::errors::ApiError::Internal(format!("malformed JSON body: {err}"))
                .into_response()
        }
    };
    sanitize::sanitize_json(&mut value);

    let sanitized = match serde_json::to_vec(&value) {
        Ok(bytes) => bytes,
        Err(err) => {
            return crate::errors::ApiError::Internal(format!("failed to re-serialize body: {err}"))
                .into_response()
        }
    };

    let mut req = Request::from_parts(parts, Body::from(sanitized.clone()));
    // content-length must match the rewritten body
    req.headers_mut().insert(
        axum::http::header::CONTENT_LENGTH,
        axum::http::HeaderValue::from(sanitized.len() as u64),
    );
    next.run(req).await
}

fn is_suspicious_user_agent(ua: &str) -> bool {
    let suspicious_patterns = ["sqlmap", "nikto", "nmap", "masscan", "metasploit"];
    let ua_lower = ua.to_lowercase();
    suspicious_patterns
        .iter()
        .any(|pattern| ua_lower.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::{middleware::from_fn_with_state, routing::post, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = test_state();
        Router::new()
            .route(
                "/echo",
                post(|Json(body): Json<serde_json::Value>| async move { Json(body) }),
            )
            .layer(from_fn_with_state(state.clone(), sanitize_body_middleware))
            .with_state(state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn json_strings_are_sanitized_before_the_handler() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"note":"<script>alert(1)</script>hi","n":7}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let echoed = body_json(response).await;
        assert_eq!(echoed["note"], "hi");
        assert_eq!(echoed["n"], 7);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .header("content-length", "99999999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn malformed_json_is_an_internal_error() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        // the parse detail is logged, not leaked
        assert_eq!(body["error"]["message"], "An unexpected error occurred");
    }
}
