use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::AppState;

/// Redirect plain-HTTP traffic to HTTPS when `force_https` is enabled.
/// The scheme is read from `x-forwarded-proto`, which the fronting proxy
/// sets; direct connections without the header are left alone.
pub async fn https_redirect_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if state.config.force_https {
        let proto = req
            .headers()
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok());
        if proto == Some("http") {
            if let Some(host) = req.headers().get("host").and_then(|v| v.to_str().ok()) {
                let path = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                let target = format!("https://{host}{path}");
                debug!(%target, "redirecting insecure request");
                return Redirect::permanent(&target).into_response();
            }
        }
    }

    next.run(req).await
}
