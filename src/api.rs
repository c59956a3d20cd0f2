//! Router assembly: every route is wired through the pipeline in order —
//! security headers outermost, then HTTPS redirect, then the route class's
//! rate limit, then body sanitation, then (for admin routes) the session
//! guard, and finally the validating handler.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state, Next},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    handlers,
    middleware::{
        admin_guard::admin_guard, https_redirect::https_redirect_middleware,
        rate_limit::enforce, sanitize_body::sanitize_body_middleware,
        security_headers::security_headers_middleware, RouteClass,
    },
    AppState,
};

fn cors_layer(state: &AppState) -> CorsLayer {
    let configured: Vec<HeaderValue> = state
        .config
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(|origin| {
            let trimmed = origin.trim();
            if trimmed.is_empty() {
                None
            } else {
                HeaderValue::from_str(trimmed).ok()
            }
        })
        .collect();

    if configured.is_empty() {
        CorsLayer::new()
    } else {
        info!(origins = configured.len(), "CORS origins configured");
        CorsLayer::new().allow_origin(configured)
    }
}

/// Build the application router.
pub fn app_router(state: AppState) -> Router {
    let limit = |class: RouteClass| {
        let state = state.clone();
        from_fn(move |req: Request, next: Next| enforce(state.clone(), class, req, next))
    };

    let public_general = Router::new()
        .route("/api/track/:container_id", get(handlers::tracking::track))
        .route_layer(from_fn_with_state(state.clone(), sanitize_body_middleware))
        .route_layer(limit(RouteClass::General));

    let public_sensitive = Router::new()
        .route("/api/contact", post(handlers::contact::submit))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/auth/password-strength",
            post(handlers::auth::password_strength),
        )
        .route_layer(from_fn_with_state(state.clone(), sanitize_body_middleware))
        .route_layer(limit(RouteClass::Sensitive));

    let admin_general = Router::new()
        .route("/admin/api/invoices", post(handlers::invoices::create))
        .route("/admin/api/settings", put(handlers::settings::update))
        .route_layer(from_fn_with_state(state.clone(), admin_guard))
        .route_layer(from_fn_with_state(state.clone(), sanitize_body_middleware))
        .route_layer(limit(RouteClass::General));

    let admin_users = Router::new()
        .route("/admin/api/users", post(handlers::users::create))
        .route_layer(from_fn_with_state(state.clone(), admin_guard))
        .route_layer(from_fn_with_state(state.clone(), sanitize_body_middleware))
        .route_layer(limit(RouteClass::Sensitive));

    let admin_uploads = Router::new()
        .route("/admin/api/testimonials", post(handlers::testimonials::create))
        .route_layer(from_fn_with_state(state.clone(), admin_guard))
        .route_layer(from_fn_with_state(state.clone(), sanitize_body_middleware))
        .route_layer(limit(RouteClass::Upload));

    Router::new()
        .route("/health", get(handlers::health::liveness))
        .merge(public_general)
        .merge(public_sensitive)
        .merge(admin_general)
        .merge(admin_users)
        .merge(admin_uploads)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state))
        .layer(from_fn_with_state(state.clone(), https_redirect_middleware))
        // headers go on last so every response, redirects and errors
        // included, carries them
        .layer(from_fn(security_headers_middleware))
        .with_state(state)
}
