use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use crate::{auth::Role, errors::ApiError, AppState};

/// Where unauthenticated or unauthorized admin traffic is sent.
pub const LOGIN_PATH: &str = "/admin/login";

/// Guard for admin routes. No session redirects to the login page. An
/// authenticated caller who is not an active admin is treated the same as
/// an unauthenticated one, except that their session is destroyed first so
/// a stale or demoted account cannot keep probing.
pub async fn admin_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(principal) = state.sessions.current(req.headers()).await else {
        debug!(path = %req.uri().path(), "admin request without session");
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let profile = match state.users.profile(&principal.user_id).await {
        Ok(profile) => profile,
        Err(err) => {
            return ApiError::Internal(format!("user lookup failed: {err}")).into_response();
        }
    };

    match profile {
        Some(profile) if profile.role == Role::Admin && profile.is_active => next.run(req).await,
        _ => {
            warn!(user = %principal.user_id, "non-admin session on admin route, signing out");
            state.sessions.destroy(&principal.session_id).await;
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{UserProfile, SESSION_COOKIE};
    use crate::test_support::{test_state_with_stores, TestStores};
    use axum::{body::Body, middleware::from_fn_with_state, routing::get, Router};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> (Router, TestStores) {
        let (state, stores) = test_state_with_stores();
        let router = Router::new()
            .route("/admin/api/thing", get(|| async { "secret" }))
            .layer(from_fn_with_state(state.clone(), admin_guard))
            .with_state(state);
        (router, stores)
    }

    fn request_with_session(session: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri("/admin/api/thing")
            .header("cookie", format!("{SESSION_COOKIE}={session}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn no_session_redirects_to_login() {
        let (app, _) = app();
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/admin/api/thing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 303);
        assert_eq!(response.headers().get("location").unwrap(), LOGIN_PATH);
    }

    #[tokio::test]
    async fn active_admin_passes() {
        let (app, stores) = app();
        let user = Uuid::new_v4();
        stores.sessions.insert("s1", user);
        stores.users.insert(
            user,
            UserProfile {
                role: Role::Admin,
                is_active: true,
            },
        );
        let response = app.oneshot(request_with_session("s1")).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn staff_session_is_destroyed_and_redirected() {
        let (app, stores) = app();
        let user = Uuid::new_v4();
        stores.sessions.insert("s2", user);
        stores.users.insert(
            user,
            UserProfile {
                role: Role::Staff,
                is_active: true,
            },
        );
        let response = app.oneshot(request_with_session("s2")).await.unwrap();
        assert_eq!(response.status(), 303);
        assert!(!stores.sessions.contains("s2"), "session should be destroyed");
    }

    #[tokio::test]
    async fn inactive_admin_is_rejected() {
        let (app, stores) = app();
        let user = Uuid::new_v4();
        stores.sessions.insert("s3", user);
        stores.users.insert(
            user,
            UserProfile {
                role: Role::Admin,
                is_active: false,
            },
        );
        let response = app.oneshot(request_with_session("s3")).await.unwrap();
        assert_eq!(response.status(), 303);
        assert!(!stores.sessions.contains("s3"));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let (app, stores) = app();
        stores.sessions.insert("s4", Uuid::new_v4());
        let response = app.oneshot(request_with_session("s4")).await.unwrap();
        assert_eq!(response.status(), 303);
    }
}
