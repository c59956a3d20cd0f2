/*!
 * # Session and Identity Seams
 *
 * Authentication itself is handled by the hosted provider; this crate only
 * consumes it through two traits: a session lookup and a user-profile
 * directory. In-memory implementations back tests and local development.
 */

use async_trait::async_trait;
use axum::http::HeaderMap;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Name of the session cookie issued by the auth provider.
pub const SESSION_COOKIE: &str = "tp_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Staff,
}

/// The authenticated caller, as resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub session_id: String,
}

/// Profile fields the admin guard needs.
#[derive(Debug, Clone, Copy)]
pub struct UserProfile {
    pub role: Role,
    pub is_active: bool,
}

/// Resolves the current session from request headers and supports forced
/// sign-out.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn current(&self, headers: &HeaderMap) -> Option<Principal>;
    async fn destroy(&self, session_id: &str);
}

/// Looks up the profile backing a principal.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn profile(&self, user_id: &Uuid) -> anyhow::Result<Option<UserProfile>>;
}

/// Extract a cookie value from the `Cookie` header.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get("cookie")?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

/// In-memory session store keyed by session id.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Uuid>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a session; returns the id to put in the cookie.
    pub fn insert(&self, session_id: impl Into<String>, user_id: Uuid) {
        self.sessions.insert(session_id.into(), user_id);
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn current(&self, headers: &HeaderMap) -> Option<Principal> {
        let session_id = cookie_value(headers, SESSION_COOKIE)?;
        let user_id = *self.sessions.get(&session_id)?;
        Some(Principal {
            user_id,
            session_id,
        })
    }

    async fn destroy(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }
}

/// In-memory user directory.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    profiles: DashMap<Uuid, UserProfile>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn insert(&self, user_id: Uuid, profile: UserProfile) {
        self.profiles.insert(user_id, profile);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn profile(&self, user_id: &Uuid) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.profiles.get(user_id).map(|p| *p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            "other=1; tp_session=abc123; theme=dark".parse().unwrap(),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("abc123"));
        assert_eq!(cookie_value(&headers, "missing"), None);
        assert_eq!(cookie_value(&HeaderMap::new(), SESSION_COOKIE), None);
    }

    #[tokio::test]
    async fn session_round_trip_and_destroy() {
        let store = InMemorySessionStore::new();
        let user = Uuid::new_v4();
        store.insert("s1", user);

        let mut headers = HeaderMap::new();
        headers.insert("cookie", "tp_session=s1".parse().unwrap());
        let principal = store.current(&headers).await.unwrap();
        assert_eq!(principal.user_id, user);

        store.destroy("s1").await;
        assert!(store.current(&headers).await.is_none());
    }

    #[test]
    fn role_serialization_is_uppercase() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "ADMIN");
        assert_eq!(serde_json::to_value(Role::Staff).unwrap(), "STAFF");
    }
}
