/*!
 * # Sliding-Window Rate Limiting
 *
 * Per-identifier sliding windows of request timestamps. The store is
 * process-local and in-memory; a horizontally-scaled deployment limits per
 * instance, which is an accepted property of this advisory limiter. The
 * limiter is owned by `AppState` and injected, never ambient.
 */

use std::time::{Duration, Instant};

use axum::{extract::Request, middleware::Next, response::{IntoResponse, Response}};
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::{config::AppConfig, errors::ApiError, middleware::client_ip, AppState};

/// Rate limit policy for one route class.
#[derive(Debug, Clone, Copy)]
pub struct RatePolicy {
    pub max_requests: u32,
    pub window: Duration,
    pub message: &'static str,
}

/// Route classes with distinct budgets. The class is part of the window key,
/// so exhausting one class never affects another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Read-mostly public API traffic.
    General,
    /// Contact, auth and user-management endpoints.
    Sensitive,
    /// Upload and testimonial submission endpoints.
    Upload,
}

impl RouteClass {
    pub(crate) fn key_prefix(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Sensitive => "sensitive",
            Self::Upload => "upload",
        }
    }
}

/// In-memory sliding-window limiter. Each key maps to the timestamps of its
/// admitted requests within the current window; entries are pruned on every
/// admit decision. The DashMap entry guard serializes the read-filter-append
/// sequence per key, so concurrent requests from one client cannot lose
/// updates.
#[derive(Debug, Default)]
pub struct SlidingWindowLimiter {
    windows: DashMap<String, Vec<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a request from `key` is admitted under
    /// `max_requests` per `window`. Rejected attempts are not recorded.
    pub fn admit(&self, key: &str, max_requests: u32, window: Duration) -> bool {
        self.admit_at(key, max_requests, window, Instant::now())
    }

    pub(crate) fn admit_at(
        &self,
        key: &str,
        max_requests: u32,
        window: Duration,
        now: Instant,
    ) -> bool {
        if max_requests == 0 {
            return false;
        }

        let mut entry = self.windows.entry(key.to_string()).or_default();
        // keep only timestamps strictly inside (now - window, now]
        entry.retain(|&t| now.duration_since(t) < window);
        if entry.len() as u32 >= max_requests {
            return false;
        }
        entry.push(now);
        true
    }

    /// Drop keys whose windows have fully drained. Safe to call at any
    /// time; admit decisions prune their own keys regardless.
    pub fn cleanup(&self, window: Duration) {
        let now = Instant::now();
        self.windows.retain(|_, timestamps| {
            timestamps.retain(|&t| now.duration_since(t) < window);
            !timestamps.is_empty()
        });
    }

    /// Number of tracked identifiers, for introspection and tests.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

/// The longest window across all route classes. Cleanup must prune against
/// this, not any single class's window, or it would discard timestamps still
/// live under a longer policy and re-admit clients over budget.
pub(crate) fn longest_window(config: &AppConfig) -> Duration {
    [RouteClass::General, RouteClass::Sensitive, RouteClass::Upload]
        .into_iter()
        .map(|class| config.rate_policy(class).window)
        .max()
        .unwrap_or_default()
}

/// Periodically drop drained windows so idle identifiers do not accumulate.
pub async fn run_cleanup(state: AppState) {
    let window = longest_window(&state.config);
    loop {
        tokio::time::sleep(Duration::from_secs(60 * 10)).await;
        state.rate_limiter.cleanup(window);
        debug!(
            tracked = state.rate_limiter.tracked_keys(),
            "rate limiter cleanup pass"
        );
    }
}

/// Middleware enforcing the policy of `class` for the request's client.
pub async fn enforce(state: AppState, class: RouteClass, req: Request, next: Next) -> Response {
    let policy = state.config.rate_policy(class);
    let ip = client_ip(req.headers());
    let key = format!("{}:{}", class.key_prefix(), ip);

    if !state
        .rate_limiter
        .admit(&key, policy.max_requests, policy.window)
    {
        warn!(client = %ip, class = class.key_prefix(), "rate limit exceeded");
        return ApiError::RateLimitExceeded {
            message: policy.message.to_string(),
            retry_after_secs: policy.window.as_secs(),
        }
        .into_response();
    }

    next.run(req).await
}
