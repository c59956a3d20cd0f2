/*!
 * # Request Pipeline Middleware
 *
 * The per-request stages the router composes, ordered outermost first:
 * security headers, HTTPS redirect, rate limiting per route class, JSON
 * body sanitation, and the admin session/role guard. Each stage either
 * passes the request on or produces a terminal response; no stage retries.
 */

pub mod admin_guard;
pub mod client_ip;
pub mod https_redirect;
pub mod rate_limit;
pub mod sanitize_body;
pub mod security_headers;

pub use client_ip::client_ip;
pub use rate_limit::{RatePolicy, RouteClass, SlidingWindowLimiter};
