//! TradePort API Library
//!
//! Request-security and validation pipeline for the TradePort website and
//! admin back-office: client identification, sliding-window rate limiting,
//! input sanitization, declarative schema validation, upload policy checks,
//! security headers, and the router that composes them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod security;
pub mod services;
pub mod validation;

use std::sync::Arc;

use serde::Serialize;

pub use api::app_router;

use crate::auth::{SessionStore, UserDirectory};
use crate::middleware::SlidingWindowLimiter;
use crate::services::BackOffice;

/// Shared application state. Everything mutable across requests lives here
/// and is injected at construction; there is no ambient module state.
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub rate_limiter: Arc<SlidingWindowLimiter>,
    pub sessions: Arc<dyn SessionStore>,
    pub users: Arc<dyn UserDirectory>,
    pub back_office: Arc<dyn BackOffice>,
}

/// Success envelope for API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}
