use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::info;
use validator::{Validate, ValidationError};

use crate::middleware::{RatePolicy, RouteClass};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

const RATE_LIMIT_GENERAL_MESSAGE: &str = "Too many requests. Please try again later.";
const RATE_LIMIT_SENSITIVE_MESSAGE: &str =
    "Too many attempts from this address. Please try again later.";
const RATE_LIMIT_UPLOAD_MESSAGE: &str =
    "Too many uploads from this address. Please try again later.";

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    #[validate(custom = "validate_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Redirect plain-HTTP requests (as reported by the proxy) to HTTPS
    #[serde(default)]
    pub force_https: bool,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Generic API routes: requests per window
    #[serde(default = "default_general_max")]
    pub rate_limit_general_max: u32,
    /// Generic API routes: window size (seconds)
    #[serde(default = "default_general_window_secs")]
    pub rate_limit_general_window_secs: u64,

    /// Contact/auth/user-management routes: requests per window
    #[serde(default = "default_sensitive_max")]
    pub rate_limit_sensitive_max: u32,
    /// Contact/auth/user-management routes: window size (seconds)
    #[serde(default = "default_sensitive_window_secs")]
    pub rate_limit_sensitive_window_secs: u64,

    /// Upload/testimonial routes: requests per window
    #[serde(default = "default_upload_max")]
    pub rate_limit_upload_max: u32,
    /// Upload/testimonial routes: window size (seconds)
    #[serde(default = "default_upload_window_secs")]
    pub rate_limit_upload_window_secs: u64,

    /// CORS: comma-separated list of allowed origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}
fn default_general_max() -> u32 {
    100
}
fn default_general_window_secs() -> u64 {
    15 * 60
}
fn default_sensitive_max() -> u32 {
    20
}
fn default_sensitive_window_secs() -> u64 {
    15 * 60
}
fn default_upload_max() -> u32 {
    10
}
fn default_upload_window_secs() -> u64 {
    60 * 60
}

fn validate_environment(environment: &str) -> Result<(), ValidationError> {
    match environment {
        "development" | "staging" | "production" | "test" => Ok(()),
        _ => Err(ValidationError::new("unknown environment")),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            force_https: false,
            max_body_bytes: default_max_body_bytes(),
            rate_limit_general_max: default_general_max(),
            rate_limit_general_window_secs: default_general_window_secs(),
            rate_limit_sensitive_max: default_sensitive_max(),
            rate_limit_sensitive_window_secs: default_sensitive_window_secs(),
            rate_limit_upload_max: default_upload_max(),
            rate_limit_upload_window_secs: default_upload_window_secs(),
            cors_allowed_origins: None,
        }
    }
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// The rate policy for a route class.
    pub fn rate_policy(&self, class: RouteClass) -> RatePolicy {
        match class {
            RouteClass::General => RatePolicy {
                max_requests: self.rate_limit_general_max,
                window: Duration::from_secs(self.rate_limit_general_window_secs),
                message: RATE_LIMIT_GENERAL_MESSAGE,
            },
            RouteClass::Sensitive => RatePolicy {
                max_requests: self.rate_limit_sensitive_max,
                window: Duration::from_secs(self.rate_limit_sensitive_window_secs),
                message: RATE_LIMIT_SENSITIVE_MESSAGE,
            },
            RouteClass::Upload => RatePolicy {
                max_requests: self.rate_limit_upload_max,
                window: Duration::from_secs(self.rate_limit_upload_window_secs),
                message: RATE_LIMIT_UPLOAD_MESSAGE,
            },
        }
    }
}

/// Load configuration from layered sources: `config/default.toml`, the
/// environment-specific file, then `TRADEPORT__`-prefixed environment
/// variables. Missing files are fine; defaults cover everything.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let environment =
        std::env::var("TRADEPORT_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let config = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
        .add_source(Environment::with_prefix("TRADEPORT").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize().unwrap_or_default();

    app_config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;

    info!(
        environment = %app_config.environment,
        port = app_config.port,
        "configuration loaded"
    );
    Ok(app_config)
}

/// Initialize the tracing subscriber. Called once at startup.
pub fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}
