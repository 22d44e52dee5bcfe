//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_API_BASE_URL` - Base URL of the order/catalog service
//! - `SHOPFRONT_API_TOKEN` - Bearer token sent with every request
//!
//! ## Optional
//! - `SHOPFRONT_STORAGE_DIR` - Directory for persisted cart/favorites (default: `.shopfront`)
//! - `SHOPFRONT_ORDERS_PAGE_SIZE` - Orders fetched per page (default: 10)

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_DIR: &str = ".shopfront";
const DEFAULT_ORDERS_PAGE_SIZE: u32 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote service configuration
    pub api: ApiConfig,
    /// Directory backing the durable cart/favorites storage
    pub storage_dir: PathBuf,
    /// Number of orders requested per page
    pub orders_page_size: u32,
}

/// Remote order/catalog service configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint names are resolved beneath it
    pub base_url: Url,
    /// Bearer token
    pub token: SecretString,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let storage_dir = PathBuf::from(get_env_or_default(
            "SHOPFRONT_STORAGE_DIR",
            DEFAULT_STORAGE_DIR,
        ));
        let orders_page_size = get_env_or_default(
            "SHOPFRONT_ORDERS_PAGE_SIZE",
            &DEFAULT_ORDERS_PAGE_SIZE.to_string(),
        )
        .parse::<u32>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPFRONT_ORDERS_PAGE_SIZE".to_string(), e.to_string())
        })?;
        if orders_page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_ORDERS_PAGE_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api,
            storage_dir,
            orders_page_size,
        })
    }
}

impl ApiConfig {
    /// Build a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` does not parse.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("SHOPFRONT_API_BASE_URL", base_url)?,
            token: SecretString::from(token.into()),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("SHOPFRONT_API_BASE_URL")?;
        Ok(Self {
            base_url: parse_base_url("SHOPFRONT_API_BASE_URL", &base_url)?,
            token: get_validated_secret("SHOPFRONT_API_TOKEN")?,
        })
    }

    /// Resolve an endpoint name beneath the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` cannot be joined onto the base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(endpoint)
    }

    pub(crate) fn bearer(&self) -> &str {
        self.token.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a base URL so that relative endpoint names resolve beneath it.
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    // Url::join replaces the last path segment unless the path ends in '/'
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be a hierarchical URL".to_string(),
        ));
    }
    Ok(url)
}

/// Validate that a secret is present and not an obvious placeholder.
fn validate_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.trim().is_empty() {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "is empty".to_string(),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret(&value, key)?;
    Ok(SecretString::from(value))
}
