//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PRIMEFIX_API_URL` - Base URL of the storefront REST API (e.g. `https://shop.example.com/api`)
//!
//! ## Optional
//! - `PRIMEFIX_API_TOKEN` - Bearer token sent with every request
//! - `PRIMEFIX_WEBSITE_ID` - Website ID attached to orders (default: 1)
//! - `PRIMEFIX_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 15)
//! - `PRIMEFIX_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is free (default: 500)
//! - `PRIMEFIX_FLAT_SHIPPING_FEE` - Shipping fee at or below the threshold (default: 49)
//! - `PRIMEFIX_DATA_DIR` - Directory holding the persisted cart and wishlist (default: .primefix)

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use primefix_core::WebsiteId;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::pricing::ShippingPolicy;

const DEFAULT_WEBSITE_ID: i64 = 1;
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DATA_DIR: &str = ".primefix";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// REST API client configuration
    pub api: ApiConfig,
    /// Shipping fee policy used for every price quote
    pub shipping: ShippingPolicy,
    /// Directory of the file-backed cart and wishlist store
    pub data_dir: PathBuf,
}

/// REST API client configuration.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so endpoint paths join under it
    pub base_url: Url,
    /// Bearer token for authenticated customers
    pub token: Option<SecretString>,
    /// Website the orders belong to
    pub website_id: WebsiteId,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("website_id", &self.website_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration with defaults for everything but the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("PRIMEFIX_API_URL", base_url)?,
            token: None,
            website_id: WebsiteId::new(DEFAULT_WEBSITE_ID),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Lookup(lookup);

        let base_url = env.required("PRIMEFIX_API_URL")?;
        let api = ApiConfig {
            base_url: parse_base_url("PRIMEFIX_API_URL", &base_url)?,
            token: env
                .optional("PRIMEFIX_API_TOKEN")
                .filter(|token| !token.trim().is_empty())
                .map(SecretString::from),
            website_id: WebsiteId::new(env.parsed("PRIMEFIX_WEBSITE_ID", DEFAULT_WEBSITE_ID)?),
            timeout: Duration::from_secs(
                env.parsed("PRIMEFIX_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            ),
        };
        if api.timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "PRIMEFIX_REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let defaults = ShippingPolicy::default();
        let shipping = ShippingPolicy {
            free_shipping_threshold: env.amount(
                "PRIMEFIX_FREE_SHIPPING_THRESHOLD",
                defaults.free_shipping_threshold,
            )?,
            flat_fee: env.amount("PRIMEFIX_FLAT_SHIPPING_FEE", defaults.flat_fee)?,
        };

        let data_dir = PathBuf::from(
            env.optional("PRIMEFIX_DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        Ok(Self {
            api,
            shipping,
            data_dir,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable; empty strings count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Parse a non-negative money amount.
    fn amount(&self, key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
        let value: Decimal = self.parsed(key, default)?;
        if value.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must not be negative".to_string(),
            ));
        }
        Ok(value)
    }
}

/// Parse an API base URL and make sure it ends with `/`.
///
/// `Url::join` replaces the last path segment unless the base ends in a
/// slash, which would turn `.../api` + `orders` into `.../orders`.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
