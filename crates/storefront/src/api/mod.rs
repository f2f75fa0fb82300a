//! Storefront REST API client.
//!
//! The backend is an opaque HTTP JSON service. This client covers the four
//! endpoints the checkout needs:
//!
//! - `POST /coupons/validate` - server-side coupon validation
//! - `POST /orders` - order creation
//! - `GET /coupons/public` - advertised coupons (cached)
//! - `GET /settings` - enabled payment methods (cached)
//!
//! Read-mostly responses are cached for 5 minutes using `moka`. Every request
//! carries the configured timeout and, when present, the customer's bearer
//! token.

mod cache;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use primefix_core::{Price, WebsiteId};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};
pub use types::{
    AppliedCoupon, CouponValidationRequest, OrderLine, OrderReceipt, OrderRequest,
    PaymentSettings, PublicCoupon,
};

/// How long coupon lists and settings stay cached.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Message the backend uses for expired or forged tokens.
const INVALID_TOKEN_MESSAGE: &str = "Invalid Token";

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The bearer token was missing, expired or rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured bearer token cannot be sent as a header.
    #[error("Bearer token contains invalid header characters")]
    InvalidToken,
}

impl ApiError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }

    /// Message safe to show to the customer.
    ///
    /// Backend validation messages ("Coupon expired", "Minimum order is
    /// $100") pass through; transport details do not.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { status, message } if (400..500).contains(status) => message.clone(),
            Self::Api { .. } => "The store is having trouble right now. Please try again.".to_string(),
            Self::Timeout => "The store took too long to respond. Please try again.".to_string(),
            Self::Http(_) => {
                "Could not reach the store. Check your connection and try again.".to_string()
            }
            Self::Unauthorized(_) => "Your session has expired. Please sign in again.".to_string(),
            Self::Parse(_) | Self::InvalidUrl(_) | Self::InvalidToken => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Extract the human-readable message from an error body.
///
/// The backend uses `message` for validation failures and `error` for
/// server failures.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|field| value.get(*field)?.as_str())
        .map(str::to_string)
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    website_id: WebsiteId,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("website_id", &self.inner.website_id)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| ApiError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .user_agent(concat!("primefix-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                website_id: config.website_id,
                cache,
            }),
        })
    }

    /// Drop cached coupon lists and settings.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and decode a JSON success body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::from_transport)?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

            if status == StatusCode::UNAUTHORIZED || message == INVALID_TOKEN_MESSAGE {
                warn!(status = %status, "Storefront API rejected credentials");
                return Err(ApiError::Unauthorized(message));
            }

            warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse storefront API response"
            );
            ApiError::Parse(e.to_string())
        })
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// Validate `code` against the current cart subtotal.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` with the backend's message when the code is
    /// unknown, expired or the cart is below the coupon minimum.
    #[instrument(skip(self, cart_total), fields(code = %code, cart_total = %cart_total))]
    pub async fn validate_coupon(
        &self,
        code: &str,
        cart_total: Price,
    ) -> Result<AppliedCoupon, ApiError> {
        let body = CouponValidationRequest {
            code,
            cart_total: cart_total.amount,
        };
        let request = self
            .inner
            .client
            .post(self.endpoint("coupons/validate")?)
            .json(&body);

        let coupon: AppliedCoupon = self.send(request).await?;
        info!(code = %coupon.code, discount = %coupon.discount_amount, "Coupon validated");
        Ok(coupon)
    }

    /// Coupons the store advertises.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn public_coupons(&self) -> Result<Vec<PublicCoupon>, ApiError> {
        if let Some(CacheValue::PublicCoupons(coupons)) =
            self.inner.cache.get(&CacheKey::PublicCoupons).await
        {
            debug!("Cache hit for public coupons");
            return Ok(coupons);
        }

        let request = self.inner.client.get(self.endpoint("coupons/public")?);
        let coupons: Vec<PublicCoupon> = self.send(request).await?;

        self.inner
            .cache
            .insert(
                CacheKey::PublicCoupons,
                CacheValue::PublicCoupons(coupons.clone()),
            )
            .await;
        Ok(coupons)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Payment settings of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn payment_settings(&self) -> Result<PaymentSettings, ApiError> {
        if let Some(CacheValue::PaymentSettings(settings)) =
            self.inner.cache.get(&CacheKey::PaymentSettings).await
        {
            debug!("Cache hit for payment settings");
            return Ok(settings);
        }

        let request = self.inner.client.get(self.endpoint("settings")?);
        let settings: PaymentSettings = self.send(request).await?;

        self.inner
            .cache
            .insert(
                CacheKey::PaymentSettings,
                CacheValue::PaymentSettings(settings.clone()),
            )
            .await;
        Ok(settings)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Create an order. Sends exactly one request; never retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response carries no
    /// order ID.
    #[instrument(
        skip(self, order),
        fields(lines = order.items.len(), total = %order.total_amount)
    )]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderReceipt, ApiError> {
        let request = self.inner.client.post(self.endpoint("orders")?).json(order);

        let receipt: OrderReceipt = self.send(request).await?;
        info!(order_id = %receipt.order_id, "Order created");
        Ok(receipt)
    }
}
