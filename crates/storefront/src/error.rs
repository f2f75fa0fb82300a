//! Unified error handling.
//!
//! Provides a unified `AppError` type for front ends that drive the
//! storefront. Each module keeps its own error enum; `AppError` wraps them and
//! decides what the customer gets to read.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storefront API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout step was rejected or failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Requested product is not in the cart or wishlist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Whether this is worth an `error!` log rather than a notice.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Api(err) => matches!(err, ApiError::Parse(_) | ApiError::InvalidUrl(_)),
            Self::Checkout(_) | Self::NotFound(_) => false,
        }
    }

    /// Notice shown to the customer.
    ///
    /// Internal details (file paths, backend stack traces) never leak here.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_internal() {
            tracing::error!(error = %self, "Storefront error");
        }

        match self {
            Self::Config(_) => "The storefront is not configured correctly".to_string(),
            Self::Api(err) => err.user_message(),
            Self::Checkout(err) => err.user_message(),
            Self::NotFound(_) => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::FormError;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 12".to_string());
        assert_eq!(err.to_string(), "Not found: product 12");

        let err = AppError::from(ConfigError::MissingEnvVar("PRIMEFIX_API_URL".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: PRIMEFIX_API_URL"
        );
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let config = AppError::from(ConfigError::InvalidEnvVar(
            "PRIMEFIX_DATA_DIR".to_string(),
            "/home/ada/.primefix".to_string(),
        ));
        assert!(!config.user_message().contains("/home/ada"));

        let server = AppError::from(ApiError::Api {
            status: 500,
            message: "SQLSTATE[42S02]".to_string(),
        });
        assert!(!server.user_message().contains("SQLSTATE"));

        let parse = AppError::from(ApiError::Parse("expected value at line 1".to_string()));
        assert!(parse.is_internal());
        assert!(!parse.user_message().contains("line 1"));
    }

    #[test]
    fn test_user_message_passes_validation_through() {
        let coupon = AppError::from(CheckoutError::Api(ApiError::Api {
            status: 400,
            message: "Coupon expired".to_string(),
        }));
        assert_eq!(coupon.user_message(), "Coupon expired");

        let form = AppError::from(CheckoutError::Form(FormError::MissingField("City")));
        assert_eq!(form.user_message(), "City is required");
        assert!(!form.is_internal());
    }
}
