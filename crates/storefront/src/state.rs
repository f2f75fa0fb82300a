//! Application root owning the stores and the API client.

use std::sync::Arc;

use primefix_core::Price;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, PublicCoupon};
use crate::cart::{CartSnapshot, CartStore};
use crate::checkout::{Checkout, CheckoutError, CheckoutForm, Customer, OrderConfirmation};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::wishlist::WishlistStore;

/// The storefront a front end drives.
///
/// Owns the configuration, the API client, the cart and the wishlist. There
/// is exactly one per customer session; pass it (or borrows of its parts)
/// to whatever needs it.
#[derive(Debug)]
pub struct Storefront {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartStore,
    wishlist: WishlistStore,
}

impl Storefront {
    /// Open the storefront with a file-backed store under `config.data_dir`.
    ///
    /// If the data directory cannot be created the stores run in memory for
    /// the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let backend: Arc<dyn KeyValueStore> = match FileStore::open(&config.data_dir) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(
                    error = %e,
                    dir = %config.data_dir.display(),
                    "Data directory unavailable, cart will not be saved"
                );
                Arc::new(MemoryStore::new())
            }
        };
        Self::with_backend(config, backend)
    }

    /// Open the storefront over an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn with_backend(
        config: StorefrontConfig,
        backend: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppError> {
        let api = ApiClient::new(&config.api)?;
        let cart = CartStore::load(Arc::clone(&backend));
        let wishlist = WishlistStore::load(backend);

        info!(
            api = %config.api.base_url,
            cart_lines = cart.len(),
            wishlist = wishlist.len(),
            "Storefront ready"
        );

        Ok(Self {
            config,
            api,
            cart,
            wishlist,
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Get a reference to the API client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &WishlistStore {
        &self.wishlist
    }

    pub const fn wishlist_mut(&mut self) -> &mut WishlistStore {
        &mut self.wishlist
    }

    /// Cart with prices under the configured shipping policy.
    #[must_use]
    pub fn cart_snapshot(&self, discount: Price) -> CartSnapshot {
        self.cart.snapshot(&self.config.shipping, discount)
    }

    /// Coupons the store advertises, for one-click application.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn public_coupons(&self) -> Result<Vec<PublicCoupon>, ApiError> {
        self.api.public_coupons().await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Start a checkout session, pre-filled for `customer` when signed in.
    ///
    /// Payment settings are fetched to pre-select a method. If they cannot be
    /// loaded the session offers every method and the backend decides.
    pub async fn begin_checkout(&self, customer: Option<&Customer>) -> Checkout<ApiClient> {
        let form = customer.map_or_else(CheckoutForm::default, CheckoutForm::for_customer);
        let mut checkout = Checkout::new(
            self.api.clone(),
            self.config.shipping,
            self.config.api.website_id,
        )
        .with_form(form);

        match self.api.payment_settings().await {
            Ok(settings) => checkout.apply_payment_settings(settings),
            Err(e) => warn!(error = %e, "Failed to load payment settings"),
        }
        checkout
    }

    /// Apply a coupon to `checkout` against the current cart.
    ///
    /// # Errors
    ///
    /// See [`Checkout::validate_coupon`].
    pub async fn apply_coupon(
        &self,
        checkout: &mut Checkout<ApiClient>,
        code: &str,
    ) -> Result<(), CheckoutError> {
        checkout.validate_coupon(code, &self.cart).await.map(|_| ())
    }

    /// Submit the order of `checkout`. Clears the cart on success.
    ///
    /// # Errors
    ///
    /// See [`Checkout::submit_order`].
    pub async fn place_order(
        &mut self,
        checkout: &mut Checkout<ApiClient>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        checkout.submit_order(&mut self.cart).await
    }
}
