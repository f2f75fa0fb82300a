//! End-to-end tests for the Prime Fix storefront engine.
//!
//! Every test runs the real [`Storefront`] against a `wiremock` server that
//! plays the storefront REST API, so no network or backend is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p primefix-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - coupon and order submission against the mock API
//! - `persistence` - cart and wishlist surviving restarts on disk

use std::path::PathBuf;
use std::sync::Arc;

use primefix_core::{PaymentMethod, Product, ProductId};
use primefix_storefront::{
    CheckoutForm, KeyValueStore, MemoryStore, Storefront, StorefrontConfig,
};
use rust_decimal::Decimal;
use wiremock::MockServer;

/// A storefront wired to a fresh mock API.
pub struct TestContext {
    pub server: MockServer,
    pub backend: Arc<dyn KeyValueStore>,
    pub storefront: Storefront,
}

impl TestContext {
    /// Start a mock API and open a storefront over in-memory storage.
    ///
    /// # Panics
    ///
    /// Panics if the configuration or client cannot be built.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let storefront = Storefront::with_backend(config_for(&server, None), Arc::clone(&backend))
            .unwrap_or_else(|e| panic!("storefront failed to open: {e}"));

        Self {
            server,
            backend,
            storefront,
        }
    }

    /// Reopen the storefront over the same storage, as after a restart.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be rebuilt.
    #[must_use]
    pub fn restarted(&self) -> Storefront {
        Storefront::with_backend(config_for(&self.server, None), Arc::clone(&self.backend))
            .unwrap_or_else(|e| panic!("storefront failed to reopen: {e}"))
    }

    /// Fill the cart with the reference basket: 2 x $100 and 1 x $50.
    pub fn add_example_cart(&mut self) {
        let cart = self.storefront.cart_mut();
        cart.add_item(&laserjet(), 2);
        cart.add_item(&toner(), 1);
    }
}

/// Configuration pointing at `server`, optionally with its own data dir.
///
/// # Panics
///
/// Panics if the mock server URL is rejected.
#[must_use]
pub fn config_for(server: &MockServer, data_dir: Option<&PathBuf>) -> StorefrontConfig {
    let api_url = format!("{}/api", server.uri());
    let data_dir = data_dir.map(|dir| dir.display().to_string());

    StorefrontConfig::from_lookup(|key| match key {
        "PRIMEFIX_API_URL" => Some(api_url.clone()),
        "PRIMEFIX_REQUEST_TIMEOUT_SECS" => Some("2".to_string()),
        "PRIMEFIX_DATA_DIR" => data_dir.clone(),
        _ => None,
    })
    .unwrap_or_else(|e| panic!("invalid test config: {e}"))
}

/// A complete guest checkout form.
#[must_use]
pub fn guest_form() -> CheckoutForm {
    CheckoutForm {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "555-0100".to_string(),
        address: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        zip: "12345".to_string(),
        payment_method: Some(PaymentMethod::CashOnDelivery),
        user_id: None,
    }
}

/// Unique scratch directory under the system temp dir.
#[must_use]
pub fn scratch_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("primefix-{label}-{}", uuid::Uuid::new_v4()))
}

#[must_use]
pub fn laserjet() -> Product {
    Product::new(ProductId::new(1), "LaserJet Pro M404", Decimal::from(100)).with_image("m404.png")
}

#[must_use]
pub fn toner() -> Product {
    Product::new(ProductId::new(2), "Toner Cartridge 58A", Decimal::from(50))
}
