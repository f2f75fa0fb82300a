//! Prime Fix storefront engine.
//!
//! Cart and wishlist state persisted through a pluggable key-value store,
//! threshold-shipping price computation and checkout orchestration against
//! the storefront REST API.
//!
//! ```no_run
//! use primefix_storefront::{Storefront, StorefrontConfig};
//!
//! # async fn run() -> Result<(), primefix_storefront::AppError> {
//! let mut storefront = Storefront::new(StorefrontConfig::from_env()?)?;
//! let mut checkout = storefront.begin_checkout(None).await;
//! checkout.form_mut().name = "Ada Lovelace".to_string();
//! // ... fill the remaining fields ...
//! let confirmation = storefront.place_order(&mut checkout).await?;
//! println!("order #{}", confirmation.order_id);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod pricing;
pub mod state;
pub mod storage;
pub mod wishlist;

pub use api::{ApiClient, ApiError};
pub use cart::{CartEvent, CartLineItem, CartSnapshot, CartStore};
pub use checkout::{Checkout, CheckoutApi, CheckoutError, CheckoutForm, Customer};
pub use config::{ApiConfig, ConfigError, StorefrontConfig};
pub use error::AppError;
pub use pricing::{PriceBreakdown, ShippingPolicy};
pub use state::Storefront;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use wishlist::WishlistStore;
