//! Wishlist store.
//!
//! Same persistence rules as the cart, minus quantities: one button flips a
//! product in or out.

use std::sync::Arc;

use primefix_core::{Product, ProductId};
use tracing::debug;

use crate::storage::KeyValueStore;
use crate::storage::document::PersistedList;
use crate::storage::keys;

/// Saved products, unique by ID, in the order they were saved.
#[derive(Debug)]
pub struct WishlistStore {
    entries: Vec<Product>,
    persistence: PersistedList<Product>,
}

impl WishlistStore {
    /// Restore the wishlist from `backend`, or start empty.
    #[must_use]
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let persistence = PersistedList::<Product>::new(keys::WISHLIST, backend);

        let mut entries: Vec<Product> = Vec::new();
        for product in persistence.load() {
            if !entries.iter().any(|entry| entry.id == product.id) {
                entries.push(product);
            }
        }

        Self {
            entries,
            persistence,
        }
    }

    /// Add `product` if absent, remove it if present.
    ///
    /// Returns whether the product is in the wishlist afterwards.
    pub fn toggle(&mut self, product: &Product) -> bool {
        let now_present = if let Some(index) = self.position(product.id) {
            self.entries.remove(index);
            false
        } else {
            self.entries.push(product.clone());
            true
        };

        debug!(product_id = %product.id, now_present, "Toggled wishlist");
        self.persistence.save(&self.entries);
        now_present
    }

    /// Remove `product_id`. Missing products are a no-op.
    pub fn remove(&mut self, product_id: ProductId) {
        if let Some(index) = self.position(product_id) {
            self.entries.remove(index);
            self.persistence.save(&self.entries);
        }
    }

    /// Whether `product_id` is saved.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.position(product_id).is_some()
    }

    /// Saved products.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.entries
    }

    /// Number of saved products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == product_id)
    }
}
