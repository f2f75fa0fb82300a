//! Shopping cart store.
//!
//! The cart is the single source of truth for the basket. It lives for the
//! whole browsing session, survives restarts through the [`KeyValueStore`]
//! port, and announces changes as [`CartEvent`]s so presentation code (the
//! cart drawer, the navbar badge) can react without the store knowing about
//! it.

use std::sync::Arc;

use primefix_core::{Price, Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::pricing::{self, PriceBreakdown, ShippingPolicy};
use crate::storage::KeyValueStore;
use crate::storage::document::PersistedList;
use crate::storage::keys;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 32;

/// A product and quantity in the cart.
///
/// Serialized as `{id, name, price, image_url, slug, quantity}`, which is
/// also the shape the browser storefront kept in local storage, so carts
/// saved there load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLineItem {
    fn new(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            slug: product.slug.clone(),
            quantity,
        }
    }

    /// Price of a single unit.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price().times(self.quantity)
    }

    /// `unit_price * quantity`, or `None` if it does not fit a decimal.
    #[must_use]
    pub fn checked_line_total(&self) -> Option<Price> {
        self.unit_price().checked_times(self.quantity)
    }
}

/// Something that happened to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A product was added (or its quantity bumped by an add).
    ///
    /// The presentation layer opens the cart drawer on this event.
    ItemAdded {
        product_id: ProductId,
        added: u32,
        line_quantity: u32,
    },
    /// A line's quantity was set explicitly.
    QuantityChanged { product_id: ProductId, quantity: u32 },
    /// A line was removed.
    ItemRemoved { product_id: ProductId },
    /// Every line was removed.
    Cleared,
}

/// The cart with its derived prices, computed at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub items: Vec<CartLineItem>,
    pub pricing: PriceBreakdown,
}

impl CartSnapshot {
    /// Whether the snapshot holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The shopping cart.
///
/// Mutations are synchronous and write the whole item list to storage
/// before returning. None of them fail: invalid requests are no-ops and
/// storage problems only cost durability.
pub struct CartStore {
    items: Vec<CartLineItem>,
    subtotal: Price,
    drawer_open: bool,
    persistence: PersistedList<CartLineItem>,
    events: broadcast::Sender<CartEvent>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("subtotal", &self.subtotal)
            .field("drawer_open", &self.drawer_open)
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Restore the cart from `backend`, or start empty.
    ///
    /// Lines with a zero quantity are dropped and duplicate product IDs are
    /// merged, so a hand-edited or legacy document cannot break the cart's
    /// invariants. Lines whose price pushes the total out of the decimal
    /// range are dropped too.
    #[must_use]
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let persistence = PersistedList::<CartLineItem>::new(keys::CART, backend);

        let mut items: Vec<CartLineItem> = Vec::new();
        for line in persistence.load() {
            if line.quantity == 0 {
                continue;
            }
            match items.iter_mut().find(|existing| existing.id == line.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => items.push(line),
            }
        }

        let mut subtotal = Price::zero();
        items.retain(|line| {
            match line
                .checked_line_total()
                .and_then(|line_total| subtotal.checked_add(line_total))
            {
                Some(sum) => {
                    subtotal = sum;
                    true
                }
                None => {
                    warn!(product_id = %line.id, "Dropping saved cart line, total out of range");
                    false
                }
            }
        });

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            items,
            subtotal,
            drawer_open: false,
            persistence,
            events,
        }
    }

    /// Subscribe to cart events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same product has its quantity increased; no
    /// duplicate line is created. A zero quantity is ignored, as is an add
    /// that would push the cart total out of range. Opens the cart drawer and
    /// emits [`CartEvent::ItemAdded`].
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            debug!(product_id = %product.id, "Ignoring add with zero quantity");
            return;
        }

        let (unit_price, line_quantity) = self
            .get(product.id)
            .map_or((product.price, quantity), |line| {
                (line.price, line.quantity.saturating_add(quantity))
            });
        if self.subtotal_with(product.id, unit_price, line_quantity).is_none() {
            warn!(product_id = %product.id, line_quantity, "Rejected add, cart total out of range");
            return;
        }

        let line_quantity = match self.items.iter_mut().find(|line| line.id == product.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.quantity
            }
            None => {
                self.items.push(CartLineItem::new(product, quantity));
                quantity
            }
        };

        debug!(product_id = %product.id, added = quantity, line_quantity, "Added to cart");
        self.drawer_open = true;
        self.commit(CartEvent::ItemAdded {
            product_id: product.id,
            added: quantity,
            line_quantity,
        });
    }

    /// Remove the line for `product_id`. Missing products are a no-op.
    pub fn remove_item(&mut self, product_id: ProductId) {
        let before = self.items.len();
        self.items.retain(|line| line.id != product_id);
        if self.items.len() == before {
            return;
        }

        debug!(%product_id, "Removed from cart");
        self.commit(CartEvent::ItemRemoved { product_id });
    }

    /// Set the quantity of an existing line.
    ///
    /// Quantities below 1 are rejected (the line is kept as is; removal goes
    /// through [`remove_item`](Self::remove_item)). Missing products are a
    /// no-op. Returns whether the cart changed.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> bool {
        let Ok(quantity) = u32::try_from(quantity) else {
            debug!(%product_id, quantity, "Rejected quantity update");
            return false;
        };
        if quantity == 0 {
            debug!(%product_id, "Rejected quantity update to zero");
            return false;
        }

        let Some(line) = self.get(product_id) else {
            return false;
        };
        if line.quantity == quantity {
            return false;
        }
        if self.subtotal_with(product_id, line.price, quantity).is_none() {
            warn!(%product_id, quantity, "Rejected quantity update, cart total out of range");
            return false;
        }

        if let Some(line) = self.items.iter_mut().find(|line| line.id == product_id) {
            line.quantity = quantity;
        }
        debug!(%product_id, quantity, "Updated cart quantity");
        self.commit(CartEvent::QuantityChanged {
            product_id,
            quantity,
        });
        true
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
        debug!("Cleared cart");
        self.commit(CartEvent::Cleared);
    }

    fn commit(&mut self, event: CartEvent) {
        self.recalculate();
        self.persistence.save(&self.items);
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn recalculate(&mut self) {
        self.subtotal = pricing::subtotal(&self.items);
    }

    /// Subtotal if the line for `product_id` held `quantity` units at
    /// `unit_price`, or `None` if that overflows.
    fn subtotal_with(
        &self,
        product_id: ProductId,
        unit_price: Decimal,
        quantity: u32,
    ) -> Option<Price> {
        let others = self.items.iter().filter(|line| line.id != product_id);
        pricing::checked_subtotal(others)?.checked_add(Price::usd(unit_price).checked_times(quantity)?)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// `sum(unit_price * quantity)` over all lines.
    ///
    /// Maintained on every mutation, so reading it is constant time.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.subtotal
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.id == product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Copy of the lines with prices derived under `policy` and `discount`.
    #[must_use]
    pub fn snapshot(&self, policy: &ShippingPolicy, discount: Price) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            pricing: policy.quote(self.subtotal, discount),
        }
    }

    /// Whether writes to storage were abandoned after a failure.
    #[must_use]
    pub const fn is_persistence_degraded(&self) -> bool {
        self.persistence.is_degraded()
    }

    // =========================================================================
    // Drawer
    // =========================================================================

    /// Whether the cart drawer should be shown.
    #[must_use]
    pub const fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }

    /// Show the cart drawer.
    pub const fn open_drawer(&mut self) {
        self.drawer_open = true;
    }

    /// Hide the cart drawer.
    pub const fn close_drawer(&mut self) {
        self.drawer_open = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::storage::document::tests::BrokenStore;

    fn product(id: i64, price: i64) -> Product {
        Product::new(ProductId::new(id), format!("Printer {id}"), Decimal::from(price))
    }

    fn empty_cart() -> (Arc<MemoryStore>, CartStore) {
        let backend = Arc::new(MemoryStore::new());
        let cart = CartStore::load(backend.clone());
        (backend, cart)
    }

    #[test]
    fn test_add_same_product_twice_merges_lines() {
        let (_, mut cart) = empty_cart();
        let p = product(1, 100);

        cart.add_item(&p, 1);
        cart.add_item(&p, 1);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(p.id).unwrap().quantity, 2);
    }

    #[test]
    fn test_add_zero_quantity_is_ignored() {
        let (_, mut cart) = empty_cart();
        cart.add_item(&product(1, 100), 0);
        assert!(cart.is_empty());
        assert!(!cart.is_drawer_open());
    }

    #[test]
    fn test_add_copies_only_cart_fields() {
        let (_, mut cart) = empty_cart();
        let p = product(9, 10).with_image("ink.png");
        cart.add_item(&p, 3);

        let line = cart.get(p.id).unwrap();
        assert_eq!(line.name, "Printer 9");
        assert_eq!(line.image_url.as_deref(), Some("ink.png"));
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn test_update_quantity_below_one_is_rejected() {
        let (_, mut cart) = empty_cart();
        let p = product(1, 100);
        cart.add_item(&p, 3);

        assert!(!cart.update_quantity(p.id, 0));
        assert!(!cart.update_quantity(p.id, -1));
        assert!(!cart.update_quantity(p.id, i64::MIN));

        assert_eq!(cart.get(p.id).unwrap().quantity, 3);
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let (_, mut cart) = empty_cart();
        let p = product(1, 100);
        cart.add_item(&p, 1);

        assert!(cart.update_quantity(p.id, 5));
        assert_eq!(cart.get(p.id).unwrap().quantity, 5);
        assert_eq!(cart.total().amount, Decimal::from(500));
    }

    #[test]
    fn test_update_quantity_missing_product_is_noop() {
        let (_, mut cart) = empty_cart();
        cart.add_item(&product(1, 100), 1);
        assert!(!cart.update_quantity(ProductId::new(2), 4));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_missing_product_is_noop() {
        let (_, mut cart) = empty_cart();
        cart.add_item(&product(1, 100), 1);
        cart.remove_item(ProductId::new(99));
        assert_eq!(cart.len(), 1);

        cart.remove_item(ProductId::new(1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_matches_example_cart() {
        let (_, mut cart) = empty_cart();
        cart.add_item(&product(1, 100), 2);
        cart.add_item(&product(2, 50), 1);

        assert_eq!(cart.total().amount, Decimal::from(250));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_total_is_exact_with_cents() {
        let (_, mut cart) = empty_cart();
        let toner = Product::new(ProductId::new(1), "Toner", Decimal::new(1999, 2));
        let paper = Product::new(ProductId::new(2), "Paper", Decimal::new(10, 2));
        cart.add_item(&toner, 3);
        cart.add_item(&paper, 3);

        assert_eq!(cart.total().amount, Decimal::new(6027, 2));
    }

    #[test]
    fn test_clear_empties_cart() {
        let (_, mut cart) = empty_cart();
        cart.add_item(&product(1, 100), 2);
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_state_survives_reload() {
        let (backend, mut cart) = empty_cart();
        cart.add_item(&product(1, 100), 2);
        cart.add_item(&product(2, 50), 1);
        cart.add_item(&product(3, 5), 1);
        cart.update_quantity(ProductId::new(2), 4);
        cart.remove_item(ProductId::new(3));

        let reloaded = CartStore::load(backend);
        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.total(), cart.total());
    }

    #[test]
    fn test_empty_cart_survives_reload() {
        let (backend, mut cart) = empty_cart();
        cart.add_item(&product(1, 100), 1);
        cart.clear();

        let reloaded = CartStore::load(backend.clone());
        assert!(reloaded.is_empty());
        assert!(backend.get(keys::CART).unwrap().is_some());
    }

    #[test]
    fn test_load_legacy_browser_cart() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set(
                keys::CART,
                r#"[
                    {"id": 1, "name": "LaserJet", "price": "100.00", "image_url": "lj.png",
                     "category": "Printers", "stock": 4, "quantity": 2},
                    {"id": 2, "name": "Toner", "price": 50, "quantity": 1}
                ]"#,
            )
            .unwrap();

        let cart = CartStore::load(backend);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total().amount, Decimal::from(250));
    }

    #[test]
    fn test_load_sanitizes_zero_and_duplicate_lines() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set(
                keys::CART,
                r#"{"version": 1, "items": [
                    {"id": 1, "name": "A", "price": "10", "quantity": 0},
                    {"id": 2, "name": "B", "price": "10", "quantity": 1},
                    {"id": 2, "name": "B", "price": "10", "quantity": 2}
                ]}"#,
            )
            .unwrap();

        let cart = CartStore::load(backend);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId::new(2)).unwrap().quantity, 3);
    }

    #[test]
    fn test_load_drops_lines_with_out_of_range_totals() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set(
                keys::CART,
                r#"[
                    {"id": 1, "name": "X", "price": "79228162514264337593543950335", "quantity": 2},
                    {"id": 2, "name": "Toner", "price": "50", "quantity": 1}
                ]"#,
            )
            .unwrap();

        let cart = CartStore::load(backend);
        assert_eq!(cart.len(), 1);
        assert!(cart.get(ProductId::new(1)).is_none());
        assert_eq!(cart.total().amount, Decimal::from(50));
    }

    #[test]
    fn test_mutations_that_overflow_the_total_are_rejected() {
        let (_, mut cart) = empty_cart();
        let huge = Product::new(ProductId::new(1), "Gold Press", Decimal::MAX);
        cart.add_item(&huge, 1);
        assert_eq!(cart.total().amount, Decimal::MAX);

        cart.add_item(&huge, 1);
        cart.add_item(&product(2, 1), 1);
        assert!(!cart.update_quantity(huge.id, 3));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(huge.id).unwrap().quantity, 1);
        assert_eq!(cart.total().amount, Decimal::MAX);
    }

    #[test]
    fn test_load_malformed_starts_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(keys::CART, "][").unwrap();
        assert!(CartStore::load(backend).is_empty());
    }

    #[test]
    fn test_broken_storage_keeps_memory_state() {
        let mut cart = CartStore::load(Arc::new(BrokenStore));
        let p = product(1, 100);
        cart.add_item(&p, 1);
        cart.add_item(&p, 1);

        assert!(cart.is_persistence_degraded());
        assert_eq!(cart.get(p.id).unwrap().quantity, 2);
        assert_eq!(cart.total().amount, Decimal::from(200));
    }

    #[test]
    fn test_add_emits_event_and_opens_drawer() {
        let (_, mut cart) = empty_cart();
        let mut events = cart.subscribe();
        let p = product(4, 20);

        cart.add_item(&p, 2);
        cart.add_item(&p, 1);

        assert!(cart.is_drawer_open());
        assert_eq!(
            events.try_recv().unwrap(),
            CartEvent::ItemAdded {
                product_id: p.id,
                added: 2,
                line_quantity: 2
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            CartEvent::ItemAdded {
                product_id: p.id,
                added: 1,
                line_quantity: 3
            }
        );

        cart.close_drawer();
        assert!(!cart.is_drawer_open());
    }

    #[test]
    fn test_noops_emit_no_events() {
        let (_, mut cart) = empty_cart();
        let p = product(1, 100);
        cart.add_item(&p, 1);
        let mut events = cart.subscribe();

        cart.remove_item(ProductId::new(42));
        cart.update_quantity(p.id, 0);
        cart.update_quantity(p.id, 1);

        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_snapshot_prices_cart() {
        let (_, mut cart) = empty_cart();
        cart.add_item(&product(1, 100), 2);
        cart.add_item(&product(2, 50), 1);

        let policy = ShippingPolicy::default();
        let snapshot = cart.snapshot(&policy, Price::zero());
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.pricing.total.amount, Decimal::from(299));

        let discounted = cart.snapshot(&policy, Price::usd(Decimal::from(30)));
        assert_eq!(discounted.pricing.total.amount, Decimal::from(269));
    }
}
