//! `pf-cli cart` subcommands.

use primefix_core::{Price, Product, ProductId};
use primefix_storefront::{AppError, Storefront};

/// Print every line and the price summary.
pub fn show(storefront: &Storefront) {
    let snapshot = storefront.cart_snapshot(Price::zero());
    if snapshot.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    println!("{:<8} {:<32} {:>5} {:>12}", "ID", "Product", "Qty", "Line total");
    for line in &snapshot.items {
        println!(
            "{:<8} {:<32} {:>5} {:>12}",
            line.id.to_string(),
            line.name,
            line.quantity,
            line.line_total().to_string()
        );
    }
    println!();
    super::print_pricing(&snapshot.pricing, &storefront.config().shipping);
}

/// Add `quantity` units of `product`.
pub fn add(storefront: &mut Storefront, product: &Product, quantity: u32) {
    if quantity == 0 {
        println!("Nothing to add.");
        return;
    }

    let cart = storefront.cart_mut();
    cart.add_item(product, quantity);
    let in_cart = cart.get(product.id).map_or(0, |line| line.quantity);
    println!("Added {quantity} x {} ({in_cart} in cart).", product.name);
    warn_if_unsaved(storefront);
}

/// Remove a product.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product is not in the cart.
pub fn remove(storefront: &mut Storefront, id: ProductId) -> Result<(), AppError> {
    let Some(name) = storefront.cart().get(id).map(|line| line.name.clone()) else {
        return Err(AppError::NotFound(format!("product {id} is not in the cart")));
    };

    storefront.cart_mut().remove_item(id);
    println!("Removed {name}.");
    warn_if_unsaved(storefront);
    Ok(())
}

/// Set the quantity of a product already in the cart.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product is not in the cart.
pub fn update(storefront: &mut Storefront, id: ProductId, quantity: i64) -> Result<(), AppError> {
    if storefront.cart().get(id).is_none() {
        return Err(AppError::NotFound(format!("product {id} is not in the cart")));
    }
    if quantity < 1 {
        println!("Quantity must be at least 1; use `pf-cli cart remove {id}` to remove it.");
        return Ok(());
    }

    if storefront.cart_mut().update_quantity(id, quantity) {
        println!("Quantity of product {id} set to {quantity}.");
        warn_if_unsaved(storefront);
    } else {
        println!("Quantity of product {id} is already {quantity}.");
    }
    Ok(())
}

/// Remove every product.
pub fn clear(storefront: &mut Storefront) {
    storefront.cart_mut().clear();
    println!("Cart cleared.");
    warn_if_unsaved(storefront);
}

fn warn_if_unsaved(storefront: &Storefront) {
    if storefront.cart().is_persistence_degraded() {
        println!("Note: the cart could not be saved and will be lost when this command exits.");
    }
}
