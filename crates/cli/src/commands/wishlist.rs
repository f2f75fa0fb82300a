//! `pf-cli wishlist` subcommands.

use primefix_core::Product;
use primefix_storefront::Storefront;

/// Print saved products.
pub fn list(storefront: &Storefront) {
    let wishlist = storefront.wishlist();
    if wishlist.is_empty() {
        println!("Your wishlist is empty.");
        return;
    }

    for product in wishlist.items() {
        let in_cart = if storefront.cart().get(product.id).is_some() {
            " (in cart)"
        } else {
            ""
        };
        println!(
            "{:<8} {:<32} {:>12}{in_cart}",
            product.id.to_string(),
            product.name,
            product.unit_price().to_string()
        );
    }
}

/// Save `product`, or unsave it if already saved.
pub fn toggle(storefront: &mut Storefront, product: &Product) {
    if storefront.wishlist_mut().toggle(product) {
        println!("Saved {} to your wishlist.", product.name);
    } else {
        println!("Removed {} from your wishlist.", product.name);
    }
}
