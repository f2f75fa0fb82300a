//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod wishlist;

use primefix_storefront::{PriceBreakdown, ShippingPolicy};

/// Print the price summary shown under the cart and before checkout.
fn print_pricing(pricing: &PriceBreakdown, policy: &ShippingPolicy) {
    let shipping = if pricing.is_free_shipping() {
        "FREE".to_string()
    } else {
        pricing.shipping_fee.to_string()
    };

    println!("  Subtotal: {:>12}", pricing.subtotal.to_string());
    println!("  Shipping: {shipping:>12}");
    if !pricing.discount.is_zero() {
        println!("  Discount: {:>12}", format!("-{}", pricing.discount));
    }
    println!("  Total:    {:>12}", pricing.total.to_string());

    if !pricing.is_free_shipping() {
        println!(
            "  Add more than {} to ship for free.",
            policy.amount_until_free(pricing.subtotal)
        );
    }
}
