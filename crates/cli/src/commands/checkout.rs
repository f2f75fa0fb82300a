//! `pf-cli checkout` and `pf-cli coupons`.

use primefix_core::{PaymentMethod, UserId};
use primefix_storefront::{AppError, Customer, Storefront};
use tracing::info;

/// Checkout form values from the command line.
pub struct CheckoutRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub payment: Option<PaymentMethod>,
    pub coupon: Option<String>,
    pub user_id: Option<UserId>,
}

/// List advertised coupons, marking the ones the cart qualifies for.
///
/// # Errors
///
/// Returns an error if the coupons cannot be fetched.
pub async fn coupons(storefront: &Storefront) -> Result<(), AppError> {
    let coupons = storefront.public_coupons().await?;
    if coupons.is_empty() {
        println!("No coupons are available right now.");
        return Ok(());
    }

    let subtotal = storefront.cart().total();
    for coupon in &coupons {
        let marker = if coupon.is_eligible(subtotal) { "*" } else { " " };
        let description = coupon.description.as_deref().unwrap_or("");
        println!("{marker} {:<16} {description}", coupon.code);
    }
    println!();
    println!("* applies to your current cart");
    Ok(())
}

/// Fill the checkout form, apply the coupon and submit the order.
///
/// # Errors
///
/// Returns an error if the coupon is rejected, the form is incomplete or the
/// order cannot be created. The cart is kept in every error case.
pub async fn submit(storefront: &mut Storefront, request: CheckoutRequest) -> Result<(), AppError> {
    let customer = request.user_id.map(|id| Customer {
        id,
        name: request.name.clone(),
        email: request.email.clone(),
    });
    let mut checkout = storefront.begin_checkout(customer.as_ref()).await;

    let form = checkout.form_mut();
    form.name = request.name;
    form.email = request.email;
    form.phone = request.phone;
    form.address = request.address;
    form.city = request.city;
    form.zip = request.zip;
    if let Some(method) = request.payment {
        form.payment_method = Some(method);
    }

    if let Some(code) = request.coupon.as_deref() {
        storefront.apply_coupon(&mut checkout, code).await?;
        if let Some(coupon) = checkout.applied_coupon() {
            println!("Coupon {} applied.", coupon.code);
        }
    }

    println!("Order summary:");
    super::print_pricing(
        &checkout.quote(storefront.cart()),
        &storefront.config().shipping,
    );
    if let Some(method) = checkout.form().payment_method {
        println!("  Payment:  {method}");
    }
    println!();

    let confirmation = storefront.place_order(&mut checkout).await?;
    info!(order_id = %confirmation.order_id, "Checkout complete");
    println!(
        "Order #{} placed. Total {} ({}).",
        confirmation.order_id, confirmation.pricing.total, confirmation.email
    );
    Ok(())
}
