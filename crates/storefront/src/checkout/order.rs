//! Order payload assembly.

use primefix_core::{Email, OrderId, WebsiteId};

use super::form::ValidatedForm;
use crate::api::{OrderLine, OrderRequest};
use crate::cart::CartLineItem;
use crate::pricing::PriceBreakdown;

/// Build the `POST /orders` body from a validated form and the cart lines.
///
/// Unit prices are the ones captured when each product was added; the
/// backend re-prices nothing.
#[must_use]
pub fn build_order(
    form: &ValidatedForm,
    lines: &[CartLineItem],
    pricing: &PriceBreakdown,
    website_id: WebsiteId,
) -> OrderRequest {
    OrderRequest {
        user_id: form.user_id,
        guest_name: form.name.clone(),
        guest_email: form.email.to_string(),
        guest_phone: form.phone.clone(),
        shipping_address: form.shipping_address.clone(),
        payment_method: form.payment_method,
        items: lines
            .iter()
            .map(|line| OrderLine {
                product_id: line.id,
                quantity: line.quantity,
                price: line.price,
            })
            .collect(),
        total_amount: pricing.total.amount,
        website_id,
    }
}

/// An order that passed validation and is about to be sent.
///
/// Returned by [`Checkout::begin_submission`](super::Checkout::begin_submission);
/// hand it back to [`Checkout::finish_submission`](super::Checkout::finish_submission)
/// together with the API outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOrder {
    pub request: OrderRequest,
    pub pricing: PriceBreakdown,
    pub email: Email,
}

/// What the confirmation view shows after a successful order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub pricing: PriceBreakdown,
    pub email: Email,
}
