//! Status enums for checkout.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::OrderId;

/// How the customer pays for an order.
///
/// Serialized with the exact strings the order API expects in
/// `payment_method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[serde(rename = "COD")]
    CashOnDelivery,
    /// PayPal or card through the PayPal widget.
    #[serde(rename = "PayPal")]
    PayPal,
}

impl PaymentMethod {
    /// Wire value sent to the order API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "COD",
            Self::PayPal => "PayPal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" | "cash" => Ok(Self::CashOnDelivery),
            "paypal" => Ok(Self::PayPal),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Where a checkout session currently stands.
///
/// ```text
/// Idle -> FormEditing -> CouponPending -> CouponApplied -> Submitting -> Succeeded
///              ^               |                               |
///              +---------------+            Failed <-----------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    /// Nothing entered yet.
    #[default]
    Idle,
    /// The customer is filling the form; no coupon is applied.
    FormEditing,
    /// A coupon validation request is outstanding.
    CouponPending,
    /// A coupon was validated and its discount is in effect.
    CouponApplied,
    /// An order request is outstanding; further submissions are rejected.
    Submitting,
    /// The order was created.
    Succeeded(OrderId),
    /// The last submission failed; the customer may retry.
    Failed(String),
}

impl CheckoutPhase {
    /// Whether the session is waiting on the network.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::CouponPending | Self::Submitting)
    }
}
