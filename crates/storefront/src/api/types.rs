//! Request and response bodies of the storefront REST API.
//!
//! Money goes out as JSON numbers (what the backend expects) and comes back
//! as either numbers or decimal strings.

use primefix_core::{OrderId, PaymentMethod, Price, ProductId, UserId, WebsiteId};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Coupons
// =============================================================================

/// Body of `POST /coupons/validate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidationRequest<'a> {
    pub code: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub cart_total: Decimal,
}

/// A coupon the backend accepted, with the discount it grants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_amount: Decimal,
}

impl AppliedCoupon {
    /// Discount as a [`Price`].
    #[must_use]
    pub const fn discount(&self) -> Price {
        Price::usd(self.discount_amount)
    }
}

/// A coupon advertised at `GET /coupons/public`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublicCoupon {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `percentage` or `fixed`; the backend computes the actual amount.
    #[serde(default)]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub discount_value: Option<Decimal>,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

impl PublicCoupon {
    /// Whether a cart subtotal meets the advertised minimum.
    ///
    /// Only a hint for the UI; the validation endpoint has the final word.
    #[must_use]
    pub fn is_eligible(&self, subtotal: Price) -> bool {
        self.min_order_amount
            .is_none_or(|minimum| subtotal.amount >= minimum)
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Payment configuration from `GET /settings`.
///
/// The backend stores switches as `"1"`/`"0"` strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PaymentSettings {
    #[serde(default, deserialize_with = "flag")]
    pub cod_enabled: bool,
    #[serde(default, deserialize_with = "flag")]
    pub paypal_enabled: bool,
    /// `live` or `sandbox`.
    #[serde(default)]
    pub paypal_mode: Option<String>,
    #[serde(default)]
    pub paypal_live_client_id: Option<String>,
    #[serde(default)]
    pub paypal_sandbox_client_id: Option<String>,
}

impl PaymentSettings {
    /// Enabled methods, cash on delivery first.
    #[must_use]
    pub fn enabled_methods(&self) -> Vec<PaymentMethod> {
        let mut methods = Vec::with_capacity(2);
        if self.cod_enabled {
            methods.push(PaymentMethod::CashOnDelivery);
        }
        if self.paypal_enabled {
            methods.push(PaymentMethod::PayPal);
        }
        methods
    }

    /// Method pre-selected on the checkout form.
    #[must_use]
    pub fn default_method(&self) -> Option<PaymentMethod> {
        self.enabled_methods().into_iter().next()
    }

    /// Whether `method` may be used.
    #[must_use]
    pub const fn allows(&self, method: PaymentMethod) -> bool {
        match method {
            PaymentMethod::CashOnDelivery => self.cod_enabled,
            PaymentMethod::PayPal => self.paypal_enabled,
        }
    }
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Number(n)) => n == 1,
        Some(Flag::Text(s)) => matches!(s.trim(), "1" | "true"),
        None => false,
    })
}

// =============================================================================
// Orders
// =============================================================================

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Logged-in customer, `null` for guest checkout.
    pub user_id: Option<UserId>,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub website_id: WebsiteId,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Response of `POST /orders`.
///
/// The backend answers with either `orderId` or `order_id`, as a number or a
/// numeric string. Both are normalized into `order_id` here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawOrderReceipt")]
pub struct OrderReceipt {
    pub order_id: OrderId,
}

#[derive(Deserialize)]
struct RawOrderReceipt {
    #[serde(rename = "orderId", default)]
    camel: Option<serde_json::Value>,
    #[serde(default)]
    order_id: Option<serde_json::Value>,
}

impl TryFrom<RawOrderReceipt> for OrderReceipt {
    type Error = String;

    fn try_from(raw: RawOrderReceipt) -> Result<Self, Self::Error> {
        let value = raw
            .camel
            .filter(|v| !v.is_null())
            .or_else(|| raw.order_id.filter(|v| !v.is_null()))
            .ok_or_else(|| "order response has no orderId or order_id".to_string())?;

        let id = match &value {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| format!("order id is not an integer: {value}"))?;

        Ok(Self {
            order_id: OrderId::new(id),
        })
    }
}
