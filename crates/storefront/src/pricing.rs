//! Order price computation.
//!
//! Everything here is pure: the same subtotal, policy and discount always
//! produce the same [`PriceBreakdown`].
//!
//! - `subtotal = sum(unit_price * quantity)`
//! - `shipping = 0` when `subtotal > threshold`, otherwise the flat fee
//! - `total = max(0, subtotal + shipping - discount)`

use primefix_core::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;

/// Subtotal above which shipping is free (strictly above).
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: i64 = 500;

/// Shipping fee charged at or below the threshold.
pub const DEFAULT_FLAT_SHIPPING_FEE: i64 = 49;

/// Threshold-based shipping policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    pub free_shipping_threshold: Decimal,
    pub flat_fee: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::from(DEFAULT_FREE_SHIPPING_THRESHOLD),
            flat_fee: Decimal::from(DEFAULT_FLAT_SHIPPING_FEE),
        }
    }
}

impl ShippingPolicy {
    /// Whether `subtotal` ships for free.
    ///
    /// The comparison is strict: a subtotal equal to the threshold pays the fee.
    #[must_use]
    pub fn is_free(&self, subtotal: Price) -> bool {
        subtotal.amount > self.free_shipping_threshold
    }

    /// Shipping fee for `subtotal`.
    #[must_use]
    pub fn fee_for(&self, subtotal: Price) -> Price {
        if self.is_free(subtotal) {
            Price::new(Decimal::ZERO, subtotal.currency_code)
        } else {
            Price::new(self.flat_fee, subtotal.currency_code)
        }
    }

    /// How far `subtotal` is from the threshold.
    ///
    /// The customer must spend *more than* this amount to ship for free.
    /// Zero once shipping is already free.
    #[must_use]
    pub fn amount_until_free(&self, subtotal: Price) -> Price {
        let gap = Price::new(self.free_shipping_threshold, subtotal.currency_code) - subtotal;
        if self.is_free(subtotal) {
            Price::new(Decimal::ZERO, subtotal.currency_code)
        } else {
            gap.clamp_non_negative()
        }
    }

    /// Price an order with the given subtotal and coupon discount.
    ///
    /// Negative discounts are treated as zero. The total is clamped at zero
    /// when the discount exceeds subtotal plus shipping.
    #[must_use]
    pub fn quote(&self, subtotal: Price, discount: Price) -> PriceBreakdown {
        let shipping_fee = self.fee_for(subtotal);
        let discount = discount.clamp_non_negative();
        let total = (subtotal + shipping_fee - discount).clamp_non_negative();

        PriceBreakdown {
            subtotal,
            shipping_fee,
            discount,
            total,
        }
    }
}

/// Sum of line totals.
pub fn subtotal<'a>(lines: impl IntoIterator<Item = &'a CartLineItem>) -> Price {
    lines.into_iter().map(CartLineItem::line_total).sum()
}

/// Sum of line totals, or `None` if any step overflows.
pub fn checked_subtotal<'a>(lines: impl IntoIterator<Item = &'a CartLineItem>) -> Option<Price> {
    lines.into_iter().try_fold(Price::zero(), |sum, line| {
        sum.checked_add(line.checked_line_total()?)
    })
}

/// Derived prices for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub discount: Price,
    pub total: Price,
}

impl PriceBreakdown {
    /// Whether shipping is free for this breakdown.
    #[must_use]
    pub fn is_free_shipping(&self) -> bool {
        self.shipping_fee.is_zero()
    }
}
