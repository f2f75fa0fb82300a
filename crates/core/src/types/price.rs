//! Type-safe price representation using decimal arithmetic.
//!
//! Cart totals, shipping fees and coupon discounts are all computed with
//! [`Decimal`], so sums like `0.10 + 0.20` are exact and never drift the way
//! binary floating point does.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store's default currency.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// A zero amount in the store's default currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::usd(Decimal::ZERO)
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// Saturates at the decimal range; use [`checked_times`](Self::checked_times)
    /// where overflow must be detected.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(
            self.amount.saturating_mul(Decimal::from(quantity)),
            self.currency_code,
        )
    }

    /// Price of `quantity` units, or `None` if it does not fit a decimal.
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.amount
            .checked_mul(Decimal::from(quantity))
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// `self + rhs`, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.amount
            .checked_add(rhs.amount)
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Clamp negative amounts to zero.
    #[must_use]
    pub fn clamp_non_negative(self) -> Self {
        if self.amount.is_sign_negative() {
            Self::new(Decimal::ZERO, self.currency_code)
        } else {
            self
        }
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        )
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

// Mixed-currency arithmetic never happens in a single-currency store; the
// left-hand currency wins. Operators saturate instead of panicking.
impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.amount.saturating_add(rhs.amount), self.currency_code)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.amount.saturating_sub(rhs.amount), self.currency_code)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_multiplies_exactly() {
        let unit = Price::usd(Decimal::new(1999, 2));
        assert_eq!(unit.times(3).amount, Decimal::new(5997, 2));
    }

    #[test]
    fn test_sum_of_tenths_is_exact() {
        let total: Price = [Decimal::new(1, 1), Decimal::new(2, 1)]
            .into_iter()
            .map(Price::usd)
            .sum();
        assert_eq!(total.amount, Decimal::new(3, 1));
    }

    #[test]
    fn test_overflow_is_detected_or_saturated() {
        let huge = Price::usd(Decimal::MAX);
        assert_eq!(huge.checked_times(2), None);
        assert_eq!(huge.checked_add(Price::usd(Decimal::ONE)), None);
        assert_eq!(huge.checked_times(1), Some(huge));

        assert_eq!(huge.times(2).amount, Decimal::MAX);
        assert_eq!((huge + huge).amount, Decimal::MAX);
        let total: Price = [huge, huge].into_iter().sum();
        assert_eq!(total.amount, Decimal::MAX);
    }

    #[test]
    fn test_clamp_non_negative() {
        let negative = Price::usd(Decimal::new(-5, 0));
        assert!(negative.clamp_non_negative().is_zero());

        let positive = Price::usd(Decimal::new(5, 0));
        assert_eq!(positive.clamp_non_negative(), positive);
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Price::usd(Decimal::new(299, 0)).display(), "$299.00");
        assert_eq!(
            Price::new(Decimal::new(12345, 3), CurrencyCode::EUR).display(),
            "€12.35"
        );
    }
}
