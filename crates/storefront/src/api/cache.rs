//! Cache types for storefront API responses.

use super::types::{PaymentSettings, PublicCoupon};

/// Cache key for read-mostly endpoints.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    PublicCoupons,
    PaymentSettings,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    PublicCoupons(Vec<PublicCoupon>),
    PaymentSettings(PaymentSettings),
}
