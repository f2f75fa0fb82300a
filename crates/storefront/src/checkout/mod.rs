//! Checkout orchestration.
//!
//! A [`Checkout`] is one customer's pass through the checkout page: it holds
//! the form, the applied coupon and the current [`CheckoutPhase`], and
//! sequences coupon validation and order submission against a
//! [`CheckoutApi`]. It never owns the cart; the caller lends it for each
//! operation.
//!
//! Order submission is split in two halves so an event-driven UI can lock
//! the button between click and response:
//!
//! ```text
//! begin_submission (sync)  ->  CheckoutApi::create_order  ->  finish_submission (sync)
//! ```
//!
//! [`Checkout::submit_order`] chains the three for callers that can simply
//! await.

mod form;
mod order;

use std::future::Future;

use primefix_core::{CheckoutPhase, PaymentMethod, Price, WebsiteId};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, AppliedCoupon, OrderReceipt, OrderRequest, PaymentSettings};
use crate::cart::CartStore;
use crate::pricing::{PriceBreakdown, ShippingPolicy};

pub use form::{CheckoutForm, Customer, FormError, ValidatedForm};
pub use order::{OrderConfirmation, PendingOrder, build_order};

/// Errors surfaced by checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Enter a coupon code")]
    BlankCouponCode,

    #[error("Coupon {0} is already applied; remove it first")]
    CouponAlreadyApplied(String),

    #[error("{0} is not available for this store")]
    PaymentMethodUnavailable(PaymentMethod),

    #[error("An order is already being submitted")]
    SubmissionInFlight,

    #[error("No order submission is in progress")]
    NotSubmitting,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Message safe to show to the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }

    /// Whether the customer can fix this by editing the form or coupon.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        match self {
            Self::EmptyCart
            | Self::Form(_)
            | Self::BlankCouponCode
            | Self::CouponAlreadyApplied(_)
            | Self::PaymentMethodUnavailable(_) => true,
            Self::Api(ApiError::Api { status, .. }) => *status >= 400 && *status < 500,
            _ => false,
        }
    }
}

/// The backend calls a checkout needs.
///
/// Implemented by [`ApiClient`]; tests substitute an in-process fake.
pub trait CheckoutApi: Send + Sync {
    /// Validate `code` against `cart_total`.
    fn validate_coupon(
        &self,
        code: &str,
        cart_total: Price,
    ) -> impl Future<Output = Result<AppliedCoupon, ApiError>> + Send;

    /// Create the order. Called once per submission attempt.
    fn create_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderReceipt, ApiError>> + Send;
}

impl CheckoutApi for ApiClient {
    async fn validate_coupon(
        &self,
        code: &str,
        cart_total: Price,
    ) -> Result<AppliedCoupon, ApiError> {
        Self::validate_coupon(self, code, cart_total).await
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderReceipt, ApiError> {
        Self::create_order(self, order).await
    }
}

/// Holds a session in `CouponPending` and puts it back to `FormEditing` when
/// dropped, so a cancelled request cannot leave the session locked.
struct CouponPending<'a> {
    phase: &'a mut CheckoutPhase,
}

impl<'a> CouponPending<'a> {
    fn enter(phase: &'a mut CheckoutPhase) -> Self {
        *phase = CheckoutPhase::CouponPending;
        Self { phase }
    }
}

impl Drop for CouponPending<'_> {
    fn drop(&mut self) {
        if *self.phase == CheckoutPhase::CouponPending {
            *self.phase = CheckoutPhase::FormEditing;
        }
    }
}

/// One checkout session.
#[derive(Debug)]
pub struct Checkout<A> {
    api: A,
    policy: ShippingPolicy,
    website_id: WebsiteId,
    form: CheckoutForm,
    phase: CheckoutPhase,
    coupon: Option<AppliedCoupon>,
    settings: Option<PaymentSettings>,
    notice: Option<String>,
}

impl<A: CheckoutApi> Checkout<A> {
    /// Start a session with an empty form.
    #[must_use]
    pub fn new(api: A, policy: ShippingPolicy, website_id: WebsiteId) -> Self {
        Self {
            api,
            policy,
            website_id,
            form: CheckoutForm::default(),
            phase: CheckoutPhase::Idle,
            coupon: None,
            settings: None,
            notice: None,
        }
    }

    /// Start a session with a pre-filled form.
    #[must_use]
    pub fn with_form(mut self, form: CheckoutForm) -> Self {
        self.form = form;
        self
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    /// The form as last edited.
    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Edit the form.
    ///
    /// Moves an idle or failed session to `FormEditing`.
    pub fn form_mut(&mut self) -> &mut CheckoutForm {
        if matches!(self.phase, CheckoutPhase::Idle | CheckoutPhase::Failed(_)) {
            self.phase = CheckoutPhase::FormEditing;
        }
        &mut self.form
    }

    /// The coupon in effect, if any.
    #[must_use]
    pub const fn applied_coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    /// Discount of the applied coupon, zero without one.
    #[must_use]
    pub fn discount(&self) -> Price {
        self.coupon
            .as_ref()
            .map_or_else(Price::zero, AppliedCoupon::discount)
    }

    /// Last user-facing error, cleared by the next successful step.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Prices for `cart` with the applied coupon.
    #[must_use]
    pub fn quote(&self, cart: &CartStore) -> PriceBreakdown {
        self.policy.quote(cart.total(), self.discount())
    }

    /// Apply the store's payment settings.
    ///
    /// Pre-selects the first enabled method unless the customer already
    /// picked one that is still allowed.
    pub fn apply_payment_settings(&mut self, settings: PaymentSettings) {
        let keep = self
            .form
            .payment_method
            .is_some_and(|method| settings.allows(method));
        if !keep {
            self.form.payment_method = settings.default_method();
        }
        self.settings = Some(settings);
    }

    /// Payment methods the customer may pick from.
    ///
    /// Both methods are offered until settings are applied.
    #[must_use]
    pub fn available_payment_methods(&self) -> Vec<PaymentMethod> {
        self.settings.as_ref().map_or_else(
            || vec![PaymentMethod::CashOnDelivery, PaymentMethod::PayPal],
            PaymentSettings::enabled_methods,
        )
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// Validate `code` against the current cart subtotal and apply it.
    ///
    /// # Errors
    ///
    /// - `CouponAlreadyApplied` while a coupon is in effect
    /// - `BlankCouponCode` for an empty code (no request is sent)
    /// - `SubmissionInFlight` while an order is being submitted
    /// - `Api` when the backend rejects the code or cannot be reached; the
    ///   session returns to `FormEditing`
    ///
    /// Dropping the future mid-request also returns the session to
    /// `FormEditing`.
    pub async fn validate_coupon(
        &mut self,
        code: &str,
        cart: &CartStore,
    ) -> Result<AppliedCoupon, CheckoutError> {
        if self.phase.is_busy() {
            return Err(CheckoutError::SubmissionInFlight);
        }
        if let Some(applied) = &self.coupon {
            return Err(CheckoutError::CouponAlreadyApplied(applied.code.clone()));
        }
        let code = code.trim();
        if code.is_empty() {
            return Err(CheckoutError::BlankCouponCode);
        }

        let cart_total = cart.total();
        let pending = CouponPending::enter(&mut self.phase);
        let outcome = self.api.validate_coupon(code, cart_total).await;
        drop(pending);

        match outcome {
            Ok(coupon) => {
                info!(code = %coupon.code, discount = %coupon.discount_amount, "Coupon applied");
                self.coupon = Some(coupon.clone());
                self.notice = None;
                self.phase = CheckoutPhase::CouponApplied;
                Ok(coupon)
            }
            Err(err) => {
                warn!(code, error = %err, "Coupon rejected");
                self.notice = Some(err.user_message());
                self.phase = CheckoutPhase::FormEditing;
                Err(err.into())
            }
        }
    }

    /// Remove the applied coupon so another code can be entered.
    pub fn clear_coupon(&mut self) {
        if self.coupon.take().is_some() {
            debug!("Cleared coupon");
        }
        if self.phase == CheckoutPhase::CouponApplied {
            self.phase = CheckoutPhase::FormEditing;
        }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Validate the session and lock it for submission.
    ///
    /// On success the phase is `Submitting` and every further
    /// `begin_submission` fails with `SubmissionInFlight` until
    /// [`finish_submission`](Self::finish_submission) or
    /// [`abort_submission`](Self::abort_submission) runs.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the cart is empty, the form is
    /// incomplete or the chosen payment method is disabled. The phase is
    /// left unchanged.
    pub fn begin_submission(&mut self, cart: &CartStore) -> Result<PendingOrder, CheckoutError> {
        if self.phase.is_busy() {
            return Err(CheckoutError::SubmissionInFlight);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let form = self.form.validate()?;
        let allowed = self
            .settings
            .as_ref()
            .is_none_or(|settings| settings.allows(form.payment_method));
        if !allowed {
            return Err(CheckoutError::PaymentMethodUnavailable(form.payment_method));
        }

        let pricing = self.quote(cart);
        let request = build_order(&form, cart.items(), &pricing, self.website_id);

        debug!(lines = request.items.len(), total = %pricing.total, "Submitting order");
        self.phase = CheckoutPhase::Submitting;
        self.notice = None;

        Ok(PendingOrder {
            request,
            pricing,
            email: form.email,
        })
    }

    /// Apply the outcome of an order request started by
    /// [`begin_submission`](Self::begin_submission).
    ///
    /// Success clears the cart and the coupon; failure keeps both so the
    /// customer can retry.
    ///
    /// # Errors
    ///
    /// Returns `NotSubmitting` if no submission is in progress, or the API
    /// error of a failed request.
    pub fn finish_submission(
        &mut self,
        cart: &mut CartStore,
        pending: PendingOrder,
        outcome: Result<OrderReceipt, ApiError>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if self.phase != CheckoutPhase::Submitting {
            return Err(CheckoutError::NotSubmitting);
        }

        match outcome {
            Ok(receipt) => {
                info!(order_id = %receipt.order_id, total = %pending.pricing.total, "Order placed");
                cart.clear();
                self.coupon = None;
                self.phase = CheckoutPhase::Succeeded(receipt.order_id);
                Ok(OrderConfirmation {
                    order_id: receipt.order_id,
                    pricing: pending.pricing,
                    email: pending.email,
                })
            }
            Err(err) => {
                warn!(error = %err, "Order submission failed");
                let message = err.user_message();
                self.notice = Some(message.clone());
                self.phase = CheckoutPhase::Failed(message);
                Err(err.into())
            }
        }
    }

    /// Release a submission whose request will never complete.
    pub fn abort_submission(&mut self) {
        if self.phase == CheckoutPhase::Submitting {
            debug!("Submission aborted");
            self.phase = CheckoutPhase::FormEditing;
        }
    }

    /// Validate, send the order once and apply the result.
    ///
    /// # Errors
    ///
    /// See [`begin_submission`](Self::begin_submission) and
    /// [`finish_submission`](Self::finish_submission).
    pub async fn submit_order(
        &mut self,
        cart: &mut CartStore,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let pending = self.begin_submission(cart)?;
        let outcome = self.api.create_order(&pending.request).await;
        self.finish_submission(cart, pending, outcome)
    }
}
