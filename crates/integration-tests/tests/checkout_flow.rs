//! Checkout flows against a mock storefront API.
//!
//! Run with: cargo test -p primefix-integration-tests --test checkout_flow

#![allow(clippy::unwrap_used)]

use primefix_core::{CheckoutPhase, OrderId, PaymentMethod, UserId};
use primefix_integration_tests::{TestContext, guest_form};
use primefix_storefront::{ApiError, CheckoutError, Customer};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_settings(ctx: &TestContext, settings: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings))
        .mount(&ctx.server)
        .await;
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_example_cart_with_coupon_places_order_and_clears_cart() {
    let mut ctx = TestContext::new().await;
    ctx.add_example_cart();
    mount_settings(&ctx, json!({"cod_enabled": "1", "paypal_enabled": "1"})).await;

    Mock::given(method("POST"))
        .and(path("/api/coupons/validate"))
        .and(body_json(json!({"code": "SAVE30", "cartTotal": 250.0})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": "SAVE30", "discountAmount": 30})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_partial_json(json!({
            "user_id": null,
            "guest_name": "Ada Lovelace",
            "guest_email": "ada@example.com",
            "shipping_address": "1 Main St, Springfield, 12345",
            "payment_method": "COD",
            "items": [
                {"product_id": 1, "quantity": 2, "price": 100.0},
                {"product_id": 2, "quantity": 1, "price": 50.0}
            ],
            "total_amount": 269.0,
            "website_id": 1
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"orderId": 1001})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut checkout = ctx.storefront.begin_checkout(None).await;
    *checkout.form_mut() = guest_form();

    let before = checkout.quote(ctx.storefront.cart());
    assert_eq!(before.subtotal.amount, Decimal::from(250));
    assert_eq!(before.shipping_fee.amount, Decimal::from(49));
    assert_eq!(before.total.amount, Decimal::from(299));

    ctx.storefront
        .apply_coupon(&mut checkout, "SAVE30")
        .await
        .unwrap();
    assert_eq!(checkout.phase(), &CheckoutPhase::CouponApplied);
    assert_eq!(
        checkout.quote(ctx.storefront.cart()).total.amount,
        Decimal::from(269)
    );

    let confirmation = ctx.storefront.place_order(&mut checkout).await.unwrap();

    assert_eq!(confirmation.order_id, OrderId::new(1001));
    assert_eq!(confirmation.pricing.total.amount, Decimal::from(269));
    assert_eq!(checkout.phase(), &CheckoutPhase::Succeeded(OrderId::new(1001)));
    assert!(ctx.storefront.cart().is_empty());
    assert!(ctx.restarted().cart().is_empty());
}

#[tokio::test]
async fn test_signed_in_customer_order_carries_user_id() {
    let mut ctx = TestContext::new().await;
    ctx.add_example_cart();
    mount_settings(&ctx, json!({"cod_enabled": "0", "paypal_enabled": "1"})).await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_partial_json(json!({
            "user_id": 42,
            "guest_name": "Ada Lovelace",
            "payment_method": "PayPal",
            "total_amount": 299.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"order_id": "77"})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let customer = Customer {
        id: UserId::new(42),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
    };
    let mut checkout = ctx.storefront.begin_checkout(Some(&customer)).await;
    assert_eq!(checkout.form().payment_method, Some(PaymentMethod::PayPal));

    let form = checkout.form_mut();
    form.phone = "555-0100".to_string();
    form.address = "1 Main St".to_string();
    form.city = "Springfield".to_string();
    form.zip = "12345".to_string();

    let confirmation = ctx.storefront.place_order(&mut checkout).await.unwrap();
    assert_eq!(confirmation.order_id, OrderId::new(77));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_failed_order_keeps_cart_and_retry_succeeds() {
    let mut ctx = TestContext::new().await;
    ctx.add_example_cart();
    let lines_before = ctx.storefront.cart().items().to_vec();

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "Deadlock found"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"orderId": 5})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut checkout = ctx.storefront.begin_checkout(None).await;
    *checkout.form_mut() = guest_form();

    let err = ctx.storefront.place_order(&mut checkout).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Api(ApiError::Api { status: 500, .. })
    ));
    assert!(!err.user_message().contains("Deadlock"));
    assert!(matches!(checkout.phase(), CheckoutPhase::Failed(_)));
    assert_eq!(ctx.storefront.cart().items(), lines_before.as_slice());
    assert_eq!(ctx.restarted().cart().items(), lines_before.as_slice());

    let confirmation = ctx.storefront.place_order(&mut checkout).await.unwrap();
    assert_eq!(confirmation.order_id, OrderId::new(5));
    assert!(ctx.storefront.cart().is_empty());
}

#[tokio::test]
async fn test_incomplete_form_sends_nothing() {
    let mut ctx = TestContext::new().await;
    ctx.add_example_cart();

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"orderId": 1})))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let mut checkout = ctx.storefront.begin_checkout(None).await;
    let mut form = guest_form();
    form.address.clear();
    *checkout.form_mut() = form;

    let err = ctx.storefront.place_order(&mut checkout).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.user_message(), "Address is required");
    assert_eq!(ctx.storefront.cart().len(), 2);
}

// ============================================================================
// Coupons
// ============================================================================

#[tokio::test]
async fn test_coupon_applies_once_until_cleared() {
    let mut ctx = TestContext::new().await;
    ctx.add_example_cart();

    Mock::given(method("POST"))
        .and(path("/api/coupons/validate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": "SAVE30", "discountAmount": "30.00"})),
        )
        .expect(2)
        .mount(&ctx.server)
        .await;

    let mut checkout = ctx.storefront.begin_checkout(None).await;
    ctx.storefront
        .apply_coupon(&mut checkout, "SAVE30")
        .await
        .unwrap();

    let again = ctx.storefront.apply_coupon(&mut checkout, "SAVE30").await;
    assert!(matches!(again, Err(CheckoutError::CouponAlreadyApplied(_))));
    assert_eq!(checkout.discount().amount, Decimal::from(30));

    checkout.clear_coupon();
    assert!(checkout.discount().is_zero());
    assert_eq!(
        checkout.quote(ctx.storefront.cart()).total.amount,
        Decimal::from(299)
    );

    ctx.storefront
        .apply_coupon(&mut checkout, "SAVE30")
        .await
        .unwrap();
    assert_eq!(
        checkout.quote(ctx.storefront.cart()).total.amount,
        Decimal::from(269)
    );
}

#[tokio::test]
async fn test_rejected_coupon_surfaces_backend_message() {
    let mut ctx = TestContext::new().await;
    ctx.add_example_cart();

    Mock::given(method("POST"))
        .and(path("/api/coupons/validate"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "Minimum order amount for this coupon is 1000"})),
        )
        .mount(&ctx.server)
        .await;

    let mut checkout = ctx.storefront.begin_checkout(None).await;
    let err = ctx
        .storefront
        .apply_coupon(&mut checkout, "BIG100")
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(
        err.user_message(),
        "Minimum order amount for this coupon is 1000"
    );
    assert_eq!(checkout.phase(), &CheckoutPhase::FormEditing);
    assert!(checkout.applied_coupon().is_none());
}

#[tokio::test]
async fn test_public_coupons_listing() {
    let mut ctx = TestContext::new().await;
    ctx.add_example_cart();

    Mock::given(method("GET"))
        .and(path("/api/coupons/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"code": "SAVE30", "description": "$30 off", "discount_type": "fixed",
             "discount_value": "30", "min_order_amount": "200"},
            {"code": "BIG100", "discount_type": "fixed", "discount_value": "100",
             "min_order_amount": "1000"}
        ])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let coupons = ctx.storefront.public_coupons().await.unwrap();
    let subtotal = ctx.storefront.cart().total();
    let eligible: Vec<_> = coupons
        .iter()
        .filter(|coupon| coupon.is_eligible(subtotal))
        .map(|coupon| coupon.code.as_str())
        .collect();
    assert_eq!(eligible, vec!["SAVE30"]);

    // Served from cache the second time.
    assert_eq!(ctx.storefront.public_coupons().await.unwrap().len(), 2);
}
